//! Command-line options for the benchmark driver.

use std::path::PathBuf;

use clap::Parser;

use crate::context::AdapterOptions;
use crate::error::Result;
use crate::kernel::DEFAULT_KERNEL_PATH;
use crate::matrix::{MatrixShape, DEFAULT_DIM};

/// Time a GPU matrix multiply against a sequential CPU loop.
#[derive(Parser, Debug, Clone)]
#[command(name = "wgpu_matmul_bench", version, about)]
pub struct CliArgs {
    /// WGSL kernel file, relative to the working directory
    #[arg(short, long, default_value = DEFAULT_KERNEL_PATH)]
    pub kernel: PathBuf,

    /// Output rows (also the inner dimension)
    #[arg(short, long, default_value_t = DEFAULT_DIM)]
    pub rows: usize,

    /// Output columns
    #[arg(short, long, default_value_t = DEFAULT_DIM)]
    pub cols: usize,

    /// Seed for the random number generator; entropy when unset
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Accept a CPU/software adapter when no GPU is present
    #[arg(long)]
    pub allow_cpu_adapter: bool,

    /// Also multiply the device inputs on the host and compare results
    #[arg(long)]
    pub verify: bool,

    /// Relative tolerance used by --verify
    #[arg(long, default_value_t = 1e-3)]
    pub tolerance: f32,
}

impl CliArgs {
    pub fn shape(&self) -> Result<MatrixShape> {
        MatrixShape::new(self.rows, self.cols)
    }

    pub fn adapter_options(&self) -> AdapterOptions {
        AdapterOptions {
            allow_cpu: self.allow_cpu_adapter,
            ..Default::default()
        }
    }
}
