//! The device executor: one backend, one compiled kernel, one multiply
//! per call.

use std::path::Path;

use log::info;

use crate::backend::{ComputeBackend, GridShape, KernelArgs};
use crate::error::{BenchError, Result};
use crate::kernel::KernelSource;
use crate::matrix::{Matrix, MatrixShape};

/// A backend paired with the multiply kernel compiled for it.
pub struct DeviceExecutor<B: ComputeBackend> {
    pub backend: B,
    pub program: B::Program,
}

fn to_u32(v: usize) -> Result<u32> {
    u32::try_from(v)
        .map_err(|_| BenchError::InvalidDimensions(format!("{v} does not fit in u32")))
}

impl<B: ComputeBackend> DeviceExecutor<B> {
    /// Discover a device, then load and compile the kernel at
    /// `kernel_path`.  Any failure here is fatal for the run.
    pub fn initialize(options: &B::Options, kernel_path: impl AsRef<Path>) -> Result<Self> {
        let backend = B::discover(options)?;
        info!("using device {}", backend.describe());
        let source = KernelSource::load(kernel_path)?;
        Self::with_source(backend, &source)
    }

    /// Compile `source` on an already discovered backend.
    pub fn with_source(backend: B, source: &KernelSource) -> Result<Self> {
        let program = backend.compile(source)?;
        Ok(Self { backend, program })
    }

    /// Multiply `a` by `b` on the device and block until the result is
    /// back on the host.
    ///
    /// The kernel receives `(rows, cols, rows)` as its scalar arguments
    /// and runs over a `rows × cols` grid.
    pub fn multiply(&self, a: &Matrix, b: &Matrix, shape: MatrixShape) -> Result<Matrix> {
        let rows = shape.rows;
        let cols = shape.cols;
        if a.len() != rows * shape.inner() || b.len() != shape.inner() * cols {
            return Err(BenchError::InvalidDimensions(format!(
                "operands of length {} and {} do not fit a {rows}x{cols} product",
                a.len(),
                b.len()
            )));
        }
        let (rows_u32, cols_u32) = (to_u32(rows)?, to_u32(cols)?);

        let args = KernelArgs {
            lhs: a.as_slice(),
            rhs: b.as_slice(),
            output_len: shape.output_len(),
            scalars: [rows_u32, cols_u32, rows_u32],
        };
        let grid = GridShape {
            x: rows_u32,
            y: cols_u32,
        };
        let data = self.backend.dispatch(&self.program, &args, grid)?;
        if data.len() != shape.output_len() {
            return Err(BenchError::Dispatch(format!(
                "device returned {} elements, expected {}",
                data.len(),
                shape.output_len()
            )));
        }
        Ok(Matrix::from_vec(rows, cols, data))
    }
}
