//! Error types shared by the device and reference paths.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a benchmark run.
///
/// None of these are recovered from locally; the driver reports the
/// error on stderr and exits with a failure code.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("no compute platforms found")]
    PlatformUnavailable,

    #[error("no GPU-class device found among {adapters} adapter(s)")]
    DeviceUnavailable { adapters: usize },

    #[error("adapter `{0}` does not support compute shaders")]
    ComputeUnsupported(String),

    #[error("failed to create GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("failed to read kernel source `{}`: {source}", .path.display())]
    KernelSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("kernel build failed:\n{log}")]
    Compile { log: String },

    #[error("dispatch failed: {0}")]
    Dispatch(String),

    #[error("buffer readback failed: {0}")]
    Readback(String),

    #[error("device result differs from the sequential result: {0}")]
    Verification(String),

    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, BenchError>;
