//! Benchmark a dense matrix multiply on the GPU against a sequential
//! triple loop on the CPU, using [wgpu](https://github.com/gfx-rs/wgpu)
//! as the compute backend.
//!
//! The device path loads an external WGSL kernel, uploads both operands,
//! dispatches one invocation per output element and blocks until the
//! result has been read back.  The host path runs the same index
//! arithmetic in a plain loop.  Both are timed with wall-clock instants.
//! Everything is synchronous; the only parallelism is inside the GPU.

pub mod backend;
pub mod buffer;
pub mod cli;
pub mod compute;
pub mod context;
pub mod device;
pub mod error;
pub mod kernel;
pub mod matrix;
pub mod reference;
pub mod timing;
pub mod verify;

// Re-export the most common types at the crate root.
pub use backend::{ComputeBackend, GridShape, KernelArgs};
pub use buffer::GpuBuffer;
pub use context::{AdapterOptions, GpuContext};
pub use device::DeviceExecutor;
pub use error::{BenchError, Result};
pub use kernel::{CompiledKernel, KernelSource};
pub use matrix::{random_matrix, random_operands, Matrix, MatrixShape};
pub use reference::multiply_sequential;
pub use timing::{time, TimingSample};
pub use verify::{compare, Comparison};
