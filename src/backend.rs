//! The capability interface the device executor drives.
//!
//! A backend knows how to find a device, turn kernel source into a
//! program for it, and run that program over a 2-D grid while the host
//! waits.  [`crate::GpuContext`] is the wgpu implementation; tests plug
//! in a recording backend to check the host-side argument contract
//! without a GPU.

use crate::error::Result;
use crate::kernel::KernelSource;

/// 2-D work grid, one kernel invocation per coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    /// Extent along the first axis (output rows).
    pub x: u32,
    /// Extent along the second axis (output columns).
    pub y: u32,
}

impl GridShape {
    pub fn invocations(&self) -> u64 {
        u64::from(self.x) * u64::from(self.y)
    }
}

/// Buffers and scalars bound to the multiply kernel, in binding order.
#[derive(Debug, Clone, Copy)]
pub struct KernelArgs<'a> {
    pub lhs: &'a [f32],
    pub rhs: &'a [f32],
    /// Number of `f32` elements in the output buffer.
    pub output_len: usize,
    /// `(rows, cols, inner)`; `inner` always repeats `rows`.
    pub scalars: [u32; 3],
}

pub trait ComputeBackend: Sized {
    /// Device selection options.
    type Options;
    /// A compiled kernel ready for dispatch.
    type Program;

    /// Enumerate platforms and open a device.
    fn discover(options: &Self::Options) -> Result<Self>;

    /// Short description of the selected device.
    fn describe(&self) -> String;

    /// Build `source` for the selected device.
    fn compile(&self, source: &KernelSource) -> Result<Self::Program>;

    /// Upload the arguments, run `program` over `grid`, block until the
    /// device is done and return the output buffer contents.
    fn dispatch(
        &self,
        program: &Self::Program,
        args: &KernelArgs<'_>,
        grid: GridShape,
    ) -> Result<Vec<f32>>;
}
