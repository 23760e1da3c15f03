//! wgpu implementation of [`ComputeBackend`].
//!
//! A dispatch uploads both operands, binds them with the output buffer
//! and the dimension uniform, records one compute pass over the 2-D grid,
//! copies the result into a mappable buffer and blocks until it can be
//! read.  All validation errors raised while recording or submitting are
//! collected through an error scope and returned as
//! [`BenchError::Dispatch`].

use log::debug;

use crate::backend::{ComputeBackend, GridShape, KernelArgs};
use crate::buffer::GpuBuffer;
use crate::context::{AdapterOptions, GpuContext};
use crate::error::{BenchError, Result};
use crate::kernel::{CompiledKernel, KernelDims, KernelSource, WORKGROUP_DIM};

/// Number of workgroups needed to cover `extent` invocations with groups
/// of `group` along one axis.  Errors if the device cannot launch that
/// many groups in a single dimension.
pub fn workgroups_for(extent: u32, group: u32, limit: u32) -> Result<u32> {
    let groups = extent.div_ceil(group);
    if groups > limit {
        return Err(BenchError::Dispatch(format!(
            "{groups} workgroups exceed the per-dimension limit of {limit}"
        )));
    }
    Ok(groups)
}

impl ComputeBackend for GpuContext {
    type Options = AdapterOptions;
    type Program = CompiledKernel;

    fn discover(options: &AdapterOptions) -> Result<Self> {
        GpuContext::new_blocking(*options)
    }

    fn describe(&self) -> String {
        GpuContext::describe(self)
    }

    fn compile(&self, source: &KernelSource) -> Result<CompiledKernel> {
        CompiledKernel::build(self, source)
    }

    fn dispatch(
        &self,
        program: &CompiledKernel,
        args: &KernelArgs<'_>,
        grid: GridShape,
    ) -> Result<Vec<f32>> {
        // The grid counts invocations; wgpu dispatches whole workgroups,
        // and the kernel discards the invocations that fall off the edge.
        let limit = self.device.limits().max_compute_workgroups_per_dimension;
        let groups_x = workgroups_for(grid.x, WORKGROUP_DIM, limit)?;
        let groups_y = workgroups_for(grid.y, WORKGROUP_DIM, limit)?;
        debug!(
            "dispatching {}x{} grid as {groups_x}x{groups_y} workgroups",
            grid.x, grid.y
        );

        // Without a scope, a validation error goes to the device's
        // uncaptured-error handler, which panics.  Collect it here instead
        // so it surfaces as an ordinary error.
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let lhs = GpuBuffer::<f32>::from_slice(self, args.lhs, "lhs");
        let rhs = GpuBuffer::<f32>::from_slice(self, args.rhs, "rhs");
        let output = GpuBuffer::<f32>::new_output(self, args.output_len, "output");
        let dims = KernelDims::from(args.scalars);
        let dims = GpuBuffer::<KernelDims>::new_uniform(self, &dims, "dims");
        let download = GpuBuffer::<f32>::new_download(self, args.output_len);

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("matrix_multiply_bind_group"),
            layout: &program.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: lhs.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: rhs.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: output.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: dims.buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("matrix_multiply_encoder"),
            });
        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("matrix_multiply_pass"),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&program.pipeline);
            cpass.set_bind_group(0, &bind_group, &[]);
            cpass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        // Storage buffers cannot be mapped, so the result is copied into
        // the download buffer as part of the same submission.  The copy is
        // ordered after the compute pass.
        let size = output.size_bytes();
        encoder.copy_buffer_to_buffer(&output.buffer, 0, &download.buffer, 0, size);
        self.queue.submit([encoder.finish()]);

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(BenchError::Dispatch(err.to_string()));
        }

        download.read_to_vec(self)
    }
}
