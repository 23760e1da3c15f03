//! Typed GPU buffers and host readback.
//!
//! [`GpuBuffer`] wraps a [`wgpu::Buffer`] together with the number of
//! typed elements it holds.  It never owns host data; uploads go through
//! the queue and readback goes through a mappable staging buffer.

use std::marker::PhantomData;
use std::sync::mpsc;

use bytemuck::{cast_slice, Pod};
use wgpu::{Buffer, BufferDescriptor, BufferUsages};

use crate::error::{BenchError, Result};
use crate::GpuContext;

/// A typed GPU buffer holding `len` elements of `T`.
pub struct GpuBuffer<T: Pod> {
    pub buffer: Buffer,
    pub len: usize,
    _marker: PhantomData<T>,
}

impl<T: Pod> GpuBuffer<T> {
    fn byte_len(len: usize) -> u64 {
        (len * std::mem::size_of::<T>()) as u64
    }

    /// Create a read-only storage buffer initialised from `data`.
    pub fn from_slice(context: &GpuContext, data: &[T], label: &str) -> Self {
        let bytes = cast_slice(data);
        let buffer = context.device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size: bytes.len() as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        // Upload through the queue rather than mapping the buffer.  This
        // avoids the `MAP_WRITE` usage flag, which cannot be combined with
        // `STORAGE` without `MAPPABLE_PRIMARY_BUFFERS`.  The write is
        // ordered before any later submission on the same queue.
        context.queue.write_buffer(&buffer, 0, bytes);
        Self {
            buffer,
            len: data.len(),
            _marker: PhantomData,
        }
    }

    /// Create a storage buffer of `len` elements the kernel writes into.
    /// `COPY_SRC` lets it be copied to a download buffer afterwards.
    pub fn new_output(context: &GpuContext, len: usize, label: &str) -> Self {
        let buffer = context.device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size: Self::byte_len(len),
            usage: BufferUsages::STORAGE | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            len,
            _marker: PhantomData,
        }
    }

    /// Create a uniform buffer holding a single `T`.
    pub fn new_uniform(context: &GpuContext, value: &T, label: &str) -> Self {
        let bytes = bytemuck::bytes_of(value);
        let buffer = context.device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size: bytes.len() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        context.queue.write_buffer(&buffer, 0, bytes);
        Self {
            buffer,
            len: 1,
            _marker: PhantomData,
        }
    }

    /// Create a host-mappable buffer sized to hold `len` elements.  It
    /// cannot be bound to a shader.
    pub fn new_download(context: &GpuContext, len: usize) -> Self {
        // `MAP_READ` may only be paired with `COPY_DST`, which is why the
        // kernel writes into a separate storage buffer first.
        let buffer = context.device.create_buffer(&BufferDescriptor {
            label: Some("download"),
            size: Self::byte_len(len),
            usage: BufferUsages::COPY_DST | BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            len,
            _marker: PhantomData,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        Self::byte_len(self.len)
    }

    /// Map a download buffer and copy its contents to the host.
    ///
    /// Blocks until the GPU has finished every submission that writes
    /// this buffer.  The buffer is unmapped before returning.
    pub fn read_to_vec(&self, context: &GpuContext) -> Result<Vec<T>> {
        let slice = self.buffer.slice(..);
        // `map_async` only queues the request; its callback fires from
        // inside a device poll.  Forward the outcome over a channel so
        // that a failed mapping is reported instead of ignored.
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        // Waiting on the device drives the submitted work to completion
        // and runs the mapping callback before we look at the channel.
        context.wait_idle()?;
        rx.recv()
            .map_err(|e| BenchError::Readback(e.to_string()))?
            .map_err(|e| BenchError::Readback(e.to_string()))?;

        let data = slice.get_mapped_range();
        let result: Vec<T> = cast_slice(&data).to_vec();
        // The mapped view borrows the buffer; drop it before unmapping.
        drop(data);
        self.buffer.unmap();
        Ok(result)
    }
}
