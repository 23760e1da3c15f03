//! GPU context initialization.
//!
//! This module wraps wgpu's instance, adapter, device and queue.  The
//! adapter is chosen the way a classic compute API picks a device:
//! enumerate every platform the instance can see, then take the first
//! GPU-class device.  The `new_blocking` constructor hides the
//! asynchronous device request behind [`pollster`].

use log::{debug, info};
use wgpu::{Adapter, Backends, Device, DeviceType, Instance, Queue};

use crate::error::{BenchError, Result};

/// Adapter selection knobs.
#[derive(Debug, Clone, Copy)]
pub struct AdapterOptions {
    /// Backends to enumerate.
    pub backends: Backends,
    /// Accept a CPU/software adapter when no GPU is available.
    pub allow_cpu: bool,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            backends: Backends::PRIMARY,
            allow_cpu: false,
        }
    }
}

/// A GPU context encapsulates all state needed to submit compute work.
///
/// `Instance`, `Adapter`, `Device` and `Queue` are internally reference
/// counted, so the fields can be cloned freely.
pub struct GpuContext {
    pub instance: Instance,
    /// The physical device selected for computation.
    pub adapter: Adapter,
    /// Logical device used to create resources and command encoders.
    pub device: Device,
    /// Command submission queue.
    pub queue: Queue,
}

/// Whether an adapter of this type counts as a GPU-class device.
pub fn is_gpu_class(device_type: DeviceType, allow_cpu: bool) -> bool {
    match device_type {
        DeviceType::DiscreteGpu | DeviceType::IntegratedGpu | DeviceType::VirtualGpu => true,
        DeviceType::Cpu => allow_cpu,
        DeviceType::Other => false,
    }
}

/// Pick the first adapter whose type passes [`is_gpu_class`], preferring
/// real GPUs over a permitted CPU fallback.
fn select_adapter(adapters: Vec<Adapter>, allow_cpu: bool) -> Result<Adapter> {
    let count = adapters.len();
    let mut fallback = None;
    for adapter in adapters {
        let info = adapter.get_info();
        debug!(
            "found adapter {} ({:?}, {:?})",
            info.name, info.backend, info.device_type
        );
        if is_gpu_class(info.device_type, false) {
            return Ok(adapter);
        }
        if fallback.is_none() && is_gpu_class(info.device_type, allow_cpu) {
            fallback = Some(adapter);
        }
    }
    fallback.ok_or(BenchError::DeviceUnavailable { adapters: count })
}

impl GpuContext {
    /// Create a new GPU context synchronously.
    ///
    /// Fails with [`BenchError::PlatformUnavailable`] when no adapter is
    /// visible at all, and with [`BenchError::DeviceUnavailable`] when
    /// none of them is GPU-class.
    pub fn new_blocking(options: AdapterOptions) -> Result<Self> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: options.backends,
            ..Default::default()
        });
        // Unlike `request_adapter`, enumeration returns every adapter on
        // every requested backend, so "no platform" and "no GPU" can be
        // told apart.
        let adapters = instance.enumerate_adapters(options.backends);
        if adapters.is_empty() {
            return Err(BenchError::PlatformUnavailable);
        }
        let adapter = select_adapter(adapters, options.allow_cpu)?;

        // Downlevel devices may not support compute on every backend.
        // Abort early rather than fail at pipeline creation.
        let capabilities = adapter.get_downlevel_capabilities();
        if !capabilities
            .flags
            .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS)
        {
            return Err(BenchError::ComputeUnsupported(adapter.get_info().name));
        }

        let info = adapter.get_info();
        info!(
            "selected adapter {} ({:?}, {:?})",
            info.name, info.backend, info.device_type
        );

        // No optional features are needed.  Downlevel default limits keep
        // the request satisfiable on integrated and software adapters, and
        // still allow 65535 workgroups per dimension.
        let descriptor = wgpu::DeviceDescriptor {
            label: Some("matmul_bench_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        };
        let (device, queue) = pollster::block_on(adapter.request_device(&descriptor))?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    /// Human-readable adapter description for logs.
    pub fn describe(&self) -> String {
        let info = self.adapter.get_info();
        format!("{} ({:?}, {:?})", info.name, info.backend, info.device_type)
    }

    /// Block until all submitted work has finished.
    ///
    /// `PollType::Wait` keeps the calling thread parked until the device
    /// has drained its queue, which also fires pending map callbacks.
    pub fn wait_idle(&self) -> Result<()> {
        self.device
            .poll(wgpu::PollType::Wait)
            .map(|_| ())
            .map_err(|e| BenchError::Dispatch(e.to_string()))
    }
}
