//! Kernel source loading and compilation.
//!
//! The multiply kernel lives in an external WGSL file that is read at
//! start-up, not baked into the binary.  Compilation runs inside a wgpu
//! validation error scope so that a bad kernel turns into
//! [`BenchError::Compile`] with the compiler messages, instead of
//! tripping the device's uncaptured-error handler.

use std::fmt::Write as _;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use log::{debug, warn};

use crate::error::{BenchError, Result};
use crate::GpuContext;

/// Default kernel location, relative to the working directory.
pub const DEFAULT_KERNEL_PATH: &str = "kernels/matrix_multiply.wgsl";

/// Entry point the kernel file must define.
pub const ENTRY_POINT: &str = "matrix_multiply";

/// Workgroup edge length declared by the kernel's `@workgroup_size`.
pub const WORKGROUP_DIM: u32 = 16;

/// Scalar arguments as laid out in the kernel's uniform block.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct KernelDims {
    pub rows: u32,
    pub cols: u32,
    pub inner: u32,
    pub _pad: u32,
}

impl From<[u32; 3]> for KernelDims {
    fn from([rows, cols, inner]: [u32; 3]) -> Self {
        Self {
            rows,
            cols,
            inner,
            _pad: 0,
        }
    }
}

/// Kernel text plus where it came from.
#[derive(Debug, Clone)]
pub struct KernelSource {
    pub path: PathBuf,
    pub text: String,
    pub entry_point: String,
}

impl KernelSource {
    /// Read the whole file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let text = std::fs::read_to_string(&path).map_err(|source| BenchError::KernelSource {
            path: path.clone(),
            source,
        })?;
        debug!(
            "loaded {} bytes of kernel source from {}",
            text.len(),
            path.display()
        );
        Ok(Self {
            path,
            text,
            entry_point: ENTRY_POINT.to_string(),
        })
    }

    /// Wrap source text that did not come from disk.
    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            path: PathBuf::from("<inline>"),
            text: text.into(),
            entry_point: ENTRY_POINT.to_string(),
        }
    }
}

/// A compiled multiply pipeline and the layout its bind groups use.
pub struct CompiledKernel {
    pub pipeline: wgpu::ComputePipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(std::mem::size_of::<f32>() as u64),
        },
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(std::mem::size_of::<KernelDims>() as u64),
        },
        count: None,
    }
}

/// Render compiler messages as `path:line:col: level: message` lines.
pub fn format_build_log(path: &Path, info: &wgpu::CompilationInfo) -> String {
    let mut log = String::new();
    for msg in &info.messages {
        let level = match msg.message_type {
            wgpu::CompilationMessageType::Error => "error",
            wgpu::CompilationMessageType::Warning => "warning",
            wgpu::CompilationMessageType::Info => "info",
        };
        match &msg.location {
            Some(loc) => {
                let _ = writeln!(
                    log,
                    "{}:{}:{}: {level}: {}",
                    path.display(),
                    loc.line_number,
                    loc.line_position,
                    msg.message
                );
            }
            None => {
                let _ = writeln!(log, "{}: {level}: {}", path.display(), msg.message);
            }
        }
    }
    log
}

impl CompiledKernel {
    /// Compile `source` and build the compute pipeline.
    ///
    /// Bindings: 0 and 1 are the read-only operands, 2 the output, 3 the
    /// [`KernelDims`] uniform.
    pub fn build(context: &GpuContext, source: &KernelSource) -> Result<Self> {
        let device = &context.device;
        // Shader and pipeline creation report problems asynchronously as
        // validation errors.  Scope them so they can be read back below
        // instead of reaching the uncaptured-error handler.
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("matrix_multiply_kernel"),
            source: wgpu::ShaderSource::Wgsl(source.text.as_str().into()),
        });
        // An explicit layout pins the binding types, so a kernel that
        // declares them differently fails here rather than at dispatch.
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("matrix_multiply_bind_group_layout"),
            entries: &[
                storage_entry(0, true),
                storage_entry(1, true),
                storage_entry(2, false),
                uniform_entry(3),
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("matrix_multiply_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("matrix_multiply_pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some(source.entry_point.as_str()),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        let scope_error = pollster::block_on(device.pop_error_scope());
        let info = pollster::block_on(module.get_compilation_info());
        let log = format_build_log(&source.path, &info);

        if let Some(err) = scope_error {
            // A missing entry point has no compiler message attached; fall
            // back to the validation error text.
            let log = if log.is_empty() { err.to_string() } else { log };
            return Err(BenchError::Compile { log });
        }
        if !log.is_empty() {
            warn!("kernel compiled with diagnostics:\n{log}");
        }
        debug!(
            "compiled {} (entry point `{}`)",
            source.path.display(),
            source.entry_point
        );

        Ok(Self {
            pipeline,
            bind_group_layout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dims_uniform_is_16_bytes() {
        assert_eq!(std::mem::size_of::<KernelDims>(), 16);
    }

    #[test]
    fn dims_keep_argument_order() {
        let d = KernelDims::from([4, 6, 4]);
        assert_eq!((d.rows, d.cols, d.inner, d._pad), (4, 6, 4, 0));
        assert_eq!(bytemuck::cast::<KernelDims, [u32; 4]>(d), [4, 6, 4, 0]);
    }

    #[test]
    fn missing_file_is_kernel_source_error() {
        let err = KernelSource::load("definitely/not/here.wgsl").unwrap_err();
        match err {
            BenchError::KernelSource { path, source } => {
                assert_eq!(path, PathBuf::from("definitely/not/here.wgsl"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn shipped_kernel_loads_and_names_entry_point() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_KERNEL_PATH);
        let src = KernelSource::load(path).unwrap();
        let workgroup = format!("@workgroup_size({WORKGROUP_DIM}, {WORKGROUP_DIM})");
        assert!(src.text.contains(&format!("fn {ENTRY_POINT}")));
        assert!(src.text.contains(&workgroup));
    }

    #[test]
    fn build_log_formats_locations() {
        let info = wgpu::CompilationInfo {
            messages: vec![wgpu::CompilationMessage {
                message: "expected `;`".into(),
                message_type: wgpu::CompilationMessageType::Error,
                location: Some(wgpu::SourceLocation {
                    line_number: 3,
                    line_position: 5,
                    offset: 40,
                    length: 1,
                }),
            }],
        };
        let log = format_build_log(Path::new("k.wgsl"), &info);
        assert_eq!(log, "k.wgsl:3:5: error: expected `;`\n");
    }
}
