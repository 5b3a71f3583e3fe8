//! GPU device infrastructure.
//!
//! Uses wgpu for cross-platform GPU access (Metal, Vulkan, DX12). Provides
//! the one device context the harness creates at startup, WGSL kernel
//! building, and a launch/readback helper for test dispatches.

pub mod exec;
pub mod kernel;

pub use exec::{groups_1d, groups_2d, launch, BufferSpec};
pub use kernel::KernelProgram;

use crate::diagnostic::Diagnostic;

/// The device handle and command queue shared by every test in a run.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_info: wgpu::AdapterInfo,
}

impl GpuContext {
    /// One-line adapter description for startup logging.
    pub fn describe(&self) -> String {
        format!(
            "{} ({:?}, {:?})",
            self.adapter_info.name, self.adapter_info.backend, self.adapter_info.device_type
        )
    }
}

/// Create the device context: first available adapter, one device + queue.
pub fn create_context() -> Result<GpuContext, Diagnostic> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .ok_or_else(|| Diagnostic::error("no compatible GPU adapter found".to_string()))?;
    let adapter_info = adapter.get_info();
    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("kernelcheck-gpu"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::Performance,
        },
        None,
    ))
    .map_err(|e| {
        Diagnostic::error(format!(
            "cannot create device on adapter '{}': {}",
            adapter_info.name, e
        ))
    })?;
    Ok(GpuContext {
        device,
        queue,
        adapter_info,
    })
}

/// Try to create the device context.
/// Returns None if no GPU adapter is available.
pub fn try_create_context() -> Option<GpuContext> {
    create_context().ok()
}
