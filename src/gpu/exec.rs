//! Kernel launch and readback.
//!
//! One dispatch per call: storage buffers bound in spec order starting at
//! binding 0, then the parameter block (padded to 16 bytes) as a uniform at
//! the next binding. Bind group layout comes from the shader itself.

use wgpu::util::DeviceExt;

use super::{GpuContext, KernelProgram};
use crate::diagnostic::Diagnostic;

/// 1D dispatch width. Kernels declare @workgroup_size(64) to match.
pub const WORKGROUP_SIZE: u32 = 64;
/// 2D dispatch width per axis. Kernels declare @workgroup_size(8, 8).
pub const WORKGROUP_SIZE_2D: u32 = 8;

/// How a storage buffer is created and whether it is read back.
pub enum BufferSpec<'a> {
    /// Read-only storage input.
    Input(&'a [f32]),
    /// Read-write storage uploaded from the host and read back after dispatch.
    InOut(&'a [f32]),
    /// Zero-initialized read-write storage read back after dispatch.
    /// Holds the element count.
    Output(usize),
}

pub fn groups_1d(len: usize) -> [u32; 3] {
    [(len as u32).div_ceil(WORKGROUP_SIZE).max(1), 1, 1]
}

pub fn groups_2d(rows: usize, cols: usize) -> [u32; 3] {
    [
        (rows as u32).div_ceil(WORKGROUP_SIZE_2D).max(1),
        (cols as u32).div_ceil(WORKGROUP_SIZE_2D).max(1),
        1,
    ]
}

/// Dispatch `entry` once and read back every InOut/Output buffer, in spec
/// order. Validation failures from the device are captured with an error
/// scope and returned as diagnostics.
pub fn launch(
    ctx: &GpuContext,
    program: &KernelProgram,
    entry: &str,
    buffers: &[BufferSpec],
    params: &[u32],
    groups: [u32; 3],
) -> Result<Vec<Vec<f32>>, Diagnostic> {
    if !program.has_entry(entry) {
        let available: Vec<&str> = program.entry_points().collect();
        return Err(Diagnostic::error(format!(
            "kernel '{}' has no entry point '{}'",
            program.name, entry
        ))
        .with_note(format!("available entry points: {}", available.join(", "))));
    }

    let device = &ctx.device;
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&program.name),
        source: wgpu::ShaderSource::Wgsl(program.source.as_str().into()),
    });

    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(entry),
        layout: None,
        module: &shader_module,
        entry_point: Some(entry),
        compilation_options: Default::default(),
        cache: None,
    });

    // Storage buffers, binding index = position in the spec slice.
    let mut storage_bufs = Vec::with_capacity(buffers.len());
    let mut readback: Vec<(usize, u64)> = Vec::new(); // (spec index, byte size)
    for (i, spec) in buffers.iter().enumerate() {
        let buf = match spec {
            BufferSpec::Input(data) => {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("input"),
                    contents: bytemuck::cast_slice(data),
                    usage: wgpu::BufferUsages::STORAGE,
                })
            }
            BufferSpec::InOut(data) => {
                readback.push((i, std::mem::size_of_val(*data) as u64));
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("inout"),
                    contents: bytemuck::cast_slice(data),
                    usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
                })
            }
            BufferSpec::Output(len) => {
                let size = (len * std::mem::size_of::<f32>()) as u64;
                readback.push((i, size));
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("output"),
                    size,
                    usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
                    mapped_at_creation: false,
                })
            }
        };
        storage_bufs.push(buf);
    }

    // Parameter block as a uniform buffer, padded to a 16-byte multiple.
    let params_buf = if params.is_empty() {
        None
    } else {
        let mut padded = params.to_vec();
        while padded.len() % 4 != 0 {
            padded.push(0);
        }
        Some(
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("params"),
                contents: bytemuck::cast_slice(&padded),
                usage: wgpu::BufferUsages::UNIFORM,
            }),
        )
    };

    let bind_group_layout = pipeline.get_bind_group_layout(0);
    let mut entries: Vec<wgpu::BindGroupEntry> = storage_bufs
        .iter()
        .enumerate()
        .map(|(i, buf)| wgpu::BindGroupEntry {
            binding: i as u32,
            resource: buf.as_entire_binding(),
        })
        .collect();
    if let Some(ref params_buf) = params_buf {
        entries.push(wgpu::BindGroupEntry {
            binding: storage_bufs.len() as u32,
            resource: params_buf.as_entire_binding(),
        });
    }
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&program.name),
        layout: &bind_group_layout,
        entries: &entries,
    });

    let staging: Vec<wgpu::Buffer> = readback
        .iter()
        .map(|(_, size)| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("staging"),
                size: *size,
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        })
        .collect();

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("kernelcheck_encoder"),
    });
    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(entry),
            timestamp_writes: None,
        });
        pass.set_pipeline(&pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(groups[0], groups[1], groups[2]);
    }
    for (staging_buf, (spec_index, size)) in staging.iter().zip(&readback) {
        encoder.copy_buffer_to_buffer(&storage_bufs[*spec_index], 0, staging_buf, 0, *size);
    }
    ctx.queue.submit(std::iter::once(encoder.finish()));

    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(Diagnostic::error(format!(
            "kernel '{}' failed device validation: {}",
            program.name, err
        )));
    }

    // Readback
    let mut results = Vec::with_capacity(staging.len());
    for staging_buf in &staging {
        let slice = staging_buf.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .expect("GPU readback channel closed")
            .map_err(|e| Diagnostic::error(format!("GPU readback failed: {}", e)))?;

        let data = slice.get_mapped_range();
        results.push(bytemuck::cast_slice::<u8, f32>(&data).to_vec());
        drop(data);
        staging_buf.unmap();
    }

    Ok(results)
}
