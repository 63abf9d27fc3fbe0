use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::paint::Color;
use crate::window::VSync;

use super::init::{present_mode_for, GpuInit};
use super::surface::{choose_alpha_mode, choose_present_mode, choose_surface_format, SurfaceErrorAction};

/// Owns wgpu core objects and the surface configuration of one window.
///
/// The surface holds an `Arc` of the window, so it can never outlive it.
pub struct Gpu {
    surface: wgpu::Surface<'static>,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl Gpu {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: Arc<Window>, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("gloam device"),
                required_features: wgpu::Features::empty(),
                required_limits: init.required_limits.using_resolution(adapter.limits()),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps, init.prefer_srgb)
            .context("no supported surface formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: choose_present_mode(&caps, init.present_mode),
            alpha_mode: choose_alpha_mode(&caps, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        if size.width > 0 && size.height > 0 {
            surface.configure(&device, &config);
        }

        log::info!(
            "renderer ready: {} ({:?}), format {:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            format
        );

        Ok(Gpu {
            surface,
            adapter,
            device,
            queue,
            config,
            size,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Reconfigures the surface after a resize.
    ///
    /// wgpu does not support configuring a surface with a 0x0 size; in that case,
    /// only internal state is updated and configuration is deferred.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn set_vsync(&mut self, vsync: VSync) {
        let caps = self.surface.get_capabilities(&self.adapter);
        self.config.present_mode = choose_present_mode(&caps, present_mode_for(vsync));
        if self.size.width > 0 && self.size.height > 0 {
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Clears the next surface texture to `color` and presents it.
    ///
    /// Transient surface errors skip the frame; only fatal ones are returned.
    pub fn clear_and_present(&mut self, color: Color) -> Result<()> {
        if self.size.width == 0 || self.size.height == 0 {
            return Ok(());
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(err) => {
                let message = err.to_string();
                return match self.handle_surface_error(err) {
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => Ok(()),
                    SurfaceErrorAction::Fatal => Err(anyhow::anyhow!("surface error: {message}")),
                };
            }
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("gloam frame encoder"),
            });

        let clear = if self.config.format.is_srgb() {
            color.clamped().to_linear()
        } else {
            color.clamped()
        };

        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("gloam clear pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(clear.r),
                            g: f64::from(clear.g),
                            b: f64::from(clear.b),
                            a: f64::from(clear.a),
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Converts a `SurfaceError` into a higher-level action.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        match err {
            SurfaceError::Lost | SurfaceError::Outdated => {
                if self.size.width > 0 && self.size.height > 0 {
                    self.surface.configure(&self.device, &self.config);
                }
                SurfaceErrorAction::Reconfigured
            }
            SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
            SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
            SurfaceError::Other => SurfaceErrorAction::SkipFrame,
        }
    }
}
