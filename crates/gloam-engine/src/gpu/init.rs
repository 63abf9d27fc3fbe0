use crate::window::VSync;

/// Initialization parameters for the GPU layer.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface. This value is a hint.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: present_mode_for(VSync::On),
            alpha_mode: None,
            required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
            desired_maximum_frame_latency: 2,
        }
    }
}

/// Present mode for a vsync setting. The `Auto*` modes fall back when unsupported.
pub(crate) fn present_mode_for(vsync: VSync) -> wgpu::PresentMode {
    match vsync {
        VSync::On => wgpu::PresentMode::AutoVsync,
        VSync::Off => wgpu::PresentMode::AutoNoVsync,
        VSync::Adaptive => wgpu::PresentMode::FifoRelaxed,
    }
}
