//! GPU device + surface management for the desktop window.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - clearing and presenting one frame per loop iteration

mod context;
mod init;
mod surface;

pub use context::Gpu;
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
