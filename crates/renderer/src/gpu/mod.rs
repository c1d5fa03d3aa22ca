//! GPU side of the slideshow.
//!
//! - `context` owns the wgpu instance, device and surface and reconfigures
//!   the swapchain on resize.
//! - `textures` decodes every slide once and uploads it as `Rgba8Unorm`.
//! - `pipeline` holds the shared layouts, the quad vertex buffer and builds
//!   one render pipeline per transition.
//! - `uniforms` mirrors the `TransitionParams` block of the fragment header.
//! - `state` glues everything together behind the `GpuState` API used by
//!   `window`.

mod context;
mod pipeline;
mod state;
mod textures;
mod uniforms;

pub(crate) use state::GpuState;
