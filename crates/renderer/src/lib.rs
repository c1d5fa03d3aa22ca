//! Renderer crate for glideshow.
//!
//! The crate owns the two GLSL stages every transition runs through and the
//! `wgpu` host that plays them full screen:
//!
//! ```text
//!   transition.glsl ──▶ assemble_fragment() ──▶ header + #line 1 + body + footer
//!                                                   │
//!   CLI / glideshow                                 ▼
//!          │ RendererConfig              naga GLSL frontend (check_fragment)
//!          ▼
//!   Renderer::run ──▶ winit event loop ──▶ Slideshow::frame() ──▶ GpuState::render()
//! ```
//!
//! The vertex stage maps the full-screen quad `[-1, 1]²` to clip space and
//! hands `uv = (pos + 1) / 2` to the fragment stage. The fragment header
//! exposes `from`, `to`, `progress` and `ratio` plus the `getFromColor` /
//! `getToColor` accessors; the footer calls the transition's
//! `vec4 transition(vec2 uv)` and writes its result.

pub mod compile;
mod gpu;
pub mod quad;
mod types;
mod window;

use anyhow::Result;

pub use compile::{
    assemble_fragment, check_fragment, check_vertex, AssembledFragment, ShaderCheckError,
    TransitionParameter, FRAGMENT_FOOTER, FRAGMENT_HEADER, VERTEX_SHADER_GLSL,
};
pub use types::{FilterMode, RendererConfig, SamplerSettings, TransitionSource, WrapMode};

/// Entry point that opens the slideshow window and blocks until it closes.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn run(self) -> Result<()> {
        tracing::debug!(
            images = self.config.images.len(),
            transitions = self.config.transitions.len(),
            "launching renderer"
        );
        window::run(self.config)
    }
}
