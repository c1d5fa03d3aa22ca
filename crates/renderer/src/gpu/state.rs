use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use scheduler::Frame;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::types::{RendererConfig, TransitionSource};

use super::context::GpuContext;
use super::pipeline::{build_transition_pipeline, PipelineLayouts};
use super::textures::{load_slides, SlideTexture};
use super::uniforms::TransitionUniforms;

/// Bind groups are cheap but shuffle order can visit many pairs.
const MAX_CACHED_PAIRS: usize = 64;

/// Owns every GPU resource of the slideshow and draws one frame at a time.
pub(crate) struct GpuState {
    context: GpuContext,
    layouts: PipelineLayouts,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: TransitionUniforms,
    sampler: wgpu::Sampler,
    slides: Vec<SlideTexture>,
    transitions: Vec<TransitionSource>,
    pipelines: HashMap<usize, wgpu::RenderPipeline>,
    pairs: HashMap<(usize, usize), wgpu::BindGroup>,
}

impl GpuState {
    pub(crate) fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let size = window.inner_size();
        let context = GpuContext::new(window, size, config.vsync)?;
        let layouts = PipelineLayouts::new(&context.device)?;

        let slides = load_slides(
            &context.device,
            &context.queue,
            &config.images,
            context.max_texture_dimension,
        );
        if slides.len() < 2 {
            bail!(
                "need at least 2 readable images, loaded {} of {}",
                slides.len(),
                config.images.len()
            );
        }
        tracing::info!(
            loaded = slides.len(),
            requested = config.images.len(),
            "slides uploaded"
        );

        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("transition uniforms"),
            size: std::mem::size_of::<TransitionUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform bind group"),
                layout: &layouts.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });
        let sampler = context.device.create_sampler(&config.sampler.descriptor());
        let uniforms = TransitionUniforms::new(context.size);

        Ok(Self {
            context,
            layouts,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            sampler,
            slides,
            transitions: config.transitions.clone(),
            pipelines: HashMap::new(),
            pairs: HashMap::new(),
        })
    }

    pub(crate) fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub(crate) fn transition_name(&self, transition: usize) -> &str {
        self.transitions
            .get(transition)
            .map(|source| source.name.as_str())
            .unwrap_or("<unknown>")
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
        self.uniforms.set_resolution(self.context.size);
    }

    /// Ensures the pipeline for `transition` exists, building it on first use.
    pub(crate) fn prepare(&mut self, transition: usize) -> Result<()> {
        if self.pipelines.contains_key(&transition) {
            return Ok(());
        }
        let Some(source) = self.transitions.get(transition) else {
            bail!("transition index {transition} out of range");
        };
        let pipeline = build_transition_pipeline(
            &self.context.device,
            &self.layouts,
            self.context.surface_format,
            source,
        )?;
        tracing::debug!(transition = %source.name, "built transition pipeline");
        self.pipelines.insert(transition, pipeline);
        Ok(())
    }

    pub(crate) fn render(&mut self, frame: &Frame) -> Result<(), wgpu::SurfaceError> {
        let surface_texture = match self.context.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.context.reconfigure();
                self.context.surface.get_current_texture()?
            }
            Err(err) => return Err(err),
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.uniforms.set_progress(frame.progress);
        self.context.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );

        if self.pairs.len() >= MAX_CACHED_PAIRS && !self.pairs.contains_key(&(frame.from, frame.to)) {
            self.pairs.clear();
        }
        let slides = &self.slides;
        let pair = match (slides.get(frame.from), slides.get(frame.to)) {
            (Some(from), Some(to)) => Some(
                self.pairs
                    .entry((frame.from, frame.to))
                    .or_insert_with(|| {
                        self.layouts
                            .slide_pair(&self.context.device, &from.view, &to.view, &self.sampler)
                    }),
            ),
            _ => None,
        };

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("transition pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            match (self.pipelines.get(&frame.transition), pair) {
                (Some(pipeline), Some(pair)) => {
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                    render_pass.set_bind_group(1, &*pair, &[]);
                    render_pass.set_vertex_buffer(0, self.layouts.vertex_buffer.slice(..));
                    render_pass.draw(0..4, 0..1);
                }
                _ => {
                    tracing::warn!(
                        transition = frame.transition,
                        from = frame.from,
                        to = frame.to,
                        "frame has no prepared pipeline or slide pair; clearing"
                    );
                }
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    pub(crate) fn slide_path(&self, index: usize) -> Option<&std::path::Path> {
        self.slides.get(index).map(|slide| slide.path.as_path())
    }
}
