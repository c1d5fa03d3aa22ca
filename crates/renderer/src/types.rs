use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use scheduler::{SlideOrder, SlideTiming};

use crate::compile::{assemble_fragment, AssembledFragment};

/// A transition file after assembly into a complete fragment shader.
#[derive(Clone, Debug)]
pub struct TransitionSource {
    pub name: String,
    pub path: PathBuf,
    pub fragment: AssembledFragment,
}

impl TransitionSource {
    /// Reads and assembles a transition from disk. The name is the file stem.
    /// Display name of the transition stored at `path`: its file stem.
    pub fn name_for(path: &Path) -> String {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read transition at {}", path.display()))?;
        Ok(Self::from_source(path, &source))
    }

    pub fn from_source(path: &Path, source: &str) -> Self {
        Self {
            name: Self::name_for(path),
            path: path.to_path_buf(),
            fragment: assemble_fragment(source),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Linear,
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirrorRepeat,
}

/// Filtering and addressing used when transitions sample `from` and `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SamplerSettings {
    pub filter: FilterMode,
    pub wrap: WrapMode,
}

impl SamplerSettings {
    pub(crate) fn descriptor(&self) -> wgpu::SamplerDescriptor<'static> {
        let filter = match self.filter {
            FilterMode::Linear => wgpu::FilterMode::Linear,
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
        };
        let address_mode = match self.wrap {
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
            WrapMode::MirrorRepeat => wgpu::AddressMode::MirrorRepeat,
        };
        wgpu::SamplerDescriptor {
            label: Some("slide sampler"),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        }
    }
}

/// Parameters for constructing a [`crate::Renderer`].
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Inner size of the window when not fullscreen.
    pub surface_size: (u32, u32),
    pub fullscreen: bool,
    pub vsync: bool,
    pub images: Vec<PathBuf>,
    pub transitions: Vec<TransitionSource>,
    pub timing: SlideTiming,
    pub order: SlideOrder,
    pub seed: u64,
    pub sampler: SamplerSettings,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            fullscreen: true,
            vsync: true,
            images: Vec::new(),
            transitions: Vec::new(),
            timing: SlideTiming::default(),
            order: SlideOrder::default(),
            seed: 0,
            sampler: SamplerSettings::default(),
        }
    }
}
