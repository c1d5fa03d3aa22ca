use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::imageops::{flip_vertical_in_place, FilterType};
use image::GenericImageView;
use wgpu::util::{DeviceExt, TextureDataOrder};

/// A decoded image resident on the GPU.
pub(crate) struct SlideTexture {
    pub path: PathBuf,
    pub _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: (u32, u32),
}

/// Decodes and uploads every image, skipping the ones that fail.
pub(crate) fn load_slides(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    paths: &[PathBuf],
    max_dimension: u32,
) -> Vec<SlideTexture> {
    let mut slides = Vec::with_capacity(paths.len());
    for path in paths {
        match load_slide(device, queue, path, max_dimension) {
            Ok(slide) => {
                tracing::debug!(
                    path = %path.display(),
                    width = slide.size.0,
                    height = slide.size.1,
                    "uploaded slide"
                );
                slides.push(slide);
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "skipping unreadable image");
            }
        }
    }
    slides
}

fn load_slide(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: &Path,
    max_dimension: u32,
) -> Result<SlideTexture> {
    let mut image =
        image::open(path).with_context(|| format!("failed to open image at {}", path.display()))?;
    let (width, height) = image.dimensions();
    if width > max_dimension || height > max_dimension {
        tracing::info!(
            path = %path.display(),
            width,
            height,
            max_dimension,
            "image exceeds GPU texture limit; downscaling"
        );
        image = image.resize(max_dimension, max_dimension, FilterType::Triangle);
    }
    let (width, height) = image.dimensions();
    let mut rgba = image.to_rgba8();
    // Row 0 of the texture becomes the bottom row so uv (0,0) is bottom-left.
    flip_vertical_in_place(&mut rgba);

    let label = format!("slide {}", path.display());
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(&label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        TextureDataOrder::LayerMajor,
        &rgba,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    Ok(SlideTexture {
        path: path.to_path_buf(),
        _texture: texture,
        view,
        size: (width, height),
    })
}
