use bytemuck::{Pod, Zeroable};
use winit::dpi::PhysicalSize;

/// CPU copy of the `TransitionParams` block declared in the fragment header.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct TransitionUniforms {
    pub progress: f32,
    pub ratio: f32,
    pub resolution: [f32; 2],
}

impl TransitionUniforms {
    pub fn new(size: PhysicalSize<u32>) -> Self {
        let mut uniforms = Self {
            progress: 0.0,
            ratio: 1.0,
            resolution: [0.0; 2],
        };
        uniforms.set_resolution(size);
        uniforms
    }

    pub fn set_resolution(&mut self, size: PhysicalSize<u32>) {
        let width = size.width.max(1) as f32;
        let height = size.height.max(1) as f32;
        self.resolution = [width, height];
        self.ratio = width / height;
    }

    pub fn set_progress(&mut self, progress: f32) {
        self.progress = progress.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_std140_block() {
        assert_eq!(std::mem::size_of::<TransitionUniforms>(), 16);
        assert_eq!(std::mem::offset_of!(TransitionUniforms, progress), 0);
        assert_eq!(std::mem::offset_of!(TransitionUniforms, ratio), 4);
        assert_eq!(std::mem::offset_of!(TransitionUniforms, resolution), 8);
    }

    #[test]
    fn ratio_follows_resolution() {
        let mut uniforms = TransitionUniforms::new(PhysicalSize::new(1920, 1080));
        assert!((uniforms.ratio - 16.0 / 9.0).abs() < 1e-6);
        uniforms.set_resolution(PhysicalSize::new(0, 0));
        assert_eq!(uniforms.resolution, [1.0, 1.0]);
        assert_eq!(uniforms.ratio, 1.0);
    }

    #[test]
    fn progress_is_clamped() {
        let mut uniforms = TransitionUniforms::new(PhysicalSize::new(4, 4));
        uniforms.set_progress(1.5);
        assert_eq!(uniforms.progress, 1.0);
        uniforms.set_progress(-0.1);
        assert_eq!(uniforms.progress, 0.0);
    }
}
