use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use scheduler::{Frame, Phase, Slideshow};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Fullscreen, WindowBuilder};

use tracing::{error, info, warn};

use crate::gpu::GpuState;
use crate::types::RendererConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Quit,
    Skip,
}

fn key_action(event: &KeyEvent) -> Option<KeyAction> {
    if event.state != ElementState::Pressed || event.repeat {
        return None;
    }
    match &event.logical_key {
        Key::Named(NamedKey::Escape) => Some(KeyAction::Quit),
        Key::Named(NamedKey::Space | NamedKey::ArrowRight) => Some(KeyAction::Skip),
        Key::Character(value) if value.eq_ignore_ascii_case("q") => Some(KeyAction::Quit),
        Key::Character(value) if value.as_str() == " " => Some(KeyAction::Skip),
        _ => None,
    }
}

/// Frame count and wall time of one transition phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TransitionStats {
    pub frames: u32,
    pub elapsed: Duration,
}

impl TransitionStats {
    pub fn fps(&self) -> Option<f64> {
        let seconds = self.elapsed.as_secs_f64();
        (seconds > 0.0).then(|| f64::from(self.frames) / seconds)
    }
}

#[derive(Debug, Default)]
pub(crate) struct FrameStats {
    step: Option<u64>,
    frames: u32,
    started: Option<Instant>,
}

impl FrameStats {
    /// Counts transition-phase frames; returns totals on the step's last frame.
    pub fn record(&mut self, frame: &Frame, now: Instant) -> Option<TransitionStats> {
        if self.step != Some(frame.step) {
            *self = Self {
                step: Some(frame.step),
                ..Self::default()
            };
        }
        if frame.phase == Phase::Transition {
            self.started.get_or_insert(now);
            self.frames += 1;
        }
        if !frame.completed {
            return None;
        }
        let started = self.started.take()?;
        let stats = TransitionStats {
            frames: self.frames,
            elapsed: now.saturating_duration_since(started),
        };
        self.frames = 0;
        Some(stats)
    }
}

pub(crate) fn run(config: RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let (width, height) = config.surface_size;
    let mut builder = WindowBuilder::new()
        .with_title("glideshow")
        .with_inner_size(PhysicalSize::new(width.max(1), height.max(1)));
    if config.fullscreen {
        builder = builder.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }
    let window = builder
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create slideshow window: {err}"))?;
    let window = Arc::new(window);
    if config.fullscreen {
        window.set_cursor_visible(false);
    }

    let mut gpu = GpuState::new(window.clone(), &config)?;
    let mut slideshow = Slideshow::new(
        gpu.slide_count(),
        config.transitions.len(),
        config.timing,
        config.order,
        config.seed,
        Instant::now(),
    )?;
    let mut stats = FrameStats::default();
    let mut shown_step = None;
    let mut failure: Option<anyhow::Error> = None;

    info!(
        slides = gpu.slide_count(),
        transitions = config.transitions.len(),
        fullscreen = config.fullscreen,
        "starting slideshow"
    );

    let run_result = event_loop.run(|event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => elwt.exit(),
            WindowEvent::KeyboardInput { event, .. } => match key_action(&event) {
                Some(KeyAction::Quit) => elwt.exit(),
                Some(KeyAction::Skip) => {
                    slideshow.skip(Instant::now());
                    window.request_redraw();
                }
                None => {}
            },
            WindowEvent::Resized(new_size) => gpu.resize(new_size),
            WindowEvent::ScaleFactorChanged {
                mut inner_size_writer,
                ..
            } => {
                let _ = inner_size_writer.request_inner_size(gpu.size());
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let frame = slideshow.frame(now);

                if let Err(err) = gpu.prepare(frame.transition) {
                    warn!(
                        transition = %gpu.transition_name(frame.transition),
                        "dropping transition: {err:#}"
                    );
                    if let Err(err) = slideshow.retire_transition(frame.transition, now) {
                        failure = Some(anyhow!("no usable transitions left: {err}"));
                        elwt.exit();
                    }
                    window.request_redraw();
                    return;
                }

                if shown_step != Some(frame.step) {
                    shown_step = Some(frame.step);
                    info!(
                        step = frame.step,
                        from = %gpu.slide_path(frame.from).map(|p| p.display().to_string()).unwrap_or_default(),
                        to = %gpu.slide_path(frame.to).map(|p| p.display().to_string()).unwrap_or_default(),
                        transition = %gpu.transition_name(frame.transition),
                        "next slide"
                    );
                }

                match gpu.render(&frame) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        gpu.resize(gpu.size());
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        failure = Some(anyhow!("surface out of memory"));
                        elwt.exit();
                        return;
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        warn!("surface timeout; retrying next frame");
                    }
                    Err(other) => {
                        warn!("surface error: {other:?}; retrying next frame");
                    }
                }

                if let Some(report) = stats.record(&frame, Instant::now()) {
                    info!(
                        transition = %gpu.transition_name(frame.transition),
                        frames = report.frames,
                        fps = format_args!("{:.1}", report.fps().unwrap_or(0.0)),
                        "transition finished"
                    );
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            window.request_redraw();
            elwt.set_control_flow(ControlFlow::Poll);
        }
        _ => {}
    });

    if let Err(err) = run_result {
        error!("window event loop error: {err}");
        return Err(anyhow!("window event loop error: {err}"));
    }
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(step: u64, phase: Phase, progress: f32, completed: bool) -> Frame {
        Frame {
            step,
            from: 0,
            to: 1,
            transition: 0,
            phase,
            progress,
            completed,
        }
    }

    #[test]
    fn hold_frames_are_not_counted() {
        let mut stats = FrameStats::default();
        let start = Instant::now();
        assert_eq!(stats.record(&frame(0, Phase::Hold, 0.0, false), start), None);
        assert_eq!(stats.frames, 0);
        assert!(stats.started.is_none());
    }

    #[test]
    fn completed_transition_reports_frames() {
        let mut stats = FrameStats::default();
        let start = Instant::now();
        stats.record(&frame(0, Phase::Transition, 0.1, false), start);
        stats.record(
            &frame(0, Phase::Transition, 0.5, false),
            start + Duration::from_millis(500),
        );
        let report = stats
            .record(
                &frame(0, Phase::Transition, 1.0, true),
                start + Duration::from_secs(1),
            )
            .expect("report on completion");
        assert_eq!(report.frames, 3);
        assert_eq!(report.elapsed, Duration::from_secs(1));
        assert_eq!(report.fps(), Some(3.0));
    }

    #[test]
    fn new_step_resets_counters() {
        let mut stats = FrameStats::default();
        let start = Instant::now();
        stats.record(&frame(0, Phase::Transition, 0.4, false), start);
        stats.record(&frame(1, Phase::Hold, 0.0, false), start);
        assert_eq!(stats.frames, 0);
        assert_eq!(stats.step, Some(1));
    }

    #[test]
    fn zero_length_transition_has_no_fps() {
        let stats = TransitionStats {
            frames: 1,
            elapsed: Duration::ZERO,
        };
        assert_eq!(stats.fps(), None);
    }
}
