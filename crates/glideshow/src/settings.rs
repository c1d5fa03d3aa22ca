use std::path::PathBuf;

use anyhow::{bail, Result};
use renderer::{FilterMode, RendererConfig, SamplerSettings, TransitionSource, WrapMode};
use scheduler::{OrderMode, ProgressCurve, SlideOrder, SlideTiming};
use showconfig::{CurveSetting, FilterSetting, OrderSetting, ShowConfig, WrapSetting};

use crate::cli::{CurveArg, FilterArg, RunArgs, WrapArg};

const DEFAULT_WINDOW_SIZE: (u32, u32) = (1280, 720);

/// Configuration file merged with command-line overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub images_dir: PathBuf,
    pub transitions_dir: PathBuf,
    pub timing: SlideTiming,
    pub order: SlideOrder,
    pub seed: Option<u64>,
    pub fullscreen: bool,
    pub vsync: bool,
    pub window_size: (u32, u32),
    pub sampler: SamplerSettings,
}

impl Settings {
    pub fn resolve(config: &ShowConfig, args: &RunArgs) -> Result<Self> {
        let transition = args.transition_duration.unwrap_or(config.timing.transition);
        if transition.is_zero() {
            bail!("transition duration must be greater than zero");
        }
        let pause = args.pause.unwrap_or(config.timing.pause);
        let curve = match args.curve {
            Some(arg) => curve_from_arg(arg),
            None => curve_from_setting(config.timing.curve),
        };

        let order = SlideOrder {
            images: if args.shuffle {
                OrderMode::Shuffle
            } else {
                order_from_setting(config.order.images)
            },
            transitions: if args.shuffle_transitions {
                OrderMode::Shuffle
            } else {
                order_from_setting(config.order.transitions)
            },
        };

        let window_size = match args.size {
            Some(size) => size,
            None => config.display.size()?.unwrap_or(DEFAULT_WINDOW_SIZE),
        };

        let sampler = SamplerSettings {
            filter: match args.filter {
                Some(FilterArg::Linear) => FilterMode::Linear,
                Some(FilterArg::Nearest) => FilterMode::Nearest,
                None => filter_from_setting(config.sampling.filter),
            },
            wrap: match args.wrap {
                Some(arg) => wrap_from_arg(arg),
                None => wrap_from_setting(config.sampling.wrap),
            },
        };

        Ok(Self {
            images_dir: args
                .images
                .clone()
                .unwrap_or_else(|| config.sources.images.clone()),
            transitions_dir: args
                .transitions
                .clone()
                .unwrap_or_else(|| config.sources.transitions.clone()),
            timing: SlideTiming {
                pause,
                transition,
                curve,
            },
            order,
            seed: args.seed.or(config.order.seed),
            fullscreen: config.display.fullscreen && !args.windowed,
            vsync: config.display.vsync && !args.no_vsync,
            window_size,
            sampler,
        })
    }

    pub fn renderer_config(
        &self,
        images: Vec<PathBuf>,
        transitions: Vec<TransitionSource>,
        seed: u64,
    ) -> RendererConfig {
        RendererConfig {
            surface_size: self.window_size,
            fullscreen: self.fullscreen,
            vsync: self.vsync,
            images,
            transitions,
            timing: self.timing,
            order: self.order,
            seed,
            sampler: self.sampler,
        }
    }
}

fn curve_from_setting(setting: CurveSetting) -> ProgressCurve {
    match setting {
        CurveSetting::Linear => ProgressCurve::Linear,
        CurveSetting::Smoothstep => ProgressCurve::Smoothstep,
        CurveSetting::EaseInOut => ProgressCurve::EaseInOut,
    }
}

fn curve_from_arg(arg: CurveArg) -> ProgressCurve {
    match arg {
        CurveArg::Linear => ProgressCurve::Linear,
        CurveArg::Smoothstep => ProgressCurve::Smoothstep,
        CurveArg::EaseInOut => ProgressCurve::EaseInOut,
    }
}

fn order_from_setting(setting: OrderSetting) -> OrderMode {
    match setting {
        OrderSetting::Sequential => OrderMode::Sequential,
        OrderSetting::Shuffle => OrderMode::Shuffle,
    }
}

fn filter_from_setting(setting: FilterSetting) -> FilterMode {
    match setting {
        FilterSetting::Linear => FilterMode::Linear,
        FilterSetting::Nearest => FilterMode::Nearest,
    }
}

fn wrap_from_setting(setting: WrapSetting) -> WrapMode {
    match setting {
        WrapSetting::Clamp => WrapMode::ClampToEdge,
        WrapSetting::Repeat => WrapMode::Repeat,
        WrapSetting::Mirror => WrapMode::MirrorRepeat,
    }
}

fn wrap_from_arg(arg: WrapArg) -> WrapMode {
    match arg {
        WrapArg::Clamp => WrapMode::ClampToEdge,
        WrapArg::Repeat => WrapMode::Repeat,
        WrapArg::Mirror => WrapMode::MirrorRepeat,
    }
}
