use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "glideshow",
    author,
    version,
    about = "Full-screen image slideshow with GLSL transitions",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Configuration file; defaults to `glideshow.toml` in the config directory.
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Folder of images to show.
    #[arg(long, value_name = "DIR", global = true)]
    pub images: Option<PathBuf>,

    /// Folder of `.glsl` transitions.
    #[arg(long, value_name = "DIR", global = true)]
    pub transitions: Option<PathBuf>,

    /// How long each image is held before its transition (seconds or e.g. `2s`).
    #[arg(long, value_name = "SECS", value_parser = parse_duration)]
    pub pause: Option<Duration>,

    /// Length of each transition (seconds or e.g. `1500ms`).
    #[arg(long, value_name = "SECS", value_parser = parse_duration)]
    pub transition_duration: Option<Duration>,

    /// Easing applied to transition progress.
    #[arg(long, value_enum, value_name = "CURVE")]
    pub curve: Option<CurveArg>,

    /// Show images in shuffled order.
    #[arg(long)]
    pub shuffle: bool,

    /// Play transitions in shuffled order.
    #[arg(long)]
    pub shuffle_transitions: bool,

    /// Seed for shuffled orders; random when omitted.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Open a regular window instead of going fullscreen.
    #[arg(long)]
    pub windowed: bool,

    /// Window size when not fullscreen (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = showconfig::parse_size)]
    pub size: Option<(u32, u32)>,

    /// Present without waiting for vertical sync.
    #[arg(long)]
    pub no_vsync: bool,

    /// Texture filtering used when sampling images.
    #[arg(long, value_enum, value_name = "FILTER")]
    pub filter: Option<FilterArg>,

    /// Texture wrapping used outside the [0, 1] coordinate range.
    #[arg(long, value_enum, value_name = "WRAP")]
    pub wrap: Option<WrapArg>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile every transition offline and report the failures.
    Check,
    /// Print the images and transitions that would be played.
    List,
    /// Print the assembled fragment shader for a transition file.
    Shader {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurveArg {
    Linear,
    Smoothstep,
    EaseInOut,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterArg {
    Linear,
    Nearest,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapArg {
    Clamp,
    Repeat,
    Mirror,
}

pub fn parse() -> Cli {
    Cli::parse()
}

/// Accepts plain seconds (`1.5`) or a humantime string (`1500ms`, `2s`).
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("duration must not be empty".to_string());
    }
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if seconds.is_nan() || seconds < 0.0 {
            return Err(format!("duration '{trimmed}' must be a non-negative number"));
        }
        return Duration::try_from_secs_f64(seconds)
            .map_err(|err| format!("invalid duration '{trimmed}': {err}"));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{trimmed}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_seconds_and_humantime() {
        assert_eq!(parse_duration("1.5"), Ok(Duration::from_millis(1500)));
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("0"), Ok(Duration::ZERO));
        assert!(parse_duration("-1").is_err());
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn oversized_seconds_are_rejected() {
        assert!(parse_duration("1e30").is_err());
        assert!(parse_duration("inf").is_err());
        assert!(parse_duration("NaN").is_err());
    }

    #[test]
    fn source_flags_are_global() {
        let cli = Cli::try_parse_from(["glideshow", "list", "--images", "/srv/pics"]).unwrap();
        assert!(matches!(cli.command, Some(Command::List)));
        assert_eq!(cli.run.images, Some(PathBuf::from("/srv/pics")));
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "glideshow",
            "--curve",
            "ease-in-out",
            "--size",
            "800x600",
            "--wrap",
            "mirror",
            "--shuffle",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.curve, Some(CurveArg::EaseInOut));
        assert_eq!(cli.run.size, Some((800, 600)));
        assert_eq!(cli.run.wrap, Some(WrapArg::Mirror));
        assert!(cli.run.shuffle);
    }
}
