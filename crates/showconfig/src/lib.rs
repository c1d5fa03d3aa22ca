use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::Deserialize;

/// File name looked up inside configuration directories.
pub const CONFIG_FILE_NAME: &str = "glideshow.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShowConfig {
    pub version: u32,
    #[serde(default)]
    pub sources: Sources,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub order: Order,
    #[serde(default)]
    pub display: Display,
    #[serde(default)]
    pub sampling: Sampling,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            version: 1,
            sources: Sources::default(),
            timing: Timing::default(),
            order: Order::default(),
            display: Display::default(),
            sampling: Sampling::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Sources {
    pub images: PathBuf,
    pub transitions: PathBuf,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            images: PathBuf::from("oms-images"),
            transitions: PathBuf::from("transitions"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Timing {
    #[serde(default = "default_pause", deserialize_with = "deserialize_duration")]
    pub pause: Duration,
    #[serde(
        default = "default_transition",
        deserialize_with = "deserialize_duration"
    )]
    pub transition: Duration,
    #[serde(default)]
    pub curve: CurveSetting,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            pause: default_pause(),
            transition: default_transition(),
            curve: CurveSetting::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CurveSetting {
    #[default]
    Linear,
    Smoothstep,
    #[serde(alias = "ease_in_out", alias = "easeinout")]
    EaseInOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSetting {
    #[default]
    #[serde(alias = "continuous")]
    Sequential,
    Shuffle,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Order {
    pub images: OrderSetting,
    pub transitions: OrderSetting,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Display {
    pub fullscreen: bool,
    pub vsync: bool,
    pub size: Option<String>,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            fullscreen: true,
            vsync: true,
            size: None,
        }
    }
}

impl Display {
    /// Parses the optional `WIDTHxHEIGHT` size string.
    pub fn size(&self) -> Result<Option<(u32, u32)>, ConfigError> {
        self.size
            .as_deref()
            .map(|raw| parse_size(raw).map_err(ConfigError::Invalid))
            .transpose()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterSetting {
    #[default]
    Linear,
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapSetting {
    #[default]
    #[serde(alias = "clamp-to-edge", alias = "clamp_to_edge")]
    Clamp,
    Repeat,
    #[serde(alias = "mirror-repeat", alias = "mirror_repeat")]
    Mirror,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct Sampling {
    pub filter: FilterSetting,
    pub wrap: WrapSetting,
}

fn default_pause() -> Duration {
    Duration::from_secs_f32(1.0)
}

fn default_transition() -> Duration {
    Duration::from_secs_f32(1.5)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }
    }

    deserializer.deserialize_any(Visitor)
}

/// Parses `WIDTHxHEIGHT` into a pair of non-zero dimensions.
pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{value}'; expected WIDTHxHEIGHT"))?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width in size '{value}'"))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height in size '{value}'"))?;
    if width == 0 || height == 0 {
        return Err(format!("size '{value}' must be greater than zero"));
    }
    Ok((width, height))
}

impl ShowConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: ShowConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.sources.images.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "sources.images must not be empty".into(),
            ));
        }

        if self.sources.transitions.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "sources.transitions must not be empty".into(),
            ));
        }

        if self.timing.transition.is_zero() {
            return Err(ConfigError::Invalid(
                "timing.transition must be greater than zero".into(),
            ));
        }

        self.display.size()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1

[sources]
images = "/srv/photos"
transitions = "/srv/transitions"

[timing]
pause = "2s"
transition = 0.75
curve = "ease-in-out"

[order]
images = "shuffle"
transitions = "sequential"
seed = 42

[display]
fullscreen = false
vsync = false
size = "1280x720"

[sampling]
filter = "nearest"
wrap = "mirror"
"#;

    #[test]
    fn parses_sample_config() {
        let config = ShowConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.sources.images, PathBuf::from("/srv/photos"));
        assert_eq!(config.timing.pause, Duration::from_secs(2));
        assert_eq!(config.timing.transition, Duration::from_millis(750));
        assert_eq!(config.timing.curve, CurveSetting::EaseInOut);
        assert_eq!(config.order.images, OrderSetting::Shuffle);
        assert_eq!(config.order.transitions, OrderSetting::Sequential);
        assert_eq!(config.order.seed, Some(42));
        assert!(!config.display.fullscreen);
        assert_eq!(config.display.size().unwrap(), Some((1280, 720)));
        assert_eq!(config.sampling.filter, FilterSetting::Nearest);
        assert_eq!(config.sampling.wrap, WrapSetting::Mirror);
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = ShowConfig::from_toml_str("version = 1").unwrap();
        assert_eq!(config.sources.images, PathBuf::from("oms-images"));
        assert_eq!(config.sources.transitions, PathBuf::from("transitions"));
        assert_eq!(config.timing.pause, Duration::from_secs(1));
        assert_eq!(config.timing.transition, Duration::from_millis(1500));
        assert_eq!(config.timing.curve, CurveSetting::Linear);
        assert!(config.display.fullscreen);
        assert!(config.display.vsync);
        assert_eq!(config.sampling.wrap, WrapSetting::Clamp);
    }

    #[test]
    fn rejects_unknown_version() {
        let err = ShowConfig::from_toml_str("version = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_transition() {
        let err = ShowConfig::from_toml_str(
            r#"
version = 1
[timing]
transition = 0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_size() {
        let err = ShowConfig::from_toml_str(
            r#"
version = 1
[display]
size = "wide"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_negative_duration() {
        let err = ShowConfig::from_toml_str(
            r#"
version = 1
[timing]
pause = -1
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_unrepresentable_duration() {
        for pause in ["1e30", "inf", "nan"] {
            let input = format!("version = 1\n[timing]\npause = {pause}\n");
            let err = ShowConfig::from_toml_str(&input).unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)), "{pause}: {err}");
        }
    }

    #[test]
    fn parse_size_accepts_upper_case_separator() {
        assert_eq!(parse_size("640X480"), Ok((640, 480)));
        assert!(parse_size("0x480").is_err());
    }
}
