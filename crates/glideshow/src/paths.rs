use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories_next::ProjectDirs;
use showconfig::CONFIG_FILE_NAME;

pub const ENV_CONFIG_DIR: &str = "GLIDESHOW_CONFIG_DIR";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "glideshow";
const APPLICATION: &str = "glideshow";

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
}

impl AppPaths {
    /// `$GLIDESHOW_CONFIG_DIR` when set, else the platform config directory.
    pub fn discover() -> Result<Self> {
        if let Some(config_dir) = env_override(ENV_CONFIG_DIR) {
            return Ok(Self { config_dir });
        }
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
            .ok_or_else(|| anyhow!("failed to determine user directories"))?;
        Ok(Self {
            config_dir: project_dirs.config_dir().to_path_buf(),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }
}

/// Picks the configuration file to load, if any.
///
/// An explicit path is returned as-is so a missing file is reported. The
/// discovered default is only returned when it exists.
pub fn resolve_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        return Ok(Some(path.to_path_buf()));
    }
    Ok(default_config_file(AppPaths::discover()))
}

/// The default config file when it exists. Without a config directory the
/// built-in defaults apply.
fn default_config_file(discovered: Result<AppPaths>) -> Option<PathBuf> {
    let paths = match discovered {
        Ok(paths) => paths,
        Err(err) => {
            tracing::debug!("{err:#}; using built-in defaults");
            return None;
        }
    };
    let candidate = paths.config_file();
    if candidate.is_file() {
        Some(candidate)
    } else {
        tracing::debug!(
            config_dir = %paths.config_dir().display(),
            "no {CONFIG_FILE_NAME} found; using built-in defaults"
        );
        None
    }
}

fn env_override(name: &str) -> Option<PathBuf> {
    match env::var_os(name) {
        Some(value) if !value.as_os_str().is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::fs;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    fn env_lock() -> &'static Mutex<()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    struct EnvGuard {
        key: &'static str,
        previous: Option<OsString>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &Path) -> Self {
            let previous = env::var_os(key);
            env::set_var(key, value);
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = self.previous.take() {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    #[test]
    fn env_override_takes_precedence() {
        let _guard = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        let _env = EnvGuard::set(ENV_CONFIG_DIR, root.path());

        let paths = AppPaths::discover().unwrap();
        assert_eq!(paths.config_dir(), root.path());
        assert_eq!(paths.config_file(), root.path().join("glideshow.toml"));
    }

    #[test]
    fn missing_default_file_means_defaults() {
        let _guard = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        let _env = EnvGuard::set(ENV_CONFIG_DIR, root.path());

        assert_eq!(resolve_config_file(None).unwrap(), None);

        fs::write(root.path().join("glideshow.toml"), "version = 1\n").unwrap();
        assert_eq!(
            resolve_config_file(None).unwrap(),
            Some(root.path().join("glideshow.toml"))
        );
    }

    #[test]
    fn missing_user_directories_mean_defaults() {
        let discovered = Err(anyhow!("failed to determine user directories"));
        assert_eq!(default_config_file(discovered), None);
    }

    #[test]
    fn explicit_path_is_returned_even_when_missing() {
        let explicit = Path::new("/nonexistent/glideshow.toml");
        assert_eq!(
            resolve_config_file(Some(explicit)).unwrap(),
            Some(explicit.to_path_buf())
        );
    }
}
