use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extensions recognised as slideshow images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "bmp", "tiff", "tif", "gif"];
pub const TRANSITION_EXTENSION: &str = "glsl";

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("{kind} folder {} does not exist", .path.display())]
    Missing { kind: &'static str, path: PathBuf },
    #[error("{kind} path {} is not a directory", .path.display())]
    NotADirectory { kind: &'static str, path: PathBuf },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("need at least 2 images in {}, found {found}", .path.display())]
    NotEnoughImages { path: PathBuf, found: usize },
    #[error("no .glsl transitions found in {}", .path.display())]
    NoTransitions { path: PathBuf },
}

/// Lists image files directly inside `dir`, sorted by path.
pub fn find_images(dir: &Path) -> Result<Vec<PathBuf>, AssetError> {
    scan(dir, "images", |ext| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

/// Lists `.glsl` files directly inside `dir`, sorted by path.
pub fn find_transitions(dir: &Path) -> Result<Vec<PathBuf>, AssetError> {
    scan(dir, "transitions", |ext| {
        ext.eq_ignore_ascii_case(TRANSITION_EXTENSION)
    })
}

/// Like [`find_images`] but requires enough images for one transition.
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>, AssetError> {
    let images = find_images(dir)?;
    if images.len() < 2 {
        return Err(AssetError::NotEnoughImages {
            path: dir.to_path_buf(),
            found: images.len(),
        });
    }
    Ok(images)
}

pub fn discover_transitions(dir: &Path) -> Result<Vec<PathBuf>, AssetError> {
    let transitions = find_transitions(dir)?;
    if transitions.is_empty() {
        return Err(AssetError::NoTransitions {
            path: dir.to_path_buf(),
        });
    }
    Ok(transitions)
}

fn scan(
    dir: &Path,
    kind: &'static str,
    accepts: impl Fn(&str) -> bool,
) -> Result<Vec<PathBuf>, AssetError> {
    if !dir.exists() {
        return Err(AssetError::Missing {
            kind,
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(AssetError::NotADirectory {
            kind,
            path: dir.to_path_buf(),
        });
    }

    let io_error = |source| AssetError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(&accepts);
        if matches {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn finds_images_case_insensitively_and_sorted() {
        let root = TempDir::new().unwrap();
        for name in ["b.PNG", "a.jpeg", "c.TIF", "notes.txt", "d.webp", "noext"] {
            touch(root.path(), name);
        }
        fs::create_dir(root.path().join("nested.png")).unwrap();

        let images = find_images(root.path()).unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.jpeg", "b.PNG", "c.TIF"]);
    }

    #[test]
    fn finds_only_glsl_transitions() {
        let root = TempDir::new().unwrap();
        for name in ["wipe.glsl", "fade.GLSL", "readme.md", "fade.frag"] {
            touch(root.path(), name);
        }
        let transitions = find_transitions(root.path()).unwrap();
        assert_eq!(transitions.len(), 2);
        assert!(transitions[0].ends_with("fade.GLSL"));
        assert!(transitions[1].ends_with("wipe.glsl"));
    }

    #[test]
    fn missing_and_non_directory_paths_are_errors() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("missing");
        assert!(matches!(
            find_images(&missing),
            Err(AssetError::Missing { kind: "images", .. })
        ));

        touch(root.path(), "file.png");
        assert!(matches!(
            find_transitions(&root.path().join("file.png")),
            Err(AssetError::NotADirectory { .. })
        ));
    }

    #[test]
    fn discovery_enforces_minimum_counts() {
        let root = TempDir::new().unwrap();
        touch(root.path(), "only.png");
        assert!(matches!(
            discover_images(root.path()),
            Err(AssetError::NotEnoughImages { found: 1, .. })
        ));
        assert!(matches!(
            discover_transitions(root.path()),
            Err(AssetError::NoTransitions { .. })
        ));
    }
}
