//! Cross-platform data path resolution.
//!
//! Decides where the parameter store lives based on platform conventions
//! and container detection.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Resolved locations of persistent service data.
#[derive(Debug, Clone)]
pub struct DataPaths {
    /// Directory holding service data
    pub data_dir: PathBuf,
    /// Path to the parameter store file
    pub parameters_path: PathBuf,
}

/// Configuration for path resolution.
#[derive(Debug, Default)]
pub struct PathConfig {
    /// Explicit data directory (parameters.json will be inside)
    pub data_dir: Option<PathBuf>,
    /// Explicit path to the parameter store file
    pub parameters_path: Option<PathBuf>,
}

impl DataPaths {
    /// Resolve data paths based on configuration.
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit parameters_path if provided
    /// 2. Explicit data_dir if provided
    /// 3. Default directory (platform-specific or container-detected)
    pub fn resolve(config: PathConfig) -> anyhow::Result<Self> {
        let data_dir = match config.data_dir {
            Some(dir) => dir,
            None => Self::default_data_dir()?,
        };

        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir)?;
            info!("Created data directory: {}", data_dir.display());
        }

        let parameters_path = match config.parameters_path {
            Some(path) => {
                info!("Using custom parameter store: {}", path.display());
                path
            }
            None => data_dir.join("parameters.json"),
        };

        info!("Parameter store: {}", parameters_path.display());

        Ok(Self {
            data_dir,
            parameters_path,
        })
    }

    /// Determine the default data directory based on platform and environment.
    fn default_data_dir() -> anyhow::Result<PathBuf> {
        if Self::is_container() {
            info!("Container environment detected, using ./data/ for storage");
            return Ok(PathBuf::from("./data"));
        }

        if let Some(proj_dirs) = ProjectDirs::from("com", "rdk", "devdiag") {
            Ok(proj_dirs.data_dir().to_path_buf())
        } else {
            warn!("Could not determine user data directory, falling back to ./data/");
            Ok(PathBuf::from("./data"))
        }
    }

    /// Detect if running inside a container.
    fn is_container() -> bool {
        if Path::new("/.dockerenv").exists() {
            return true;
        }

        if let Ok(cgroup) = std::fs::read_to_string("/proc/self/cgroup") {
            if cgroup.contains("docker") || cgroup.contains("containerd") {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_data_dir() {
        let data_dir = DataPaths::default_data_dir().unwrap();
        assert!(!data_dir.as_os_str().is_empty());
    }

    #[test]
    fn test_resolve_with_data_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data_dir = temp_dir.path().join("diag");
        let config = PathConfig {
            data_dir: Some(data_dir.clone()),
            parameters_path: None,
        };

        let paths = DataPaths::resolve(config).unwrap();
        assert!(data_dir.is_dir());
        assert_eq!(paths.parameters_path, data_dir.join("parameters.json"));
    }

    #[test]
    fn test_parameters_path_overrides_data_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = PathConfig {
            data_dir: Some(temp_dir.path().to_path_buf()),
            parameters_path: Some(PathBuf::from("/override/parameters.json")),
        };

        let paths = DataPaths::resolve(config).unwrap();
        assert_eq!(paths.data_dir, temp_dir.path());
        assert_eq!(
            paths.parameters_path,
            PathBuf::from("/override/parameters.json")
        );
    }
}
