//! Discovery of telemetry report profiles.
//!
//! Profiles come from two places: the default profile pack shipped with the
//! image and the persistent folder where downloaded profiles are kept.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, warn};

/// Default profile pack shipped with the image.
pub const DEFAULT_PROFILES_FILE: &str = "/etc/t2profiles/default.json";

/// Folder holding one entry per persisted profile.
pub const DEFAULT_PERSISTENT_DIR: &str = "/opt/.t2persistentfolder/";

#[derive(Debug, Deserialize)]
struct ProfilePack {
    #[serde(default)]
    profiles: Vec<serde_json::Value>,
}

/// Enumerates the report profiles available on the device.
#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    profiles_file: PathBuf,
    persistent_dir: PathBuf,
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_PROFILES_FILE, DEFAULT_PERSISTENT_DIR)
    }
}

impl ProfileCatalog {
    pub fn new(profiles_file: impl Into<PathBuf>, persistent_dir: impl Into<PathBuf>) -> Self {
        Self {
            profiles_file: profiles_file.into(),
            persistent_dir: persistent_dir.into(),
        }
    }

    pub fn profiles_file(&self) -> &Path {
        &self.profiles_file
    }

    pub fn persistent_dir(&self) -> &Path {
        &self.persistent_dir
    }

    /// List profile names: the default pack first, then persisted profiles
    /// not already listed. Unreadable sources are logged and skipped.
    pub async fn available_profiles(&self) -> Vec<String> {
        let mut names = self.default_profiles().await;

        for entry in self.persisted_profiles().await {
            if !names.contains(&entry) {
                names.push(entry);
            }
        }

        names
    }

    /// Check whether `name` is one of the available profiles.
    pub async fn contains(&self, name: &str) -> bool {
        self.available_profiles().await.iter().any(|p| p == name)
    }

    async fn default_profiles(&self) -> Vec<String> {
        let contents = match fs::read_to_string(&self.profiles_file).await {
            Ok(contents) => contents,
            Err(e) => {
                error!("Failed to open {}: {}", self.profiles_file.display(), e);
                return Vec::new();
            }
        };

        let pack: ProfilePack = match serde_json::from_str(&contents) {
            Ok(pack) => pack,
            Err(e) => {
                error!("Failed to parse {}: {}", self.profiles_file.display(), e);
                return Vec::new();
            }
        };

        let mut names = Vec::with_capacity(pack.profiles.len());
        for profile in pack.profiles {
            match profile.get("name").and_then(|n| n.as_str()) {
                Some(name) => names.push(name.to_string()),
                None => error!(
                    "Failed to parse profile name from {}",
                    self.profiles_file.display()
                ),
            }
        }

        debug!(
            "Loaded {} default profiles from {}",
            names.len(),
            self.profiles_file.display()
        );
        names
    }

    /// Entry names of the persistent folder, sorted.
    async fn persisted_profiles(&self) -> Vec<String> {
        let mut dir = match fs::read_dir(&self.persistent_dir).await {
            Ok(dir) => dir,
            Err(e) => {
                debug!(
                    "No persistent profiles in {}: {}",
                    self.persistent_dir.display(),
                    e
                );
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        loop {
            match dir.next_entry().await {
                Ok(Some(entry)) => {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if name.is_empty() || name == "." || name == ".." {
                        continue;
                    }
                    names.push(name);
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(
                        "Error reading {}: {}",
                        self.persistent_dir.display(),
                        e
                    );
                    break;
                }
            }
        }

        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn catalog_in(dir: &TempDir) -> ProfileCatalog {
        ProfileCatalog::new(dir.path().join("default.json"), dir.path().join("persistent"))
    }

    #[tokio::test]
    async fn test_no_sources() {
        let dir = TempDir::new().unwrap();
        assert!(catalog_in(&dir).available_profiles().await.is_empty());
    }

    #[tokio::test]
    async fn test_default_pack_then_persisted() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("default.json"),
            r#"{"profiles":[{"name":"RDK_Default"},{"version":"2"},{"name":"Netflix"}]}"#,
        )
        .unwrap();
        let persistent = dir.path().join("persistent");
        fs::create_dir(&persistent).unwrap();
        fs::write(persistent.join("Netflix"), "").unwrap();
        fs::write(persistent.join("Youtube"), "").unwrap();
        fs::write(persistent.join("Amazon"), "").unwrap();

        let profiles = catalog_in(&dir).available_profiles().await;
        assert_eq!(profiles, vec!["RDK_Default", "Netflix", "Amazon", "Youtube"]);
    }

    #[tokio::test]
    async fn test_missing_pack_still_lists_persisted() {
        let dir = TempDir::new().unwrap();
        let persistent = dir.path().join("persistent");
        fs::create_dir(&persistent).unwrap();
        fs::create_dir(persistent.join("Downloaded")).unwrap();

        let catalog = catalog_in(&dir);
        assert_eq!(catalog.available_profiles().await, vec!["Downloaded"]);
        assert!(catalog.contains("Downloaded").await);
        assert!(!catalog.contains("RDK_Default").await);
    }

    #[tokio::test]
    async fn test_malformed_pack_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("default.json"), "{not json").unwrap();

        assert!(catalog_in(&dir).available_profiles().await.is_empty());
    }

    #[tokio::test]
    async fn test_pack_without_profiles_key() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("default.json"), r#"{"other":[]}"#).unwrap();

        assert!(catalog_in(&dir).available_profiles().await.is_empty());
    }
}
