//! Version and build information embedded at compile time.

use serde::Serialize;
use utoipa::ToSchema;

/// Build and version information
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VersionInfo {
    /// Package version from Cargo.toml
    pub version: &'static str,
    /// Git commit hash (short)
    pub git_hash: &'static str,
    /// Git tag (if on a tagged commit)
    pub git_tag: &'static str,
    /// Git branch name
    pub git_branch: &'static str,
    /// Whether the working directory had uncommitted changes
    pub git_dirty: bool,
    /// Build timestamp (ISO 8601 format)
    pub build_timestamp: &'static str,
    /// Operating system name and version
    pub os_info: String,
}

impl VersionInfo {
    pub fn get() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            git_hash: env!("GIT_HASH"),
            git_tag: env!("GIT_TAG"),
            git_branch: env!("GIT_BRANCH"),
            git_dirty: env!("GIT_DIRTY") == "true",
            build_timestamp: env!("BUILD_TIMESTAMP"),
            os_info: Self::os_info(),
        }
    }

    /// Read the distribution name from /etc/os-release, falling back to
    /// the compile-time target.
    fn os_info() -> String {
        let fallback = || format!("{} {}", std::env::consts::OS, std::env::consts::ARCH);

        let Ok(content) = std::fs::read_to_string("/etc/os-release") else {
            return fallback();
        };

        let mut name = None;
        let mut version = None;
        for line in content.lines() {
            if let Some(value) = line.strip_prefix("PRETTY_NAME=") {
                return value.trim_matches('"').to_string();
            }
            if let Some(value) = line.strip_prefix("NAME=") {
                name = Some(value.trim_matches('"').to_string());
            }
            if let Some(value) = line.strip_prefix("VERSION=") {
                version = Some(value.trim_matches('"').to_string());
            }
        }

        match (name, version) {
            (Some(n), Some(v)) => format!("{} {}", n, v),
            (Some(n), None) => n,
            _ => fallback(),
        }
    }

    /// Human-readable version string.
    ///
    /// Returns:
    /// - "v0.1.0" if on a tagged release
    /// - "v0.1.0-dev+abc12345" otherwise
    /// - "v0.1.0-dev+abc12345-dirty" if there are uncommitted changes
    pub fn version_string(&self) -> String {
        if !self.git_tag.is_empty() {
            return self.git_tag.to_string();
        }
        let mut version = format!("v{}-dev+{}", self.version, self.git_hash);
        if self.git_dirty {
            version.push_str("-dirty");
        }
        version
    }
}
