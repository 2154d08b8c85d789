//! Runtime configuration from the process environment.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable naming the repository root.
pub const ROOT_ENV_VAR: &str = "VOLRAY_ROOT";

/// Configuration errors. All fatal: the viewer refuses to start without
/// its root directory.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{ROOT_ENV_VAR} is not set")]
    RootNotSet,
}

/// The resolved root directory, from which shader sources and presets are
/// located.
#[derive(Debug, Clone)]
pub struct RootDir {
    path: PathBuf,
}

impl RootDir {
    /// Resolves the root from [`ROOT_ENV_VAR`]. An unset or empty variable
    /// is a fatal configuration error; the binary reports it to standard
    /// output before exiting.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(ROOT_ENV_VAR) {
            Ok(value) if !value.is_empty() => Ok(Self { path: value.into() }),
            _ => Err(ConfigError::RootNotSet),
        }
    }

    /// A root at an explicit path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The root path itself.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the WGSL sources live, for hot reloading. Points at the
    /// in-tree shader directory so an unmodified checkout works as-is.
    #[must_use]
    pub fn shader_dir(&self) -> PathBuf {
        self.path.join("crates/volray-render/src/shaders")
    }

    /// Where transfer-curve presets live.
    #[must_use]
    pub fn preset_dir(&self) -> PathBuf {
        self.path.join("presets")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_directories() {
        let root = RootDir::new("/tmp/volray");
        assert_eq!(
            root.shader_dir(),
            PathBuf::from("/tmp/volray/crates/volray-render/src/shaders")
        );
        assert_eq!(root.preset_dir(), PathBuf::from("/tmp/volray/presets"));
    }
}
