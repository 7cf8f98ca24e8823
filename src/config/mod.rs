//! Configuration management module
//!
//! Resolves the cache configuration once from the environment so the rest of
//! the crate receives it as a plain value

use crate::error::SelectError;
use crate::system::System;
use anyhow::Result;
use std::env::VarError;
use std::path::{Path, PathBuf};

/// Environment key selecting the persistent cache and optionally its base directory
pub const CACHE_ENV: &str = "GIT_SELECT_CACHE";

/// Directory name under the home directory used when no base is given
pub const DEFAULT_CACHE_DIR_NAME: &str = ".git-select-cache";

/// Where the working tree for an invocation lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CacheMode {
    /// Reused across invocations, keyed by repository and snapshot
    Persistent,
    /// Created for one invocation and removed at exit
    Ephemeral,
}

/// Cache configuration resolved at the boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub mode: CacheMode,
    /// Base directory override; `None` selects the default location
    pub base_dir: Option<PathBuf>,
}

impl CacheConfig {
    /// Ephemeral cache configuration
    #[must_use]
    #[inline]
    pub const fn ephemeral() -> Self {
        Self {
            mode: CacheMode::Ephemeral,
            base_dir: None,
        }
    }

    /// Persistent cache configuration with an optional base directory
    #[must_use]
    #[inline]
    pub const fn persistent(base_dir: Option<PathBuf>) -> Self {
        Self {
            mode: CacheMode::Persistent,
            base_dir,
        }
    }

    /// Interpret the raw value of [`CACHE_ENV`]
    ///
    /// - absent: ephemeral
    /// - present but blank: persistent under the default base
    /// - present: persistent under the trimmed value
    #[must_use]
    pub fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None => Self::ephemeral(),
            Some("") => Self::persistent(None),
            Some(base) => Self::persistent(Some(PathBuf::from(base))),
        }
    }

    /// Read [`CACHE_ENV`] through the system abstraction
    ///
    /// # Errors
    ///
    /// Returns a `SelectError::Configuration` if the variable is not valid unicode
    pub fn from_system(system: &dyn System) -> Result<Self> {
        match system.env_var(CACHE_ENV) {
            Ok(value) => Ok(Self::from_value(Some(&value))),
            Err(VarError::NotPresent) => Ok(Self::from_value(None)),
            Err(VarError::NotUnicode(_)) => Err(SelectError::configuration(format!(
                "{CACHE_ENV} is set but is not valid unicode"
            ))
            .into()),
        }
    }

    /// Base directory for the persistent cache
    ///
    /// # Errors
    ///
    /// Returns a `SelectError::Configuration` if no override is set and the
    /// home directory cannot be determined
    pub fn resolve_base_dir(&self, system: &dyn System) -> Result<PathBuf> {
        if let Some(base) = self.base_dir.as_deref() {
            return Ok(base.to_path_buf());
        }

        system
            .home_dir()
            .map(|home| default_base_dir(&home))
            .ok_or_else(|| {
                SelectError::configuration(format!(
                    "Cannot determine home directory for the default cache; set {CACHE_ENV} to a directory"
                ))
                .into()
            })
    }
}

/// Default persistent cache base under `home`
#[must_use]
#[inline]
pub fn default_base_dir(home: &Path) -> PathBuf {
    home.join(DEFAULT_CACHE_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    #[test]
    fn absent_key_selects_ephemeral() {
        assert_eq!(CacheConfig::from_value(None), CacheConfig::ephemeral());
    }

    #[test]
    fn blank_value_selects_default_persistent() {
        assert_eq!(CacheConfig::from_value(Some("")), CacheConfig::persistent(None));
        assert_eq!(
            CacheConfig::from_value(Some("  \t")),
            CacheConfig::persistent(None)
        );
    }

    #[test]
    fn value_is_trimmed_into_base_dir() {
        assert_eq!(
            CacheConfig::from_value(Some("  /var/cache/gs \n")),
            CacheConfig::persistent(Some(PathBuf::from("/var/cache/gs")))
        );
    }

    #[test]
    fn reads_key_from_system() {
        let system = MockSystem::new().with_env(CACHE_ENV, "/cache").unwrap();
        let config = CacheConfig::from_system(&system).unwrap();
        assert_eq!(config.mode, CacheMode::Persistent);
        assert_eq!(config.resolve_base_dir(&system).unwrap(), PathBuf::from("/cache"));

        let config = CacheConfig::from_system(&MockSystem::new()).unwrap();
        assert_eq!(config.mode, CacheMode::Ephemeral);
    }

    #[test]
    fn default_base_uses_home() {
        let system = MockSystem::new().with_env("HOME", "/home/dev").unwrap();
        let base = CacheConfig::persistent(None)
            .resolve_base_dir(&system)
            .unwrap();
        assert_eq!(base, PathBuf::from("/home/dev/.git-select-cache"));
    }

    #[test]
    fn default_base_without_home_is_an_error() {
        let err = CacheConfig::persistent(None)
            .resolve_base_dir(&MockSystem::new())
            .unwrap_err();
        assert_eq!(err.downcast_ref::<SelectError>().unwrap().exit_code(), 1);
    }
}
