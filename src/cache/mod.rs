//! Cache-location policy
//!
//! Decides where the working tree for a `(repository, snapshot)` pair lives.
//! Persistent trees sit at `<base>/<sha256(repository)>/<snapshot>` and are
//! reused by later invocations. Ephemeral trees live inside a temporary
//! directory owned by the returned [`CacheLocation`] and disappear when it
//! is dropped, whichever way the invocation ends.

use crate::config::{CacheConfig, CacheMode};
use crate::system::{System, TempDirHandle};
use anyhow::{Context as _, Result};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the working tree inside an ephemeral cache directory
pub const EPHEMERAL_TREE_NAME: &str = "checkout";

/// Stable key for a repository identifier: lowercase hex SHA-256 of its bytes
#[must_use]
pub fn cache_key(repository: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(repository.as_bytes());
    hex::encode(hasher.finalize())
}

/// Persistent working-tree path for `repository` at `snapshot` under `base`
#[must_use]
pub fn persistent_path(base: &Path, repository: &str, snapshot: &str) -> PathBuf {
    base.join(cache_key(repository)).join(snapshot)
}

/// The working-tree location chosen for one invocation
pub enum CacheLocation {
    Persistent {
        path: PathBuf,
    },
    /// `guard` removes the temporary directory when dropped
    Ephemeral {
        guard: Box<dyn TempDirHandle>,
        path: PathBuf,
    },
}

impl CacheLocation {
    /// Decide the cache location for this invocation
    ///
    /// The ephemeral directory is created here, before any git operation runs.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The persistent base directory cannot be determined
    /// - The temporary directory cannot be created
    pub fn resolve(
        system: &dyn System,
        config: &CacheConfig,
        repository: &str,
        snapshot: &str,
    ) -> Result<Self> {
        match config.mode {
            CacheMode::Persistent => {
                let base = config.resolve_base_dir(system)?;
                let path = persistent_path(&base, repository, snapshot);
                debug!("Using persistent cache: {}", path.display());
                Ok(Self::Persistent { path })
            }
            CacheMode::Ephemeral => {
                let guard = system
                    .create_temp_dir()
                    .context("Failed to create temporary directory for Git operations")?;
                let path = guard.path().join(EPHEMERAL_TREE_NAME);
                debug!("Using ephemeral cache: {}", path.display());
                Ok(Self::Ephemeral { guard, path })
            }
        }
    }

    /// Path of the working tree
    #[must_use]
    #[inline]
    pub fn path(&self) -> &Path {
        match self {
            Self::Persistent { path } | Self::Ephemeral { path, .. } => path,
        }
    }

    #[must_use]
    #[inline]
    pub const fn is_persistent(&self) -> bool {
        matches!(self, Self::Persistent { .. })
    }
}

impl fmt::Debug for CacheLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persistent { path } => f.debug_struct("Persistent").field("path", path).finish(),
            Self::Ephemeral { guard, path } => f
                .debug_struct("Ephemeral")
                .field("root", &guard.path())
                .field("path", path)
                .finish(),
        }
    }
}
