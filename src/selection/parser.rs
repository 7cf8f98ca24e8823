//! Selection string parsing

use crate::error::SelectError;
use crate::utils::path::validate_relative_path;
use anyhow::Result;

/// Marker separating the repository path from its local destination
pub const REMAP_MARKER: &str = "/./";

/// A repository path paired with the local path it should occupy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Slash-separated path inside the source repository
    pub repo_path: String,
    /// Path relative to the target root
    pub local_path: String,
}

impl Selection {
    /// Create a selection from explicit paths
    #[must_use]
    #[inline]
    pub fn new<R: Into<String>, L: Into<String>>(repo_path: R, local_path: L) -> Self {
        Self {
            repo_path: repo_path.into(),
            local_path: local_path.into(),
        }
    }

    /// Parse a single raw selection string
    ///
    /// The string is split at the first `/./`. Without the marker the local
    /// path is the repository path. No validation happens here.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(REMAP_MARKER) {
            Some((repo_path, local_path)) => Self::new(repo_path, local_path),
            None => Self::new(raw, raw),
        }
    }

    /// Whether the selection places its content somewhere else than its repository path
    #[must_use]
    #[inline]
    pub fn is_remapped(&self) -> bool {
        self.repo_path != self.local_path
    }

    /// Check that both paths are non-empty, relative and free of `..`
    ///
    /// The repository path doubles as a sparse-checkout pattern, so it may not
    /// contain `.` segments either.
    ///
    /// # Errors
    ///
    /// Returns a `SelectError::Selection` naming the offending path
    pub fn validate(&self) -> Result<()> {
        validate_relative_path("repository path", &self.repo_path)?;
        if self.repo_path.split('/').any(|segment| segment == ".") {
            return Err(SelectError::selection(format!(
                "repository path must not contain '.' segments: '{}'",
                self.repo_path
            ))
            .into());
        }
        validate_relative_path("local path", &self.local_path)?;
        Ok(())
    }
}

/// Lazily parse raw selection strings, one `Selection` per input, in order
pub fn parse_selections<I, S>(raw: I) -> impl Iterator<Item = Selection>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter().map(|s| Selection::parse(s.as_ref()))
}
