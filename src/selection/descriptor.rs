//! Transfer descriptor

use crate::error::SelectError;
use crate::selection::Selection;
use anyhow::{Context as _, Result};

/// What to fetch and where to place it
///
/// Built once per invocation and immutable afterwards. The repository string
/// is opaque and handed to git verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TransferDescriptor {
    repository: String,
    snapshot: String,
    selections: Vec<Selection>,
}

impl TransferDescriptor {
    /// Create a validated descriptor
    ///
    /// # Errors
    ///
    /// Returns a `SelectError::Selection` if:
    /// - The repository or snapshot is empty
    /// - The snapshot starts with `-` or contains a `..` segment
    /// - Any selection has an empty, absolute or traversing path
    pub fn new<I>(repository: &str, snapshot: &str, selections: I) -> Result<Self>
    where
        I: IntoIterator<Item = Selection>,
    {
        if repository.trim().is_empty() {
            return Err(SelectError::selection("Repository must not be empty").into());
        }
        if snapshot.trim().is_empty() {
            return Err(SelectError::selection("Snapshot must not be empty").into());
        }
        // The snapshot doubles as a cache path segment and a git argument
        if snapshot.starts_with('-') || snapshot.split('/').any(|segment| segment == "..") {
            return Err(
                SelectError::selection(format!("Invalid snapshot name: '{snapshot}'")).into(),
            );
        }

        let selections: Vec<Selection> = selections.into_iter().collect();
        for (index, selection) in selections.iter().enumerate() {
            selection
                .validate()
                .with_context(|| format!("Invalid selection #{}", index + 1))?;
        }

        Ok(Self {
            repository: repository.to_owned(),
            snapshot: snapshot.to_owned(),
            selections,
        })
    }

    /// Repository identifier as given
    #[must_use]
    #[inline]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Branch, tag or commit to fetch
    #[must_use]
    #[inline]
    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }

    /// Validated selections in input order
    #[must_use]
    #[inline]
    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    /// Repository paths in selection order, duplicates included
    #[must_use]
    pub fn repo_paths(&self) -> Vec<&str> {
        self.selections
            .iter()
            .map(|selection| selection.repo_path.as_str())
            .collect()
    }

    /// Whether there is nothing to transfer
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}
