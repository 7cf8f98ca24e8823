//! Git operations module
//!
//! Defines the version-control capability the transfer engine depends on and
//! its implementations: the `git` command line and an in-memory mock

pub mod mock;
pub mod sparse_checkout;

pub use mock::MockVersionControl;
pub use sparse_checkout::*;

use anyhow::Result;
use std::path::Path;

/// The four version-control verbs used to materialize a sparse working tree
///
/// Every call is synchronous and a failure is final for the invocation.
pub trait VersionControl: Send + Sync {
    /// Shallow, blobless, sparse clone of `repository` at `snapshot` into
    /// `destination`, without checking out any files
    fn clone_sparse(&self, snapshot: &str, repository: &str, destination: &Path) -> Result<()>;

    /// Replace the sparse path set of `tree` with exactly `paths` (non-cone patterns)
    fn sparse_checkout_set(&self, tree: &Path, paths: &[&str]) -> Result<()>;

    /// Move the working tree of `tree` to `snapshot` without touching any branch
    fn switch_detached(&self, tree: &Path, snapshot: &str) -> Result<()>;

    /// Repopulate the working files of `tree` for its current sparse path set
    fn restore_all(&self, tree: &Path) -> Result<()>;
}
