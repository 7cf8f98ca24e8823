//! In-memory version-control capability for testing
//!
//! Works on top of a [`MockSystem`]: snapshots are declared up front as file
//! trees, and the verbs write the files matching the sparse patterns into
//! the mock filesystem the same way a real sparse checkout would.

use crate::error::SelectError;
use crate::git::VersionControl;
use crate::system::{MockSystem, System as _};
use anyhow::{Context as _, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// One recorded verb invocation
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VcsCall {
    Clone {
        snapshot: String,
        repository: String,
        destination: PathBuf,
    },
    SparseCheckoutSet {
        tree: PathBuf,
        paths: Vec<String>,
    },
    SwitchDetached {
        tree: PathBuf,
        snapshot: String,
    },
    RestoreAll {
        tree: PathBuf,
    },
}

/// Verb selector for injected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Verb {
    Clone,
    SparseCheckoutSet,
    SwitchDetached,
    RestoreAll,
}

#[derive(Debug, Clone)]
enum SnapshotEntry {
    File(Vec<u8>),
    Symlink(PathBuf),
}

#[derive(Debug, Clone)]
struct TreeState {
    snapshot: String,
    patterns: Vec<String>,
    checked_out: bool,
}

#[derive(Default)]
struct MockVcsState {
    snapshots: HashMap<String, BTreeMap<String, SnapshotEntry>>,
    trees: HashMap<PathBuf, TreeState>,
    calls: Vec<VcsCall>,
    failing: Option<Verb>,
}

/// `VersionControl` implementation backed by a `MockSystem`
#[derive(Clone)]
pub struct MockVersionControl {
    system: MockSystem,
    state: Arc<RwLock<MockVcsState>>,
}

impl MockVersionControl {
    /// Create a mock with no snapshots
    #[must_use]
    pub fn new(system: MockSystem) -> Self {
        Self {
            system,
            state: Arc::new(RwLock::new(MockVcsState::default())),
        }
    }

    /// Declare a file present in `snapshot` (builder pattern)
    #[must_use]
    pub fn with_file(self, snapshot: &str, path: &str, contents: &[u8]) -> Self {
        if let Ok(mut state) = self.state.write() {
            state
                .snapshots
                .entry(snapshot.to_owned())
                .or_default()
                .insert(path.to_owned(), SnapshotEntry::File(contents.to_vec()));
        }
        self
    }

    /// Declare a symbolic link present in `snapshot` (builder pattern)
    #[must_use]
    pub fn with_symlink(self, snapshot: &str, path: &str, target: &str) -> Self {
        if let Ok(mut state) = self.state.write() {
            state
                .snapshots
                .entry(snapshot.to_owned())
                .or_default()
                .insert(path.to_owned(), SnapshotEntry::Symlink(PathBuf::from(target)));
        }
        self
    }

    /// Make every call of `verb` fail (builder pattern)
    #[must_use]
    pub fn failing_on(self, verb: Verb) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.failing = Some(verb);
        }
        self
    }

    /// All verb invocations so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<VcsCall> {
        self.state
            .read()
            .map(|state| state.calls.clone())
            .unwrap_or_default()
    }

    /// Number of clone invocations so far
    #[must_use]
    pub fn clone_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, VcsCall::Clone { .. }))
            .count()
    }

    fn record(&self, call: VcsCall, verb: Verb) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|e| anyhow::anyhow!("Mock state poisoned: {e}"))?;
        state.calls.push(call);
        if state.failing == Some(verb) {
            return Err(SelectError::git(format!("Injected failure for {verb:?}")).into());
        }
        Ok(())
    }

    fn tree_state(&self, tree: &Path) -> Result<TreeState> {
        let state = self
            .state
            .read()
            .map_err(|e| anyhow::anyhow!("Mock state poisoned: {e}"))?;
        state.trees.get(tree).cloned().ok_or_else(|| {
            SelectError::git(format!("not a git repository: {}", tree.display())).into()
        })
    }

    fn update_tree<F: FnOnce(&mut TreeState)>(&self, tree: &Path, update: F) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|e| anyhow::anyhow!("Mock state poisoned: {e}"))?;
        let entry = state.trees.get_mut(tree).ok_or_else(|| {
            SelectError::git(format!("not a git repository: {}", tree.display()))
        })?;
        update(entry);
        Ok(())
    }

    fn matches(pattern: &str, path: &str) -> bool {
        let pattern = pattern.trim_end_matches('/');
        path == pattern
            || path
                .strip_prefix(pattern)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Write every entry of the tree's snapshot that matches its patterns and is missing
    fn materialize(&self, tree: &Path) -> Result<()> {
        let tree_state = self.tree_state(tree)?;
        if !tree_state.checked_out {
            return Ok(());
        }

        let entries: Vec<(String, SnapshotEntry)> = {
            let state = self
                .state
                .read()
                .map_err(|e| anyhow::anyhow!("Mock state poisoned: {e}"))?;
            state
                .snapshots
                .get(&tree_state.snapshot)
                .map(|files| {
                    files
                        .iter()
                        .filter(|(path, _)| {
                            tree_state
                                .patterns
                                .iter()
                                .any(|pattern| Self::matches(pattern, path))
                        })
                        .map(|(path, entry)| (path.clone(), entry.clone()))
                        .collect()
                })
                .unwrap_or_default()
        };

        for (path, entry) in entries {
            let target = tree.join(&path);
            if self.system.exists(&target) {
                continue;
            }
            if let Some(parent) = target.parent() {
                self.system.create_dir_all(parent)?;
            }
            let written = match entry {
                SnapshotEntry::File(contents) => self.system.write(&target, &contents),
                SnapshotEntry::Symlink(link_target) => self.system.symlink(&link_target, &target),
            };
            written.with_context(|| format!("Failed to materialize {path}"))?;
        }
        Ok(())
    }
}

impl VersionControl for MockVersionControl {
    fn clone_sparse(&self, snapshot: &str, repository: &str, destination: &Path) -> Result<()> {
        self.record(
            VcsCall::Clone {
                snapshot: snapshot.to_owned(),
                repository: repository.to_owned(),
                destination: destination.to_path_buf(),
            },
            Verb::Clone,
        )?;

        let mut state = self
            .state
            .write()
            .map_err(|e| anyhow::anyhow!("Mock state poisoned: {e}"))?;
        if !state.snapshots.contains_key(snapshot) {
            return Err(SelectError::git(format!(
                "Remote branch {snapshot} not found in upstream origin"
            ))
            .into());
        }
        state.trees.insert(
            destination.to_path_buf(),
            TreeState {
                snapshot: snapshot.to_owned(),
                patterns: Vec::new(),
                checked_out: false,
            },
        );
        drop(state);

        self.system.create_dir_all(&destination.join(".git"))?;
        Ok(())
    }

    fn sparse_checkout_set(&self, tree: &Path, paths: &[&str]) -> Result<()> {
        self.record(
            VcsCall::SparseCheckoutSet {
                tree: tree.to_path_buf(),
                paths: paths.iter().map(|p| (*p).to_owned()).collect(),
            },
            Verb::SparseCheckoutSet,
        )?;
        self.update_tree(tree, |entry| {
            entry.patterns = paths.iter().map(|p| (*p).to_owned()).collect();
        })?;
        self.materialize(tree)
    }

    fn switch_detached(&self, tree: &Path, snapshot: &str) -> Result<()> {
        self.record(
            VcsCall::SwitchDetached {
                tree: tree.to_path_buf(),
                snapshot: snapshot.to_owned(),
            },
            Verb::SwitchDetached,
        )?;
        let known = self
            .state
            .read()
            .map_err(|e| anyhow::anyhow!("Mock state poisoned: {e}"))?
            .snapshots
            .contains_key(snapshot);
        if !known {
            return Err(SelectError::git(format!("invalid reference: {snapshot}")).into());
        }
        self.update_tree(tree, |entry| {
            entry.snapshot = snapshot.to_owned();
            entry.checked_out = true;
        })?;
        self.materialize(tree)
    }

    fn restore_all(&self, tree: &Path) -> Result<()> {
        self.record(
            VcsCall::RestoreAll {
                tree: tree.to_path_buf(),
            },
            Verb::RestoreAll,
        )?;
        self.materialize(tree)
    }
}
