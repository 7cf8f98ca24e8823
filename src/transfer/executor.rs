//! Transfer executor

use crate::error::SelectError;
use crate::git::VersionControl;
use crate::selection::{Selection, TransferDescriptor};
use crate::system::System;
use crate::utils::fs::{create_parent_directories, move_across_devices};
use anyhow::{Context as _, Result};
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

/// Drives the version-control capability and relocates checked-out paths
#[non_exhaustive]
pub struct TransferExecutor<'src> {
    system: &'src dyn System,
    vcs: &'src dyn VersionControl,
}

impl<'src> TransferExecutor<'src> {
    #[must_use]
    #[inline]
    pub fn new(system: &'src dyn System, vcs: &'src dyn VersionControl) -> Self {
        Self { system, vcs }
    }

    /// Fetch every selection of `descriptor` through the working tree at
    /// `cache` and move it under `target_root`
    ///
    /// Destinations that already exist are skipped with a warning. Returns
    /// the number of paths actually moved.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any clone, sparse-checkout, switch or restore step fails
    /// - A selected path is missing from the checked-out tree
    /// - A destination's parent directories cannot be created
    /// - A path cannot be moved
    pub fn execute(
        &self,
        descriptor: &TransferDescriptor,
        cache: &Path,
        target_root: &Path,
    ) -> Result<usize> {
        if descriptor.is_empty() {
            debug!("No selections given, nothing to transfer");
            return Ok(0);
        }

        self.acquire_working_tree(descriptor, cache)?;

        let mut transferred = 0;
        for selection in descriptor.selections() {
            if self.transfer_selection(selection, cache, target_root)? {
                transferred += 1;
            }
        }

        Ok(transferred)
    }

    /// Reuse the tree at `cache` if present, otherwise clone it
    fn acquire_working_tree(&self, descriptor: &TransferDescriptor, cache: &Path) -> Result<()> {
        let paths = descriptor.repo_paths();

        if self.system.exists(cache) {
            info!("Reusing cached checkout at {}", cache.display());
            self.vcs
                .sparse_checkout_set(cache, &paths)
                .context("Failed to update sparse checkout of cached tree")?;
            self.vcs
                .restore_all(cache)
                .context("Failed to restore cached working files")?;
            return Ok(());
        }

        create_parent_directories(self.system, cache)
            .context("Failed to prepare cache directory")?;

        debug!(
            "Cloning {} at {} into {}",
            descriptor.repository(),
            descriptor.snapshot(),
            cache.display()
        );
        self.vcs
            .clone_sparse(descriptor.snapshot(), descriptor.repository(), cache)
            .context("Sparse clone failed")?;

        debug!("Setting sparse checkout patterns: {paths:?}");
        self.vcs
            .sparse_checkout_set(cache, &paths)
            .context("Failed to set sparse checkout patterns")?;

        debug!("Switching to {}", descriptor.snapshot());
        self.vcs
            .switch_detached(cache, descriptor.snapshot())
            .context("Failed to switch to snapshot")?;

        Ok(())
    }

    /// Move one selection; `Ok(false)` means the destination was already taken
    fn transfer_selection(
        &self,
        selection: &Selection,
        cache: &Path,
        target_root: &Path,
    ) -> Result<bool> {
        let source = cache.join(&selection.repo_path);
        let destination = target_root.join(&selection.local_path);

        if self.system.exists(&destination) {
            warn!("Skipping {} as it already exists", destination.display());
            return Ok(false);
        }

        if !self.system.exists(&source) {
            return Err(SelectError::from_source(format!(
                "'{}' was not found in the checkout at {}",
                selection.repo_path,
                cache.display()
            ))
            .into());
        }

        if create_parent_directories(self.system, &destination)? {
            debug!("Created parent directories for {}", destination.display());
        }

        self.relocate(&source, &destination).with_context(|| {
            format!(
                "Failed to move {} to {}",
                source.display(),
                destination.display()
            )
        })?;

        debug!("{} -> {}", selection.repo_path, destination.display());
        Ok(true)
    }

    /// Rename, falling back to a staged copy and remove across filesystems
    fn relocate(&self, source: &Path, destination: &Path) -> Result<()> {
        match self.system.rename(source, destination) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
                debug!(
                    "Cache and target are on different filesystems, copying {}",
                    source.display()
                );
                move_across_devices(self.system, source, destination)
                    .map_err(|err| SelectError::filesystem(format!("{err:#}")))?;
                Ok(())
            }
            Err(err) => Err(SelectError::filesystem(err.to_string()).into()),
        }
    }
}
