//! File system utilities

use crate::system::System;
use anyhow::{Context as _, Result};
use std::io;
use std::path::Path;

/// Create parent directories for a path if they don't exist
///
/// Returns `true` when directories were created. A parent that appears
/// between the existence check and the creation attempt is accepted.
///
/// # Errors
///
/// Returns an error if the directories cannot be created
pub fn create_parent_directories(system: &dyn System, path: &Path) -> Result<bool> {
    let Some(parent) = path.parent() else {
        return Ok(false);
    };

    if parent.as_os_str().is_empty() || system.is_dir(parent) {
        return Ok(false);
    }

    match system.create_dir_all(parent) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists && system.is_dir(parent) => {
            Ok(false)
        }
        Err(err) => Err(err).with_context(|| {
            format!(
                "Failed to create parent directories for: {}",
                path.display()
            )
        }),
    }
}

/// Recursively copy a file or directory tree from `from` to `to`
///
/// Hidden entries are included. Symbolic links are recreated as links to the
/// same target and never followed. Returns the number of files and links copied.
///
/// # Errors
///
/// Returns an error if any directory cannot be created or any entry cannot be copied
pub fn copy_tree(system: &dyn System, from: &Path, to: &Path) -> Result<usize> {
    if system.is_symlink(from) {
        copy_symlink(system, from, to)?;
        return Ok(1);
    }

    if system.is_file(from) {
        copy_file(system, from, to)?;
        return Ok(1);
    }

    system
        .create_dir_all(to)
        .with_context(|| format!("Failed to create directory: {}", to.display()))?;

    let mut files_copied = 0;
    for entry in system
        .walk_dir(from, false, true)
        .with_context(|| format!("Failed to read directory: {}", from.display()))?
    {
        let relative_path = entry
            .path
            .strip_prefix(from)
            .context("Failed to calculate relative path")?;
        let target_path = to.join(relative_path);

        if entry.is_symlink {
            copy_symlink(system, &entry.path, &target_path)?;
            files_copied += 1;
        } else if entry.is_dir {
            system.create_dir_all(&target_path).with_context(|| {
                format!("Failed to create directory: {}", target_path.display())
            })?;
        } else {
            copy_file(system, &entry.path, &target_path)?;
            files_copied += 1;
        }
    }

    Ok(files_copied)
}

fn copy_file(system: &dyn System, from: &Path, to: &Path) -> Result<()> {
    system.copy(from, to).with_context(|| {
        format!(
            "Failed to copy file from {} to {}",
            from.display(),
            to.display()
        )
    })?;
    Ok(())
}

fn copy_symlink(system: &dyn System, from: &Path, to: &Path) -> Result<()> {
    let target = system
        .read_link(from)
        .with_context(|| format!("Failed to read symbolic link: {}", from.display()))?;
    system
        .symlink(&target, to)
        .with_context(|| format!("Failed to create symbolic link: {}", to.display()))
}

/// Move `from` to `to` when a plain rename cannot cross filesystems
///
/// The copy is staged in a temporary directory next to `to` and renamed into
/// place once complete, so `to` either appears whole or not at all. The source
/// is removed last.
///
/// # Errors
///
/// Returns an error if the staging directory cannot be created, the copy
/// fails, or the staged tree cannot be renamed into place
pub fn move_across_devices(system: &dyn System, from: &Path, to: &Path) -> Result<usize> {
    let parent = to
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let staging = system
        .create_temp_dir_in(parent)
        .with_context(|| format!("Failed to create staging directory in {}", parent.display()))?;
    let staged = staging.path().join("entry");

    let copied = copy_tree(system, from, &staged)?;
    system.rename(&staged, to).with_context(|| {
        format!(
            "Failed to move staged copy into place at {}",
            to.display()
        )
    })?;
    drop(staging);

    remove_tree(system, from)?;
    Ok(copied)
}

/// Remove a file, symbolic link or directory tree
///
/// # Errors
///
/// Returns an error if the path cannot be removed
pub fn remove_tree(system: &dyn System, path: &Path) -> Result<()> {
    let removed = if !system.is_symlink(path) && system.is_dir(path) {
        system.remove_dir_all(path)
    } else {
        system.remove_file(path)
    };
    removed.with_context(|| format!("Failed to remove: {}", path.display()))
}
