//! System abstraction for environment and filesystem operations
//!
//! This module provides a unified trait for all external system interactions,
//! allowing for easy testing with mock implementations.

use std::env::VarError;
use std::io;
use std::path::{Path, PathBuf};

pub mod mock;
pub mod real;

pub use mock::MockSystem;
pub use real::RealSystem;

/// Entry from directory walking
#[derive(Debug, Clone)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub is_file: bool,
    pub is_dir: bool,
    pub is_symlink: bool,
}

/// Temporary directory handle that cleans up on drop
///
/// For `RealSystem`, this wraps `tempfile::TempDir` and uses real filesystem.
/// For `MockSystem`, this manages an in-memory temporary directory.
pub trait TempDirHandle {
    /// Get the path to the temporary directory
    fn path(&self) -> &Path;
}

/// Unified trait for system operations (environment + filesystem)
///
/// # Implementations
/// - `RealSystem`: Production implementation using `std::env` and `std::fs`
/// - `MockSystem`: Test implementation using in-memory storage
pub trait System: Send + Sync {
    // ==================== Environment Operations ====================

    /// Get an environment variable
    fn env_var(&self, key: &str) -> Result<String, VarError>;

    /// Get the current working directory
    fn current_dir(&self) -> io::Result<PathBuf>;

    /// Get the current user's home directory, if one can be determined
    fn home_dir(&self) -> Option<PathBuf>;

    // ==================== Filesystem Operations ====================

    /// Read entire file contents as a string
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write bytes to a file, creating it if it doesn't exist
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Recursively create a directory and all parent directories
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and all its contents
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a file
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Rename a file or directory, replacing nothing on the way
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Copy a file from source to destination
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path points to a file
    fn is_file(&self, path: &Path) -> bool;

    /// Check if a path points to a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if a path is itself a symbolic link, without following it
    fn is_symlink(&self, path: &Path) -> bool;

    /// Read the target of a symbolic link
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Create a symbolic link at `link` pointing to `target`
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

    /// Recursively walk a directory, returning all entries
    ///
    /// # Arguments
    /// * `path` - Root path to start walking from
    /// * `follow_links` - Whether to follow symbolic links
    /// * `hidden` - Whether to include hidden files
    ///
    /// # Returns
    /// Vector of all entries found (files and directories), excluding the root itself,
    /// sorted so that every directory precedes its contents. Symbolic links are
    /// reported with `is_symlink` and never descended into unless `follow_links`
    fn walk_dir(&self, path: &Path, follow_links: bool, hidden: bool)
    -> io::Result<Vec<WalkEntry>>;

    /// Create a temporary directory that is automatically cleaned up on drop
    fn create_temp_dir(&self) -> io::Result<Box<dyn TempDirHandle>>;

    /// Create a temporary directory inside `parent`, cleaned up on drop
    fn create_temp_dir_in(&self, parent: &Path) -> io::Result<Box<dyn TempDirHandle>>;
}
