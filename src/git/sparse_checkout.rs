//! Git sparse checkout implementation

use crate::error::SelectError;
use crate::git::VersionControl;
use anyhow::{Context as _, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Minimum Git version: `sparse-checkout set --no-cone` first shipped in 2.35
pub const MIN_GIT_VERSION: (u32, u32, u32) = (2, 35, 0);

/// Runs the `git` command line for each version-control verb
#[derive(Debug, Clone)]
pub struct GitCli {
    program: OsString,
}

impl GitCli {
    /// Use `git` from `PATH`
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Use a specific Git executable
    #[must_use]
    #[inline]
    pub fn with_program<S: Into<OsString>>(program: S) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, tree: Option<&Path>) -> Command {
        let mut command = Command::new(&self.program);
        if let Some(tree) = tree {
            command.current_dir(tree);
        }
        command
    }

    /// Run a prepared command, turning a non-zero exit into a `SelectError::Git`
    fn run(mut command: Command, action: &str) -> Result<()> {
        debug!("Running {command:?}");
        let output = command
            .output()
            .with_context(|| format!("Failed to execute git while trying to {action}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SelectError::git(format!("Failed to {action}: {}", stderr.trim())).into());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!("git: {}", stderr.trim());
        }

        Ok(())
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionControl for GitCli {
    fn clone_sparse(&self, snapshot: &str, repository: &str, destination: &Path) -> Result<()> {
        let mut command = self.command(None);
        command
            .args([
                "clone",
                "--sparse",
                "--filter=blob:none",
                "--no-checkout",
                "--depth=1",
            ])
            .arg(format!("--branch={snapshot}"))
            .arg("--")
            .arg(repository)
            .arg(destination);

        Self::run(
            command,
            &format!("clone repository '{repository}' at '{snapshot}'"),
        )
    }

    fn sparse_checkout_set(&self, tree: &Path, paths: &[&str]) -> Result<()> {
        let mut command = self.command(Some(tree));
        command
            .args(["sparse-checkout", "set", "--no-cone"])
            .args(paths);

        Self::run(command, "set sparse checkout patterns")
    }

    fn switch_detached(&self, tree: &Path, snapshot: &str) -> Result<()> {
        let mut command = self.command(Some(tree));
        command.args(["switch", "--detach", snapshot]);

        Self::run(command, &format!("switch to '{snapshot}'"))
    }

    fn restore_all(&self, tree: &Path) -> Result<()> {
        let mut command = self.command(Some(tree));
        command.args(["checkout", "--", "."]);

        Self::run(command, "restore working files")
    }
}

/// Check if Git is available and meets minimum version requirements
///
/// # Errors
///
/// Returns an error if:
/// - The Git command is not found
/// - The Git command failed to execute properly
/// - The Git version is too old
#[inline]
pub fn check_git_availability() -> Result<()> {
    let output = Command::new("git")
        .args(["--version"])
        .output()
        .context("Git command not found. Please ensure Git is installed and available in PATH")?;

    if !output.status.success() {
        return Err(SelectError::git("Git command failed to execute properly").into());
    }

    let version_output = String::from_utf8_lossy(&output.stdout);

    if let Some(version_part) = version_output.split_whitespace().nth(2)
        && let Ok(version) = parse_git_version(version_part)
        && version < MIN_GIT_VERSION
    {
        let (major, minor, patch) = MIN_GIT_VERSION;
        return Err(SelectError::git(format!(
            "Git version {version_part} is too old. git-select requires Git {major}.{minor}.{patch} or later for non-cone sparse checkout"
        ))
        .into());
    }

    Ok(())
}

/// Parse Git version string into tuple (major, minor, patch)
///
/// Trailing vendor suffixes such as `.windows.1` are ignored.
///
/// # Errors
///
/// Returns an error if the version string is invalid
#[inline]
pub fn parse_git_version(version: &str) -> Result<(u32, u32, u32)> {
    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() >= 3 {
        let major = parts[0].parse().context("Invalid major version")?;
        let minor = parts[1].parse().context("Invalid minor version")?;
        let patch_digits: String = parts[2].chars().take_while(char::is_ascii_digit).collect();
        let patch = patch_digits.parse().context("Invalid patch version")?;
        Ok((major, minor, patch))
    } else {
        Err(anyhow::anyhow!("Invalid version format"))
    }
}
