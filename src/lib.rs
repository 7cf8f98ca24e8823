//! `git-select` - fetch selected paths of a Git repository at one snapshot
//!
//! This library clones only what is needed (depth 1, blobless, sparse) into
//! either a persistent cache or a temporary directory, then moves each
//! selected path to its local destination. Destinations that already exist
//! are left alone.
//!
//! Concurrent invocations against the same persistent cache entry are not
//! coordinated; keep them sequential.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod selection;
pub mod system;
pub mod transfer;
pub mod utils;

use anyhow::{Context as _, Result};
use cache::CacheLocation;
use cli::Args;
use config::CacheConfig;
use git::{GitCli, VersionControl, check_git_availability};
use selection::{TransferDescriptor, parse_selections};
use system::{RealSystem, System};
use tracing::info;
use transfer::TransferExecutor;

/// Main entry point for the git-select library
///
/// # Errors
///
/// Returns an error if Git is unavailable, a selection is invalid, or the
/// transfer fails
pub fn run(args: Args) -> Result<usize> {
    let system = RealSystem::new();
    check_git_availability().context("Git validation failed")?;
    run_with(&args, &system, &GitCli::new())
}

/// Run a transfer with explicit system and version-control implementations
///
/// The target root is the current directory of `system`.
///
/// # Errors
///
/// Returns an error if a selection is invalid, the cache cannot be
/// resolved, or the transfer fails
pub fn run_with(args: &Args, system: &dyn System, vcs: &dyn VersionControl) -> Result<usize> {
    let descriptor = TransferDescriptor::new(
        &args.repository,
        &args.snapshot,
        parse_selections(&args.selections),
    )?;

    let config = CacheConfig::from_system(system)?;
    let location = CacheLocation::resolve(
        system,
        &config,
        descriptor.repository(),
        descriptor.snapshot(),
    )?;

    let target_root = system
        .current_dir()
        .context("Cannot determine current directory")?;

    let executor = TransferExecutor::new(system, vcs);
    let transferred = executor.execute(&descriptor, location.path(), &target_root)?;

    info!(
        "Transferred {transferred} of {} paths from {} at {}",
        descriptor.selections().len(),
        descriptor.repository(),
        descriptor.snapshot()
    );

    // Dropping an ephemeral location removes its directory
    drop(location);
    Ok(transferred)
}
