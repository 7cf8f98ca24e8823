//! # `git-select`
//!
//! Retrieve a few paths of a large Git repository without its history or
//! full tree.
//!
//! ## Usage
//!
//! ```sh
//! git-select https://example.com/big/repo.git v1.0 lib/core docs/readme.md/./README.md
//! ```
//!
//! Set `GIT_SELECT_CACHE` to reuse checkouts across runs.

use anyhow::Result;
use clap::Parser as _;
use git_select::cli::Args;
use git_select::error::SelectError;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    match git_select::run(args) {
        Ok(_) => std::process::exit(0),
        Err(err) => {
            error!("{err:#}");
            std::process::exit(
                err.downcast_ref::<SelectError>()
                    .map_or(1, SelectError::exit_code),
            );
        }
    }
}
