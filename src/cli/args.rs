use clap::Parser;

/// Command-line arguments for git-select
#[derive(Parser, Debug, Clone)]
#[command(name = "git-select")]
#[command(about = "Fetch selected paths of a Git repository at a single snapshot")]
#[command(
    long_about = "Fetch selected paths of a Git repository at a single snapshot.\n\n\
    Each SELECTION is a path inside the repository, optionally followed by '/./' and the \
    local path it should be placed at (for example 'docs/readme.md/./README.md'). Paths are \
    placed relative to the current directory and existing destinations are left untouched.\n\n\
    Set GIT_SELECT_CACHE to keep checkouts between runs: a directory value is used as the \
    cache base, an empty value selects ~/.git-select-cache. Without it every run uses a \
    temporary checkout."
)]
#[command(version)]
pub struct Args {
    /// Git repository URL or path, passed to git unchanged
    #[arg(value_name = "REPOSITORY")]
    pub repository: String,

    /// Branch or tag to fetch
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: String,

    /// Repository paths to fetch, as PATH or PATH/./LOCAL_PATH
    #[arg(value_name = "SELECTION", required = true, num_args = 1..)]
    pub selections: Vec<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}
