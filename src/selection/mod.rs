//! Selection parsing and the transfer descriptor
//!
//! Turns raw selection strings into `(repo_path, local_path)` pairs and
//! bundles them with the repository and snapshot they are fetched from

pub mod descriptor;
pub mod parser;

pub use descriptor::*;
pub use parser::*;
