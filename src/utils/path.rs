//! Path validation utilities

use crate::error::SelectError;
use anyhow::Result;
use std::path::{Component, Path};

/// Validate that a selection path is non-empty, relative and never climbs
/// above its root
///
/// `label` names the path in the error message (for example `"repository path"`).
///
/// # Errors
///
/// Returns a `SelectError::Selection` if:
/// - The path is empty
/// - The path is absolute
/// - The path contains a `..` segment
pub fn validate_relative_path(label: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(SelectError::selection(format!("Empty {label} is not allowed")).into());
    }

    let path_obj = Path::new(path);

    if path_obj.is_absolute() || path.starts_with('/') {
        return Err(SelectError::selection(format!(
            "Absolute {label} is not allowed: '{path}'"
        ))
        .into());
    }

    for component in path_obj.components() {
        match component {
            Component::ParentDir => {
                return Err(SelectError::selection(format!(
                    "{label} contains unsafe directory traversal: '{path}'"
                ))
                .into());
            }
            Component::Prefix(_) | Component::RootDir => {
                return Err(SelectError::selection(format!(
                    "Absolute {label} is not allowed: '{path}'"
                ))
                .into());
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    if !path_obj
        .components()
        .any(|c| matches!(c, Component::Normal(_)))
    {
        return Err(SelectError::selection(format!(
            "{label} does not name anything: '{path}'"
        ))
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_relative_paths() {
        validate_relative_path("path", "lib/core").unwrap();
        validate_relative_path("path", "README.md").unwrap();
        validate_relative_path("path", "./docs/guide").unwrap();
    }

    #[test]
    fn rejects_traversal_and_absolute_paths() {
        assert!(validate_relative_path("path", "../outside").is_err());
        assert!(validate_relative_path("path", "lib/../../etc").is_err());
        assert!(validate_relative_path("path", "/etc/passwd").is_err());
    }

    #[test]
    fn rejects_empty_and_dot_only_paths() {
        let err = validate_relative_path("local path", "").unwrap_err();
        assert!(err.to_string().contains("Empty local path"));
        assert!(validate_relative_path("path", ".").is_err());
        assert!(validate_relative_path("path", "./").is_err());
    }

    #[test]
    fn dotted_names_are_not_traversal() {
        validate_relative_path("path", "..hidden/file").unwrap();
        validate_relative_path("path", "a/b..c").unwrap();
    }
}
