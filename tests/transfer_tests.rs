//! Transfer executor tests against the in-memory system and version control

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {

use git_select::error::SelectError;
use git_select::git::mock::{VcsCall, Verb};
use git_select::git::MockVersionControl;
use git_select::selection::{TransferDescriptor, parse_selections};
use git_select::system::{MockSystem, System as _};
use git_select::transfer::TransferExecutor;
use std::path::{Path, PathBuf};

const REPOSITORY: &str = "https://example.com/R.git";
const CACHE: &str = "/cache/tree";
const TARGET: &str = "/work";

fn remote(system: &MockSystem) -> MockVersionControl {
    MockVersionControl::new(system.clone())
        .with_file("v1.0", "lib/core/mod.rs", b"pub fn core() {}")
        .with_file("v1.0", "lib/core/util/helpers.rs", b"pub fn help() {}")
        .with_file("v1.0", "lib/other.rs", b"other")
        .with_file("v1.0", "docs/readme.md", b"# Readme")
        .with_file("v1.0", "docs/guide.md", b"# Guide")
}

fn descriptor(selections: &[&str]) -> TransferDescriptor {
    TransferDescriptor::new(REPOSITORY, "v1.0", parse_selections(selections)).unwrap()
}

fn work(path: &str) -> PathBuf {
    Path::new(TARGET).join(path)
}

#[test]
fn fresh_clone_places_each_selection() {
    let system = MockSystem::new().with_dir(TARGET).unwrap();
    let vcs = remote(&system);
    let executor = TransferExecutor::new(&system, &vcs);

    let moved = executor
        .execute(
            &descriptor(&["lib/core", "docs/readme.md/./README.md"]),
            Path::new(CACHE),
            Path::new(TARGET),
        )
        .unwrap();

    assert_eq!(moved, 2);
    assert_eq!(
        system.read_to_string(&work("lib/core/mod.rs")).unwrap(),
        "pub fn core() {}"
    );
    assert_eq!(
        system
            .read_to_string(&work("lib/core/util/helpers.rs"))
            .unwrap(),
        "pub fn help() {}"
    );
    assert_eq!(system.read_to_string(&work("README.md")).unwrap(), "# Readme");
    assert!(!system.exists(&work("lib/other.rs")));
    assert!(!system.exists(&work("docs")));
}

#[test]
fn fresh_clone_runs_verbs_in_order() {
    let system = MockSystem::new().with_dir(TARGET).unwrap();
    let vcs = remote(&system);

    TransferExecutor::new(&system, &vcs)
        .execute(
            &descriptor(&["lib/core", "docs/readme.md/./README.md"]),
            Path::new(CACHE),
            Path::new(TARGET),
        )
        .unwrap();

    assert_eq!(
        vcs.calls(),
        vec![
            VcsCall::Clone {
                snapshot: "v1.0".to_owned(),
                repository: REPOSITORY.to_owned(),
                destination: PathBuf::from(CACHE),
            },
            VcsCall::SparseCheckoutSet {
                tree: PathBuf::from(CACHE),
                paths: vec!["lib/core".to_owned(), "docs/readme.md".to_owned()],
            },
            VcsCall::SwitchDetached {
                tree: PathBuf::from(CACHE),
                snapshot: "v1.0".to_owned(),
            },
        ]
    );
}

#[test]
fn existing_destination_is_skipped_and_untouched() {
    let system = MockSystem::new()
        .with_file(work("lib/core/local.rs"), b"mine")
        .unwrap();
    let vcs = remote(&system);

    let moved = TransferExecutor::new(&system, &vcs)
        .execute(
            &descriptor(&["lib/core", "docs/readme.md/./README.md"]),
            Path::new(CACHE),
            Path::new(TARGET),
        )
        .unwrap();

    assert_eq!(moved, 1);
    assert_eq!(
        system.read_to_string(&work("lib/core/local.rs")).unwrap(),
        "mine"
    );
    assert!(!system.exists(&work("lib/core/mod.rs")));
    assert!(system.exists(&work("README.md")));
}

#[test]
fn second_run_into_same_target_moves_nothing() {
    let system = MockSystem::new().with_dir(TARGET).unwrap();
    let vcs = remote(&system);
    let executor = TransferExecutor::new(&system, &vcs);
    let selections = descriptor(&["lib/core", "docs/readme.md/./README.md"]);

    let first = executor
        .execute(&selections, Path::new(CACHE), Path::new(TARGET))
        .unwrap();
    let second = executor
        .execute(&selections, Path::new(CACHE), Path::new(TARGET))
        .unwrap();

    assert_eq!(first, 2);
    assert_eq!(second, 0);
    assert_eq!(vcs.clone_count(), 1);
}

#[test]
fn count_excludes_preexisting_destinations() {
    let system = MockSystem::new()
        .with_file(work("lib/other.rs"), b"kept")
        .unwrap()
        .with_dir(work("guide"))
        .unwrap();
    let vcs = remote(&system);

    let moved = TransferExecutor::new(&system, &vcs)
        .execute(
            &descriptor(&[
                "lib/core",
                "lib/other.rs",
                "docs/readme.md",
                "docs/guide.md/./guide",
            ]),
            Path::new(CACHE),
            Path::new(TARGET),
        )
        .unwrap();

    assert_eq!(moved, 4 - 2);
    assert_eq!(system.read_to_string(&work("lib/other.rs")).unwrap(), "kept");
    assert!(system.is_dir(&work("guide")));
}

#[test]
fn duplicate_selection_is_attempted_twice() {
    let system = MockSystem::new().with_dir(TARGET).unwrap();
    let vcs = remote(&system);

    let moved = TransferExecutor::new(&system, &vcs)
        .execute(
            &descriptor(&["lib/core", "lib/core"]),
            Path::new(CACHE),
            Path::new(TARGET),
        )
        .unwrap();

    assert_eq!(moved, 1);
    let VcsCall::SparseCheckoutSet { paths, .. } = &vcs.calls()[1] else {
        panic!("expected sparse checkout set");
    };
    assert_eq!(paths, &vec!["lib/core".to_owned(), "lib/core".to_owned()]);
}

#[test]
fn nested_destinations_create_shared_ancestors_once() {
    let system = MockSystem::new().with_dir(TARGET).unwrap();
    let vcs = remote(&system);

    let moved = TransferExecutor::new(&system, &vcs)
        .execute(
            &descriptor(&[
                "lib/core/./vendor/third/core",
                "docs/readme.md/./vendor/third/README.md",
            ]),
            Path::new(CACHE),
            Path::new(TARGET),
        )
        .unwrap();

    assert_eq!(moved, 2);
    assert!(system.exists(&work("vendor/third/core/mod.rs")));
    assert!(system.exists(&work("vendor/third/README.md")));

    let created: Vec<PathBuf> = system
        .created_dirs()
        .into_iter()
        .filter(|dir| dir.starts_with(TARGET))
        .collect();
    assert_eq!(created, vec![work("vendor"), work("vendor/third")]);
}

#[test]
fn missing_source_is_fatal() {
    let system = MockSystem::new().with_dir(TARGET).unwrap();
    let vcs = remote(&system);

    let err = TransferExecutor::new(&system, &vcs)
        .execute(
            &descriptor(&["lib/typo", "docs/readme.md"]),
            Path::new(CACHE),
            Path::new(TARGET),
        )
        .unwrap_err();

    assert_eq!(err.downcast_ref::<SelectError>().unwrap().exit_code(), 3);
    assert!(err.to_string().contains("lib/typo"));
    assert!(!system.exists(&work("docs/readme.md")));
}

#[test]
fn git_failure_aborts_before_any_move() {
    let system = MockSystem::new().with_dir(TARGET).unwrap();
    let vcs = remote(&system).failing_on(Verb::SwitchDetached);

    let err = TransferExecutor::new(&system, &vcs)
        .execute(
            &descriptor(&["lib/core"]),
            Path::new(CACHE),
            Path::new(TARGET),
        )
        .unwrap_err();

    assert_eq!(err.downcast_ref::<SelectError>().unwrap().exit_code(), 4);
    assert!(!system.exists(&work("lib")));
}

#[test]
fn unknown_snapshot_fails_clone() {
    let system = MockSystem::new().with_dir(TARGET).unwrap();
    let vcs = remote(&system);
    let selections = TransferDescriptor::new(REPOSITORY, "v9.9", parse_selections(["lib/core"]))
        .unwrap();

    let err = TransferExecutor::new(&system, &vcs)
        .execute(&selections, Path::new(CACHE), Path::new(TARGET))
        .unwrap_err();

    assert!(format!("{err:#}").contains("v9.9"));
    assert_eq!(vcs.calls().len(), 1);
}

#[test]
fn reused_cache_restores_previously_moved_paths() {
    let system = MockSystem::new().with_dir(TARGET).unwrap();
    let vcs = remote(&system);
    let executor = TransferExecutor::new(&system, &vcs);
    let selections = descriptor(&["lib/core"]);

    executor
        .execute(&selections, Path::new(CACHE), Path::new(TARGET))
        .unwrap();
    assert!(!system.exists(&Path::new(CACHE).join("lib/core")));

    let moved = executor
        .execute(&selections, Path::new(CACHE), Path::new("/elsewhere"))
        .unwrap();

    assert_eq!(moved, 1);
    assert!(system.exists(Path::new("/elsewhere/lib/core/mod.rs")));
    assert_eq!(vcs.clone_count(), 1);
    assert_eq!(
        vcs.calls()[3..],
        [
            VcsCall::SparseCheckoutSet {
                tree: PathBuf::from(CACHE),
                paths: vec!["lib/core".to_owned()],
            },
            VcsCall::RestoreAll {
                tree: PathBuf::from(CACHE),
            },
        ]
    );
}

#[test]
fn reused_cache_accepts_new_paths() {
    let system = MockSystem::new().with_dir(TARGET).unwrap();
    let vcs = remote(&system);
    let executor = TransferExecutor::new(&system, &vcs);

    executor
        .execute(&descriptor(&["lib/core"]), Path::new(CACHE), Path::new(TARGET))
        .unwrap();
    let moved = executor
        .execute(
            &descriptor(&["lib/other.rs", "docs/guide.md"]),
            Path::new(CACHE),
            Path::new(TARGET),
        )
        .unwrap();

    assert_eq!(moved, 2);
    assert_eq!(system.read_to_string(&work("lib/other.rs")).unwrap(), "other");
    assert_eq!(system.read_to_string(&work("docs/guide.md")).unwrap(), "# Guide");
}

#[test]
fn cross_device_moves_fall_back_to_copy() {
    let system = MockSystem::new()
        .with_dir(TARGET)
        .unwrap()
        .with_mount("/cache")
        .unwrap();
    let vcs = remote(&system);

    let moved = TransferExecutor::new(&system, &vcs)
        .execute(
            &descriptor(&["lib/core", "docs/readme.md/./README.md"]),
            Path::new(CACHE),
            Path::new(TARGET),
        )
        .unwrap();

    assert_eq!(moved, 2);
    assert_eq!(
        system
            .read_to_string(&work("lib/core/util/helpers.rs"))
            .unwrap(),
        "pub fn help() {}"
    );
    assert_eq!(system.read_to_string(&work("README.md")).unwrap(), "# Readme");
    assert!(!system.exists(&Path::new(CACHE).join("lib/core")));
    assert!(!system.exists(&Path::new(CACHE).join("docs/readme.md")));
    assert_eq!(staging_leftovers(&system), 0);
}

/// Staging directories left anywhere under the target
fn staging_leftovers(system: &MockSystem) -> usize {
    system
        .walk_dir(Path::new(TARGET), false, true)
        .unwrap()
        .iter()
        .filter(|entry| entry.path.to_string_lossy().contains("/.mock_"))
        .count()
}

#[test]
fn cross_device_moves_keep_symlinks() {
    let system = MockSystem::new()
        .with_dir(TARGET)
        .unwrap()
        .with_mount("/cache")
        .unwrap();
    let vcs = remote(&system)
        .with_symlink("v1.0", "lib/core/alias", "util")
        .with_symlink("v1.0", "lib/core/link.rs", "util/helpers.rs")
        .with_symlink("v1.0", "docs/latest", "readme.md");

    let moved = TransferExecutor::new(&system, &vcs)
        .execute(
            &descriptor(&["lib/core", "docs/latest/./latest"]),
            Path::new(CACHE),
            Path::new(TARGET),
        )
        .unwrap();

    assert_eq!(moved, 2);
    assert!(system.is_symlink(&work("lib/core/alias")));
    assert_eq!(
        system.read_link(&work("lib/core/alias")).unwrap(),
        Path::new("util")
    );
    assert!(system.is_symlink(&work("lib/core/link.rs")));
    assert_eq!(
        system.read_link(&work("lib/core/link.rs")).unwrap(),
        Path::new("util/helpers.rs")
    );
    assert_eq!(
        system.read_link(&work("latest")).unwrap(),
        Path::new("readme.md")
    );
    assert!(!system.exists(&Path::new(CACHE).join("lib/core/alias")));
    assert!(!system.exists(&Path::new(CACHE).join("docs/latest")));
}

#[test]
fn failed_cross_device_copy_leaves_no_destination() {
    let system = MockSystem::new()
        .with_dir(TARGET)
        .unwrap()
        .with_mount("/cache")
        .unwrap()
        .with_copy_failure(Path::new(CACHE).join("lib/core/util/helpers.rs"))
        .unwrap();
    let vcs = remote(&system);

    let err = TransferExecutor::new(&system, &vcs)
        .execute(&descriptor(&["lib/core"]), Path::new(CACHE), Path::new(TARGET))
        .unwrap_err();

    assert_eq!(err.downcast_ref::<SelectError>().unwrap().exit_code(), 5);
    assert!(!system.exists(&work("lib/core")));
    assert_eq!(staging_leftovers(&system), 0);
    assert!(system.exists(&Path::new(CACHE).join("lib/core/mod.rs")));
}

#[test]
fn empty_descriptor_is_a_no_op() {
    let system = MockSystem::new().with_dir(TARGET).unwrap();
    let vcs = remote(&system);

    let moved = TransferExecutor::new(&system, &vcs)
        .execute(
            &descriptor(&[]),
            Path::new(CACHE),
            Path::new(TARGET),
        )
        .unwrap();

    assert_eq!(moved, 0);
    assert!(vcs.calls().is_empty());
    assert!(!system.exists(Path::new(CACHE)));
}
}
