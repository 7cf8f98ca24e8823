//! Mock system implementation for testing

use tracing::error;

use super::{System, TempDirHandle, WalkEntry};
use std::collections::{HashMap, HashSet};
use std::env::VarError;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

// Global counter for generating unique temp directory IDs
static TEMP_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// In-memory implementation of System trait for testing
///
/// `MockSystem` provides an in-memory filesystem and environment,
/// perfect for fast, isolated unit tests without side effects.
///
/// # Example
/// ```
/// use git_select::system::{mock::MockSystem, System};
/// use std::path::Path;
///
/// let system = MockSystem::new()
///     .with_env("HOME", "/home/user").unwrap()
///     .with_file("/test/file.txt", b"Hello, world!").unwrap()
///     .with_dir("/test/subdir").unwrap();
///
/// assert_eq!(system.env_var("HOME").unwrap(), "/home/user");
/// assert!(system.exists(Path::new("/test/file.txt")));
/// ```
#[derive(Clone)]
pub struct MockSystem {
    state: Arc<RwLock<MockSystemState>>,
}

struct MockSystemState {
    env_vars: HashMap<String, String>,
    current_dir: PathBuf,
    files: HashMap<PathBuf, Vec<u8>>,
    dirs: HashSet<PathBuf>,
    symlinks: HashMap<PathBuf, PathBuf>,
    mounts: Vec<PathBuf>,
    copy_failures: HashSet<PathBuf>,
    dir_creations: Vec<PathBuf>,
}

impl MockSystem {
    /// Create a new `MockSystem` with default state
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockSystemState {
                env_vars: HashMap::new(),
                current_dir: PathBuf::from("/"),
                files: HashMap::new(),
                dirs: HashSet::from([PathBuf::from("/")]),
                symlinks: HashMap::new(),
                mounts: Vec::new(),
                copy_failures: HashSet::new(),
                dir_creations: Vec::new(),
            })),
        }
    }

    fn read_state(&self) -> io::Result<RwLockReadGuard<'_, MockSystemState>> {
        self.state
            .read()
            .map_err(|e| io::Error::other(e.to_string()))
    }

    fn write_state(&self) -> io::Result<RwLockWriteGuard<'_, MockSystemState>> {
        self.state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))
    }

    /// Set an environment variable (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_env(self, key: &str, value: &str) -> io::Result<Self> {
        let mut state = self.write_state()?;
        state.env_vars.insert(key.to_owned(), value.to_owned());
        drop(state);
        Ok(self)
    }

    /// Set the current working directory (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_current_dir<P: AsRef<Path>>(self, dir: P) -> io::Result<Self> {
        let mut state = self.write_state()?;
        state.current_dir = dir.as_ref().to_path_buf();
        drop(state);
        Ok(self)
    }

    /// Add a file with contents (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_file<P: AsRef<Path>>(self, path: P, contents: &[u8]) -> io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let mut state = self.write_state()?;

        if let Some(parent) = path_buf.parent() {
            Self::ensure_parent_dirs(&mut state.dirs, parent);
        }

        state.files.insert(path_buf, contents.to_vec());
        drop(state);
        Ok(self)
    }

    /// Add a directory (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_dir<P: AsRef<Path>>(self, path: P) -> io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let mut state = self.write_state()?;
        Self::ensure_parent_dirs(&mut state.dirs, &path_buf);
        drop(state);
        Ok(self)
    }

    /// Add a symbolic link at `link` pointing to `target` (builder pattern)
    ///
    /// The mock never resolves links, so `target` need not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_symlink<L: AsRef<Path>, T: AsRef<Path>>(
        self,
        link: L,
        target: T,
    ) -> io::Result<Self> {
        let link = link.as_ref().to_path_buf();
        let mut state = self.write_state()?;

        if let Some(parent) = link.parent() {
            Self::ensure_parent_dirs(&mut state.dirs, parent);
        }

        state.symlinks.insert(link, target.as_ref().to_path_buf());
        drop(state);
        Ok(self)
    }

    /// Treat everything under `root` as a separate filesystem (builder pattern)
    ///
    /// A `rename` whose source and destination sit on different mounts fails
    /// with `CrossesDevices`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_mount<P: AsRef<Path>>(self, root: P) -> io::Result<Self> {
        let mut state = self.write_state()?;
        state.mounts.push(root.as_ref().to_path_buf());
        drop(state);
        Ok(self)
    }

    /// Make every `copy` from `path` fail (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_copy_failure<P: AsRef<Path>>(self, path: P) -> io::Result<Self> {
        let mut state = self.write_state()?;
        state.copy_failures.insert(path.as_ref().to_path_buf());
        drop(state);
        Ok(self)
    }

    /// Directories newly created through `create_dir_all`, in creation order
    #[must_use]
    #[inline]
    pub fn created_dirs(&self) -> Vec<PathBuf> {
        self.read_state()
            .map(|state| state.dir_creations.clone())
            .unwrap_or_default()
    }

    /// Returns the paths that were newly inserted
    #[inline]
    fn ensure_parent_dirs(dirs: &mut HashSet<PathBuf>, path: &Path) -> Vec<PathBuf> {
        let mut created: Vec<PathBuf> = path
            .ancestors()
            .filter(|ancestor| *ancestor != Path::new(""))
            .filter(|ancestor| dirs.insert(ancestor.to_path_buf()))
            .map(Path::to_path_buf)
            .collect();
        created.reverse();
        created
    }

    /// Innermost mount containing `path`, `None` for the root filesystem
    fn mount_of<'state>(mounts: &'state [PathBuf], path: &Path) -> Option<&'state PathBuf> {
        mounts
            .iter()
            .filter(|root| path.starts_with(root))
            .max_by_key(|root| root.components().count())
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("Path not found: {}", path.display()),
        )
    }

    fn rebase(path: &Path, from: &Path, to: &Path) -> Option<PathBuf> {
        path.strip_prefix(from).ok().map(|rest| {
            if rest.as_os_str().is_empty() {
                to.to_path_buf()
            } else {
                to.join(rest)
            }
        })
    }
}

impl Default for MockSystem {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl System for MockSystem {
    #[inline]
    #[expect(clippy::map_err_ignore, reason = "This is for VarError")]
    fn env_var(&self, key: &str) -> Result<String, VarError> {
        let state = self.state.read().map_err(|_| VarError::NotPresent)?;
        state.env_vars.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[inline]
    fn current_dir(&self) -> io::Result<PathBuf> {
        Ok(self.read_state()?.current_dir.clone())
    }

    #[inline]
    fn home_dir(&self) -> Option<PathBuf> {
        self.env_var("HOME").ok().map(PathBuf::from)
    }

    #[inline]
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self
            .read_state()?
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path))?;
        String::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {e}")))
    }

    #[inline]
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut state = self.write_state()?;

        if let Some(parent) = path.parent()
            && !state.dirs.contains(parent)
        {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Parent directory does not exist: {}", parent.display()),
            ));
        }

        state.files.insert(path.to_path_buf(), contents.to_vec());
        drop(state);
        Ok(())
    }

    #[inline]
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.write_state()?;
        if state.files.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("A file already exists at: {}", path.display()),
            ));
        }
        let created = Self::ensure_parent_dirs(&mut state.dirs, path);
        state.dir_creations.extend(created);
        drop(state);
        Ok(())
    }

    #[inline]
    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.write_state()?;
        if !state.dirs.contains(path) {
            return Err(Self::not_found(path));
        }
        state.files.retain(|p, _| !p.starts_with(path));
        state.symlinks.retain(|p, _| !p.starts_with(path));
        state.dirs.retain(|p| !p.starts_with(path));
        drop(state);
        Ok(())
    }

    #[inline]
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut state = self.write_state()?;
        if state.files.remove(path).is_none() && state.symlinks.remove(path).is_none() {
            return Err(Self::not_found(path));
        }
        drop(state);
        Ok(())
    }

    #[inline]
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut state = self.write_state()?;

        if Self::mount_of(&state.mounts, from) != Self::mount_of(&state.mounts, to) {
            return Err(io::Error::new(
                io::ErrorKind::CrossesDevices,
                "Invalid cross-device link",
            ));
        }

        if let Some(parent) = to.parent()
            && !state.dirs.contains(parent)
        {
            return Err(Self::not_found(parent));
        }

        if let Some(contents) = state.files.remove(from) {
            state.files.insert(to.to_path_buf(), contents);
            return Ok(());
        }

        if let Some(target) = state.symlinks.remove(from) {
            state.symlinks.insert(to.to_path_buf(), target);
            return Ok(());
        }

        if !state.dirs.contains(from) {
            return Err(Self::not_found(from));
        }

        let moved_files: Vec<(PathBuf, Vec<u8>)> = state
            .files
            .iter()
            .filter_map(|(path, contents)| {
                Self::rebase(path, from, to).map(|target| (target, contents.clone()))
            })
            .collect();
        let moved_links: Vec<(PathBuf, PathBuf)> = state
            .symlinks
            .iter()
            .filter_map(|(path, target)| {
                Self::rebase(path, from, to).map(|link| (link, target.clone()))
            })
            .collect();
        let moved_dirs: Vec<PathBuf> = state
            .dirs
            .iter()
            .filter_map(|path| Self::rebase(path, from, to))
            .collect();

        state.files.retain(|p, _| !p.starts_with(from));
        state.symlinks.retain(|p, _| !p.starts_with(from));
        state.dirs.retain(|p| !p.starts_with(from));
        state.files.extend(moved_files);
        state.symlinks.extend(moved_links);
        state.dirs.extend(moved_dirs);
        drop(state);
        Ok(())
    }

    #[inline]
    #[expect(clippy::as_conversions, reason = "This is for usize to u64 conversion")]
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        let state = self.read_state()?;
        if state.copy_failures.contains(from) {
            return Err(io::Error::other(format!(
                "Injected copy failure: {}",
                from.display()
            )));
        }
        let contents = state
            .files
            .get(from)
            .cloned()
            .ok_or_else(|| Self::not_found(from))?;
        drop(state);

        let size = contents.len() as u64;
        self.write(to, &contents)?;
        Ok(size)
    }

    #[inline]
    fn exists(&self, path: &Path) -> bool {
        self.read_state().is_ok_and(|state| {
            state.files.contains_key(path)
                || state.dirs.contains(path)
                || state.symlinks.contains_key(path)
        })
    }

    #[inline]
    fn is_file(&self, path: &Path) -> bool {
        self.read_state()
            .is_ok_and(|state| state.files.contains_key(path))
    }

    #[inline]
    fn is_dir(&self, path: &Path) -> bool {
        self.read_state().is_ok_and(|state| state.dirs.contains(path))
    }

    #[inline]
    fn is_symlink(&self, path: &Path) -> bool {
        self.read_state()
            .is_ok_and(|state| state.symlinks.contains_key(path))
    }

    #[inline]
    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.read_state()?
            .symlinks
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    #[inline]
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        let mut state = self.write_state()?;

        if let Some(parent) = link.parent()
            && !state.dirs.contains(parent)
        {
            return Err(Self::not_found(parent));
        }

        if state.files.contains_key(link)
            || state.dirs.contains(link)
            || state.symlinks.contains_key(link)
        {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Path already exists: {}", link.display()),
            ));
        }

        state.symlinks.insert(link.to_path_buf(), target.to_path_buf());
        drop(state);
        Ok(())
    }

    #[inline]
    fn walk_dir(
        &self,
        path: &Path,
        _follow_links: bool,
        hidden: bool,
    ) -> io::Result<Vec<WalkEntry>> {
        let state = self.read_state()?;

        if !state.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Directory not found: {}", path.display()),
            ));
        }

        let visible = |candidate: &Path| {
            hidden
                || candidate
                    .strip_prefix(path)
                    .map(|rest| {
                        !rest
                            .components()
                            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
                    })
                    .unwrap_or(false)
        };

        let mut entries: Vec<WalkEntry> = state
            .dirs
            .iter()
            .filter(|dir| {
                dir.starts_with(path) && dir.as_path() != path && visible(dir.as_path())
            })
            .map(|dir| WalkEntry {
                path: dir.clone(),
                is_file: false,
                is_dir: true,
                is_symlink: false,
            })
            .chain(
                state
                    .files
                    .keys()
                    .filter(|file| file.starts_with(path) && visible(file.as_path()))
                    .map(|file| WalkEntry {
                        path: file.clone(),
                        is_file: true,
                        is_dir: false,
                        is_symlink: false,
                    }),
            )
            .chain(
                state
                    .symlinks
                    .keys()
                    .filter(|link| link.starts_with(path) && visible(link.as_path()))
                    .map(|link| WalkEntry {
                        path: link.clone(),
                        is_file: false,
                        is_dir: false,
                        is_symlink: true,
                    }),
            )
            .collect();
        drop(state);

        // Sort entries by path so parents precede children
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(entries)
    }

    #[inline]
    fn create_temp_dir(&self) -> io::Result<Box<dyn TempDirHandle>> {
        let id = TEMP_DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_path = PathBuf::from(format!("/tmp/mock_{id}"));

        self.create_dir_all(&temp_path)?;

        Ok(Box::new(MockTempDir {
            path: temp_path,
            system: self.clone(),
        }))
    }

    #[inline]
    fn create_temp_dir_in(&self, parent: &Path) -> io::Result<Box<dyn TempDirHandle>> {
        if !self.is_dir(parent) {
            return Err(Self::not_found(parent));
        }

        let id = TEMP_DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_path = parent.join(format!(".mock_{id}"));

        self.create_dir_all(&temp_path)?;

        Ok(Box::new(MockTempDir {
            path: temp_path,
            system: self.clone(),
        }))
    }
}

/// Mock temporary directory handle that cleans up on drop
#[non_exhaustive]
pub struct MockTempDir {
    path: PathBuf,
    system: MockSystem,
}

impl TempDirHandle for MockTempDir {
    #[inline]
    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for MockTempDir {
    #[inline]
    fn drop(&mut self) {
        match self.system.remove_dir_all(&self.path) {
            Ok(()) => (),
            Err(e) => error!("Failed to remove temporary directory: {e}"),
        }
    }
}
