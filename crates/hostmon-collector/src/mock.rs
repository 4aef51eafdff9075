//! In-memory [`FileSystem`] for tests and fixtures.

use crate::fs::{FileSystem, FsStat};
use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};

/// Serves file contents, directory listings and `statvfs` results from
/// memory.
///
/// Directory listings are derived from the registered file paths unless a
/// listing is set explicitly with [`MockFs::with_listing`], which lets a test
/// list entries that have no readable content (a process that exited between
/// listing and read, for instance).
///
/// # Examples
///
/// ```
/// use hostmon_collector::fs::FileSystem;
/// use hostmon_collector::mock::MockFs;
/// use std::path::Path;
///
/// let fs = MockFs::new()
///     .with_file("/proc/1/status", "Name:\tinit\n")
///     .with_file("/proc/loadavg", "0.5 0.4 0.3 1/100 42\n");
/// let mut names = fs.read_dir_names(Path::new("/proc")).unwrap();
/// names.sort();
/// assert_eq!(names, vec!["1", "loadavg"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    files: HashMap<PathBuf, String>,
    listings: HashMap<PathBuf, Vec<String>>,
    stats: HashMap<PathBuf, FsStat>,
}

impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    pub fn with_listing<I, S>(mut self, path: impl Into<PathBuf>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.listings
            .insert(path.into(), names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_statvfs(mut self, path: impl Into<PathBuf>, stat: FsStat) -> Self {
        self.stats.insert(path.into(), stat);
        self
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    fn read_dir_names(&self, path: &Path) -> io::Result<Vec<String>> {
        if let Some(names) = self.listings.get(path) {
            return Ok(names.clone());
        }
        let names: BTreeSet<String> = self
            .files
            .keys()
            .filter_map(|file| file.strip_prefix(path).ok())
            .filter_map(|rest| rest.components().next())
            .map(|first| first.as_os_str().to_string_lossy().into_owned())
            .collect();
        if names.is_empty() {
            return Err(Self::not_found(path));
        }
        Ok(names.into_iter().collect())
    }

    fn statvfs(&self, path: &Path) -> io::Result<FsStat> {
        self.stats
            .get(path)
            .copied()
            .ok_or_else(|| Self::not_found(path))
    }
}
