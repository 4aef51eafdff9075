use crate::error::{OperatingSystemError, Result};
use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Block and inode counts of a mounted filesystem, as reported by `statvfs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FsStat {
    pub fragment_size: u64,
    pub blocks: u64,
    pub blocks_free: u64,
    pub blocks_available: u64,
    pub files: u64,
    pub files_free: u64,
}

/// Read-only access to the files a host provider parses.
///
/// [`RealFs`] goes to the operating system; [`crate::mock::MockFs`] serves
/// fixtures so parsing can be tested on any host.
pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Names of the entries directly inside `path`.
    fn read_dir_names(&self, path: &Path) -> io::Result<Vec<String>>;

    fn statvfs(&self, path: &Path) -> io::Result<FsStat>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read_dir_names(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    #[allow(clippy::unnecessary_cast)]
    fn statvfs(&self, path: &Path) -> io::Result<FsStat> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        // SAFETY: `stat` is a plain C struct fully written by a successful call.
        let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(FsStat {
            fragment_size: stat.f_frsize as u64,
            blocks: stat.f_blocks as u64,
            blocks_free: stat.f_bfree as u64,
            blocks_available: stat.f_bavail as u64,
            files: stat.f_files as u64,
            files_free: stat.f_ffree as u64,
        })
    }
}

/// Reads a whole file, mapping the I/O error to an [`OperatingSystemError`].
pub(crate) fn read(fs: &dyn FileSystem, path: &str) -> Result<String> {
    fs.read_to_string(Path::new(path))
        .map_err(|e| OperatingSystemError::io(path, e))
}

/// Reads a file and splits every line into whitespace-separated fields.
pub(crate) fn rows(fs: &dyn FileSystem, path: &str) -> Result<Vec<Vec<String>>> {
    Ok(read(fs, path)?
        .lines()
        .map(|line| line.split_whitespace().map(str::to_string).collect())
        .collect())
}

pub(crate) fn parse_u64(path: &str, field: &str) -> Result<u64> {
    field
        .parse()
        .map_err(|_| OperatingSystemError::parse(path, format!("not an integer: {field:?}")))
}
