//! The ordered list of directories the dynamic loader searches for shared libraries.
use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::error::StagingError;
use super::platform::OsFamily;

/// An explicit, ordered list of candidate library directories.
///
/// Build one with [`SearchPath::parse`] from a configured value, or with
/// [`SearchPath::from_env`] when the process environment should decide.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchPath {
    raw: String,
    directories: Vec<PathBuf>,
}

impl SearchPath {
    /// Split a path list on the platform's separator, dropping empty entries
    pub fn parse<S: AsRef<OsStr>>(value: S) -> Self {
        let value = value.as_ref();
        let directories = env::split_paths(value)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        Self {
            raw: value.to_string_lossy().into_owned(),
            directories,
        }
    }

    pub fn from_directories<I: IntoIterator<Item = PathBuf>>(directories: I) -> Self {
        let directories: Vec<PathBuf> = directories.into_iter().collect();
        let raw = env::join_paths(directories.iter())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { raw, directories }
    }

    /// Read the search path from the environment variable `variable`
    pub fn from_env(variable: &str) -> Result<Self, StagingError> {
        match env::var_os(variable) {
            Some(value) => {
                let path = Self::parse(value);
                debug!("{variable} = {}", path.raw);
                Ok(path)
            }
            None => Err(StagingError::Configuration(format!(
                "Cannot read the {variable} environment variable"
            ))),
        }
    }

    /// The environment variable the dynamic loader of `os` consults
    pub fn default_variable(os: &OsFamily) -> &'static str {
        match os {
            OsFamily::Windows => "PATH",
            OsFamily::Mac => "DYLD_LIBRARY_PATH",
            _ => "LD_LIBRARY_PATH",
        }
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    /// The first candidate directory that exists and accepts new files.
    ///
    /// Writability is checked by creating an anonymous temporary file in the
    /// directory, which is removed again before this returns.
    pub fn first_writable(&self) -> Result<&Path, StagingError> {
        for dir in self.directories.iter() {
            if is_writable_dir(dir) {
                debug!("Selected library directory {}", dir.display());
                return Ok(dir);
            }
            trace!("Skipping {}, not a writable directory", dir.display());
        }
        Err(StagingError::Configuration(format!(
            "The library search path does not contain any writable folders, cannot copy GLPK libraries (search path = {})",
            self.raw
        )))
    }
}

pub(crate) fn is_writable_dir(dir: &Path) -> bool {
    dir.is_dir() && tempfile::tempfile_in(dir).is_ok()
}
