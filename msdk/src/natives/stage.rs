//! Copy bundled native libraries into a directory the dynamic loader searches.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempPath};
use tracing::{debug, info, trace, warn};

use super::bundle::{BundledLibrary, ResourceBundle};
use super::error::StagingError;
use super::platform::Platform;
use super::search_path::SearchPath;

/// The outcome of a successful staging run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedLibraries {
    pub directory: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Copies are written to temporary files next to their targets and only renamed
/// into place once every copy has succeeded. Dropping an uncommitted transaction
/// removes the temporary files.
struct StagingTransaction<'a> {
    directory: &'a Path,
    pending: Vec<(NamedTempFile, PathBuf)>,
}

/// A target renamed into place, with the file it replaced moved aside
struct PlacedLibrary {
    target: PathBuf,
    backup: Option<TempPath>,
}

impl PlacedLibrary {
    /// Move any existing file at `target` to a temporary path in `directory`.
    /// Directories are left where they are.
    fn set_aside(directory: &Path, target: PathBuf) -> Result<Self, StagingError> {
        let backup = match fs::symlink_metadata(&target) {
            Ok(meta) if !meta.is_dir() => {
                let backup = NamedTempFile::new_in(directory)?.into_temp_path();
                fs::rename(&target, &backup)?;
                trace!("Moved {} aside to {}", target.display(), backup.display());
                Some(backup)
            }
            _ => None,
        };
        Ok(Self { target, backup })
    }

    /// Put the replaced file back, if there was one
    fn restore_backup(&self) {
        if let Some(backup) = &self.backup {
            if let Err(e) = fs::rename(backup, &self.target) {
                warn!(
                    "Failed to restore {} from {}: {e}",
                    self.target.display(),
                    backup.display()
                );
            }
        }
    }

    /// Undo a completed placement
    fn revert(self) {
        if self.backup.is_some() {
            self.restore_backup();
        } else if let Err(e) = fs::remove_file(&self.target) {
            warn!("Failed to remove {} during rollback: {e}", self.target.display());
        }
    }
}

fn rollback(placed: Vec<PlacedLibrary>) {
    for entry in placed.into_iter().rev() {
        entry.revert();
    }
}

impl<'a> StagingTransaction<'a> {
    fn new(directory: &'a Path) -> Self {
        Self {
            directory,
            pending: Vec::new(),
        }
    }

    fn stage(&mut self, library: &BundledLibrary) -> Result<(), StagingError> {
        let target = self.directory.join(library.file_name);
        debug!(
            "Copying library file {} to {}",
            library.source.display(),
            target.display()
        );
        let mut source = fs::File::open(&library.source)?;
        let mut temp = NamedTempFile::new_in(self.directory)?;
        io::copy(&mut source, temp.as_file_mut())?;
        temp.as_file().sync_all()?;
        fs::set_permissions(temp.path(), source.metadata()?.permissions())?;
        self.pending.push((temp, target));
        Ok(())
    }

    /// Rename every staged copy over its target. Files that get replaced are kept
    /// aside until all renames succeed, and are put back if any rename fails.
    fn commit(self) -> Result<Vec<PathBuf>, StagingError> {
        let directory = self.directory;
        let mut placed: Vec<PlacedLibrary> = Vec::with_capacity(self.pending.len());
        for (temp, target) in self.pending {
            let entry = match PlacedLibrary::set_aside(directory, target) {
                Ok(entry) => entry,
                Err(e) => {
                    rollback(placed);
                    return Err(e);
                }
            };
            if let Err(e) = temp.persist(&entry.target) {
                warn!(
                    "Failed to move {} into place, rolling back {} staged file(s)",
                    entry.target.display(),
                    placed.len()
                );
                entry.restore_backup();
                rollback(placed);
                return Err(e.error.into());
            }
            placed.push(entry);
        }
        // Dropping the backups deletes the replaced files
        Ok(placed.into_iter().map(|entry| entry.target).collect())
    }
}

/// Copy both required libraries for `platform` from `bundle` into `directory`,
/// replacing any files already there.
///
/// Either both files are placed or, on failure, neither is and any files that
/// were already there are left as they were.
pub fn copy_library_files(
    directory: &Path,
    platform: &Platform,
    bundle: &ResourceBundle,
) -> Result<StagedLibraries, StagingError> {
    debug!("OS type = {} and OS arch = {}", platform.os, platform.width);
    platform.require_supported()?;
    let libraries = bundle.locate(platform)?;

    let mut transaction = StagingTransaction::new(directory);
    for library in libraries.iter() {
        transaction.stage(library)?;
    }
    let files = transaction.commit()?;

    info!(
        "Staged {} native libraries for {} into {}",
        files.len(),
        platform,
        directory.display()
    );
    Ok(StagedLibraries {
        directory: directory.to_path_buf(),
        files,
    })
}

/// Make the GLPK libraries for `platform` available to the dynamic loader by copying
/// them into the first writable directory of `search_path`.
pub fn stage_native_libraries(
    search_path: &SearchPath,
    platform: &Platform,
    bundle: &ResourceBundle,
) -> Result<StagedLibraries, StagingError> {
    debug!("Started staging native libraries from {}", bundle.root().display());
    let directory = search_path.first_writable()?;
    copy_library_files(directory, platform, bundle)
}
