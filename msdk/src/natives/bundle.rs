//! The on-disk layout of bundled native libraries.
//!
//! A bundle is a root directory holding one folder per library release, which
//! in turn holds a folder per platform:
//!
//! ```text
//! <root>/glpk-4.60/windows64/glpk_4_60.dll
//!                            glpk_4_60_java.dll
//!                  linux64/libglpk.so
//!                          libglpk_java.so
//!                  mac64/libglpk.dylib
//!                        libglpk_java.dylib
//! ```
use std::path::{Path, PathBuf};

use tracing::trace;

use super::error::StagingError;
use super::platform::{OsFamily, Platform};

/// The release folder GLPK binaries are bundled under
pub const GLPK_RESOURCES_FOLDER: &str = "glpk-4.60";

/// The two GLPK libraries that must be present, the solver first and its
/// Java binding second.
pub fn required_files(os: &OsFamily) -> Result<[&'static str; 2], StagingError> {
    match os {
        OsFamily::Windows => Ok(["glpk_4_60.dll", "glpk_4_60_java.dll"]),
        OsFamily::Linux => Ok(["libglpk.so", "libglpk_java.so"]),
        OsFamily::Mac => Ok(["libglpk.dylib", "libglpk_java.dylib"]),
        OsFamily::Unsupported(name) => Err(StagingError::UnsupportedPlatform(name.clone())),
    }
}

/// A bundled library resolved to its source path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledLibrary {
    pub file_name: &'static str,
    pub source: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceBundle {
    root: PathBuf,
    folder: String,
}

impl ResourceBundle {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(root: P, folder: S) -> Self {
        Self {
            root: root.into(),
            folder: folder.into(),
        }
    }

    /// A bundle using the default GLPK release folder
    pub fn glpk<P: Into<PathBuf>>(root: P) -> Self {
        Self::new(root, GLPK_RESOURCES_FOLDER)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// `<root>/<folder>/<os><bits>/<file_name>`
    pub fn resource_path(&self, platform: &Platform, file_name: &str) -> PathBuf {
        self.root
            .join(&self.folder)
            .join(platform.folder_name())
            .join(file_name)
    }

    /// Resolve both required libraries for `platform`, failing on the first that
    /// is not present in the bundle
    pub fn locate(&self, platform: &Platform) -> Result<Vec<BundledLibrary>, StagingError> {
        let files = required_files(&platform.os)?;
        files
            .into_iter()
            .map(|file_name| {
                let source = self.resource_path(platform, file_name);
                trace!("Looking for {}", source.display());
                if source.is_file() {
                    Ok(BundledLibrary { file_name, source })
                } else {
                    Err(StagingError::ResourceNotFound(source))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;

    #[test]
    fn test_required_files() {
        assert_eq!(
            required_files(&OsFamily::Windows).unwrap(),
            ["glpk_4_60.dll", "glpk_4_60_java.dll"]
        );
        assert_eq!(
            required_files(&OsFamily::Linux).unwrap(),
            ["libglpk.so", "libglpk_java.so"]
        );
        assert_eq!(
            required_files(&OsFamily::Mac).unwrap(),
            ["libglpk.dylib", "libglpk_java.dylib"]
        );
        assert!(matches!(
            required_files(&OsFamily::Unsupported("Plan 9".into())),
            Err(StagingError::UnsupportedPlatform(_))
        ));
    }

    #[test]
    fn test_resource_path() {
        let bundle = ResourceBundle::glpk("/opt/msdk/resources");
        let platform = Platform::from_names("Linux", "amd64");
        assert_eq!(
            bundle.resource_path(&platform, "libglpk.so"),
            Path::new("/opt/msdk/resources/glpk-4.60/linux64/libglpk.so")
        );
    }

    #[test]
    fn test_locate() {
        let tmp = tempfile::tempdir().unwrap();
        let bundle = ResourceBundle::glpk(tmp.path());
        let platform = Platform::from_names("Windows 10", "amd64");
        let dir = tmp.path().join("glpk-4.60").join("windows64");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("glpk_4_60.dll"), b"solver").unwrap();

        match bundle.locate(&platform) {
            Err(StagingError::ResourceNotFound(path)) => {
                assert_eq!(path, dir.join("glpk_4_60_java.dll"))
            }
            other => panic!("Expected a missing resource, got {other:?}"),
        }

        fs::write(dir.join("glpk_4_60_java.dll"), b"binding").unwrap();
        let libs = bundle.locate(&platform).unwrap();
        assert_eq!(libs.len(), 2);
        assert_eq!(libs[0].file_name, "glpk_4_60.dll");
        assert_eq!(libs[1].source, dir.join("glpk_4_60_java.dll"));
    }
}
