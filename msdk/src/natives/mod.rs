//! Locate bundled GLPK shared libraries for the running platform and stage them
//! on the dynamic library search path before the solver bindings are loaded.
//!
//! ```no_run
//! use msdk::natives::{stage_native_libraries, Platform, ResourceBundle, SearchPath};
//!
//! let platform = Platform::current();
//! let search_path = SearchPath::from_env(SearchPath::default_variable(&platform.os))?;
//! let bundle = ResourceBundle::glpk("/opt/msdk/resources");
//! let staged = stage_native_libraries(&search_path, &platform, &bundle)?;
//! println!("Staged into {}", staged.directory.display());
//! # Ok::<(), msdk::natives::StagingError>(())
//! ```
mod error;

pub mod bundle;
pub mod platform;
pub mod search_path;
pub mod stage;

pub use bundle::{required_files, BundledLibrary, ResourceBundle, GLPK_RESOURCES_FOLDER};
pub use error::StagingError;
pub use platform::{AddressWidth, OsFamily, Platform};
pub use search_path::SearchPath;
pub use stage::{copy_library_files, stage_native_libraries, StagedLibraries};
