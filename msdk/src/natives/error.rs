use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop native libraries from being staged
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Unsupported OS ({0}), cannot load GLPK libraries")]
    UnsupportedPlatform(String),
    #[error("Failed to open resource {}", .0.display())]
    ResourceNotFound(PathBuf),
    #[error("An IO error occurred: {0}")]
    IOError(
        #[source]
        #[from]
        io::Error,
    ),
}
