mod args;
mod config;
mod driver;

pub use args::*;
pub use config::{StagingConfig, DEFAULT_CONFIG_FILE, ENV_PREFIX};
pub use driver::{stage_with_config, NativesError};
