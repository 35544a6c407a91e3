use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use msdk::natives::{
    AddressWidth, OsFamily, Platform, ResourceBundle, SearchPath, StagingError,
    GLPK_RESOURCES_FOLDER,
};

use crate::args::{PlatformArgs, StageArgs};

/// The configuration file read from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "msdk-natives.toml";

/// The prefix of environment variables that override configuration values
pub const ENV_PREFIX: &str = "MSDK_NATIVES_";

/// Where to find the bundled libraries and where to put them
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StagingConfig {
    pub search_path: Option<String>,
    pub search_path_variable: Option<String>,
    pub resources: PathBuf,
    pub folder: String,
    pub os: Option<String>,
    pub arch: Option<String>,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            search_path: None,
            search_path_variable: None,
            resources: PathBuf::from("resources"),
            folder: GLPK_RESOURCES_FOLDER.to_string(),
            os: None,
            arch: None,
        }
    }
}

impl StagingConfig {
    /// Layer the defaults, a TOML file and `MSDK_NATIVES_` environment variables.
    ///
    /// An explicitly named file must exist, the default file is optional.
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let config = Figment::from(Serialized::defaults(Self::default()));
        let config = match config_file {
            Some(path) => {
                debug!("Reading configuration from {}", path.display());
                config.merge(Toml::file_exact(path))
            }
            None => config.merge(Toml::file(DEFAULT_CONFIG_FILE)),
        };
        config.merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load(config_file: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(config_file).extract()
    }

    /// Let explicit command line flags take precedence over configured values
    pub fn apply_args(&mut self, args: &StageArgs) {
        if let Some(search_path) = &args.search_path {
            self.search_path = Some(search_path.clone());
        }
        if let Some(variable) = &args.search_path_variable {
            self.search_path_variable = Some(variable.clone());
        }
        if let Some(resources) = &args.resources {
            self.resources = resources.clone();
        }
        if let Some(folder) = &args.folder {
            self.folder = folder.clone();
        }
        self.apply_platform_args(&args.platform);
    }

    pub fn apply_platform_args(&mut self, args: &PlatformArgs) {
        if let Some(os) = &args.os {
            self.os = Some(os.clone());
        }
        if let Some(arch) = &args.arch {
            self.arch = Some(arch.clone());
        }
    }

    /// The configured platform, with anything unset taken from the running one
    pub fn platform(&self) -> Platform {
        let current = Platform::current();
        let os = self
            .os
            .as_deref()
            .map(OsFamily::from_name)
            .unwrap_or(current.os);
        let width = self
            .arch
            .as_deref()
            .map(AddressWidth::from_arch)
            .unwrap_or(current.width);
        Platform::new(os, width)
    }

    /// An explicit search path wins over reading one from the environment
    pub fn search_path(&self, platform: &Platform) -> Result<SearchPath, StagingError> {
        if let Some(search_path) = &self.search_path {
            return Ok(SearchPath::parse(search_path));
        }
        let variable = self
            .search_path_variable
            .as_deref()
            .unwrap_or_else(|| SearchPath::default_variable(&platform.os));
        SearchPath::from_env(variable)
    }

    pub fn bundle(&self) -> ResourceBundle {
        ResourceBundle::new(&self.resources, &self.folder)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_args_override() {
        let mut config = StagingConfig {
            search_path: Some("/usr/lib".into()),
            folder: "glpk-5.0".into(),
            ..Default::default()
        };
        let args = StageArgs {
            search_path: Some("/opt/lib".into()),
            resources: Some(PathBuf::from("/opt/resources")),
            platform: PlatformArgs {
                os: Some("Mac OS X".into()),
                arch: Some("x86".into()),
            },
            ..Default::default()
        };
        config.apply_args(&args);
        assert_eq!(config.search_path.as_deref(), Some("/opt/lib"));
        assert_eq!(config.folder, "glpk-5.0");
        assert_eq!(config.bundle().root(), Path::new("/opt/resources"));

        let platform = config.platform();
        assert_eq!(platform.folder_name(), "mac32");
        let search_path = config.search_path(&platform).unwrap();
        assert_eq!(search_path.directories(), [PathBuf::from("/opt/lib")]);
    }

    #[test]
    fn test_missing_variable() {
        let config = StagingConfig {
            search_path_variable: Some("MSDK_NATIVES_TEST_UNSET_VARIABLE".into()),
            ..Default::default()
        };
        let platform = Platform::from_names("Linux", "amd64");
        assert!(matches!(
            config.search_path(&platform),
            Err(StagingError::Configuration(_))
        ));
    }
}
