use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

fn positive_float(s: &str) -> Result<f64, String> {
    let value = s.parse::<f64>().map_err(|e| e.to_string())?;
    if value <= 0.0 || !value.is_finite() {
        Err(format!("`{s}` is not a positive number"))
    } else {
        Ok(value)
    }
}

/// Stage the GLPK native libraries onto the dynamic library search path, and inspect
/// the platform and spectrum inputs of the identification pipeline.
#[derive(Parser, Debug)]
#[command(author, version)]
pub struct MsdkNatives {
    /// The path to write a log file to, in addition to STDERR
    #[arg(short = 'l', long = "log-file", global = true)]
    pub log_file: Option<PathBuf>,

    /// A TOML configuration file to read staging parameters from.
    ///
    /// Configurations are also read from `msdk-natives.toml` in the working directory.
    /// Environment variables prefixed with `MSDK_NATIVES_` will be read too.
    #[arg(long = "config-file", global = true)]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Copy the GLPK libraries for this platform into the first writable
    /// directory of the library search path
    Stage(StageArgs),
    /// Show the resource folder and library names used on a platform
    Platform(PlatformArgs),
    /// Summarize a plain text spectrum
    Spectrum(SpectrumArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct PlatformArgs {
    /// The operating system name to resolve instead of the running one
    #[arg(long = "os", value_name = "NAME")]
    pub os: Option<String>,

    /// The CPU architecture name to resolve instead of the running one
    #[arg(long = "arch", value_name = "NAME")]
    pub arch: Option<String>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct StageArgs {
    /// An explicit list of directories, separated like PATH, to search for a writable target
    #[arg(short = 'p', long = "search-path", value_name = "PATHS")]
    pub search_path: Option<String>,

    /// The environment variable to read the search path from.
    ///
    /// Defaults to the variable the dynamic loader of the platform reads.
    #[arg(short = 'e', long = "search-path-variable", value_name = "VAR")]
    pub search_path_variable: Option<String>,

    /// The directory holding the bundled library folders
    #[arg(short = 'r', long = "resources", value_name = "DIR")]
    pub resources: Option<PathBuf>,

    /// The release folder inside the resource directory
    #[arg(short = 'f', long = "folder", value_name = "NAME")]
    pub folder: Option<String>,

    #[command(flatten)]
    pub platform: PlatformArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SpectrumArgs {
    /// The text spectrum to read, optionally gzip compressed
    #[arg()]
    pub path: PathBuf,

    /// Report whether a peak is present at this m/z
    #[arg(long = "mz", value_parser = positive_float)]
    pub mz: Option<f64>,

    /// The mass error tolerance in parts-per-million used with `--mz`
    #[arg(long = "ppm", default_value_t = 10.0, value_parser = positive_float)]
    pub ppm: f64,
}
