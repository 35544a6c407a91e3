use std::io::{self, Write};

use mzpeaks::Tolerance;
use thiserror::Error;
use tracing::{debug, info};

use msdk::io::{read_ms_spectrum_path, SpectrumParseError};
use msdk::natives::{required_files, stage_native_libraries, StagingError};

use crate::args::{Command, MsdkNatives, PlatformArgs, SpectrumArgs, StageArgs};
use crate::config::StagingConfig;

#[derive(Debug, Error)]
pub enum NativesError {
    #[error("An IO error occurred: {0}")]
    IOError(
        #[source]
        #[from]
        io::Error,
    ),
    #[error(transparent)]
    StagingError(#[from] StagingError),
    #[error("Failed to read spectrum: {0}")]
    SpectrumError(#[from] SpectrumParseError),
    #[error("Failed to read configuration: {0}")]
    ConfigurationError(#[from] figment::Error),
}

impl MsdkNatives {
    pub fn main(&self) -> Result<(), NativesError> {
        info!(
            "msdk-natives v{}",
            option_env!("CARGO_PKG_VERSION").unwrap_or("unknown")
        );
        let stdout = io::stdout();
        let mut out = stdout.lock();
        match &self.command {
            Command::Stage(args) => self.stage(args, &mut out),
            Command::Platform(args) => self.platform(args, &mut out),
            Command::Spectrum(args) => summarize_spectrum(args, &mut out),
        }
    }

    fn load_config(&self) -> Result<StagingConfig, NativesError> {
        let config = StagingConfig::load(self.config_file.as_deref())?;
        debug!("Loaded configuration {config:?}");
        Ok(config)
    }

    fn stage<W: Write>(&self, args: &StageArgs, out: &mut W) -> Result<(), NativesError> {
        let mut config = self.load_config()?;
        config.apply_args(args);
        stage_with_config(&config, out)
    }

    fn platform<W: Write>(&self, args: &PlatformArgs, out: &mut W) -> Result<(), NativesError> {
        let mut config = self.load_config()?;
        config.apply_platform_args(args);
        let platform = config.platform();
        let files = required_files(&platform.os)?;
        writeln!(out, "Platform: {}", platform.folder_name())?;
        for file in files {
            writeln!(out, "Library: {file}")?;
        }
        Ok(())
    }
}

/// Stage the libraries described by `config`, writing the placed paths to `out`
pub fn stage_with_config<W: Write>(config: &StagingConfig, out: &mut W) -> Result<(), NativesError> {
    let platform = config.platform();
    let search_path = config.search_path(&platform)?;
    let bundle = config.bundle();
    info!("Resources: {}", bundle.root().display());
    let staged = stage_native_libraries(&search_path, &platform, &bundle)?;
    writeln!(out, "Directory: {}", staged.directory.display())?;
    for file in staged.files.iter() {
        writeln!(out, "Staged: {}", file.display())?;
    }
    Ok(())
}

fn summarize_spectrum<W: Write>(args: &SpectrumArgs, out: &mut W) -> Result<(), NativesError> {
    let spectrum = read_ms_spectrum_path(&args.path)?;
    writeln!(out, "Points: {}", spectrum.len())?;
    writeln!(out, "Type: {}", spectrum.spectrum_type())?;
    if let Some((low, high)) = spectrum.mz_range() {
        writeln!(out, "m/z range: {low:0.4}-{high:0.4}")?;
    }
    writeln!(out, "TIC: {:0.3}", spectrum.total_ion_current())?;
    if let Some(peak) = spectrum.base_peak() {
        writeln!(out, "Base peak: {:0.4} ({:0.3})", peak.mz(), peak.intensity())?;
    }
    if let Some(mz) = args.mz {
        match spectrum.has_peak(mz, Tolerance::PPM(args.ppm)) {
            Some(peak) => writeln!(
                out,
                "Match: {:0.4} ({:0.3}) within {} ppm of {mz:0.4}",
                peak.mz(),
                peak.intensity(),
                args.ppm
            )?,
            None => writeln!(out, "No match within {} ppm of {mz:0.4}", args.ppm)?,
        }
    }
    Ok(())
}
