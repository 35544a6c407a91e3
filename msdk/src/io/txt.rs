//! Read a mass spectrum from a plain text peak list.
//!
//! Each line holds one point, m/z first and intensity second, separated by
//! whitespace, a comma or a semicolon. Blank lines and lines starting with `#`
//! are skipped, and any columns after the second are ignored.
use std::fs;
use std::io::{self, prelude::*};
use std::num::ParseFloatError;
use std::path::Path;

use flate2::bufread::GzDecoder;
use thiserror::Error;
use tracing::debug;

use crate::datapoint::{DataPoint, DataPointError};
use crate::spectrum::{MsSpectrum, MsSpectrumType};

#[derive(Debug, Error)]
pub enum SpectrumParseError {
    #[error("An IO error occurred: {0}")]
    IOError(
        #[source]
        #[from]
        io::Error,
    ),
    #[error("Line {line}: expected an m/z and an intensity column, found {content:?}")]
    MissingColumn { line: usize, content: String },
    #[error("Line {line}: could not parse {content:?} as a number: {source}")]
    MalformedNumber {
        line: usize,
        content: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("Line {line}: {source}")]
    InvalidPoint {
        line: usize,
        #[source]
        source: DataPointError,
    },
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ',' || c == ';'
}

fn parse_column(token: Option<&str>, line: usize, content: &str) -> Result<f64, SpectrumParseError> {
    let token = token.ok_or_else(|| SpectrumParseError::MissingColumn {
        line,
        content: content.to_string(),
    })?;
    token
        .parse::<f64>()
        .map_err(|source| SpectrumParseError::MalformedNumber {
            line,
            content: token.to_string(),
            source,
        })
}

/// Parse a single spectrum from `reader`
pub fn parse_ms_spectrum<R: BufRead>(reader: R) -> Result<MsSpectrum, SpectrumParseError> {
    let mut points = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line_number = i + 1;
        let line = line?;
        let content = line.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }
        let mut tokens = content.split(is_separator).filter(|t| !t.is_empty());
        let mz = parse_column(tokens.next(), line_number, content)?;
        let intensity = parse_column(tokens.next(), line_number, content)?;
        let point = DataPoint::new(mz, intensity).map_err(|source| {
            SpectrumParseError::InvalidPoint {
                line: line_number,
                source,
            }
        })?;
        points.push(point);
    }
    debug!("Read {} data points", points.len());
    Ok(MsSpectrum::new(points, MsSpectrumType::Centroided))
}

/// Open `path` and parse the spectrum it holds, decompressing it first if the name ends in `.gz`
pub fn read_ms_spectrum_path<P: AsRef<Path>>(path: P) -> Result<MsSpectrum, SpectrumParseError> {
    let path = path.as_ref();
    let handle = io::BufReader::new(fs::File::open(path)?);
    let compressed = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or_default();
    debug!("Reading spectrum from {} (compressed? {compressed})", path.display());
    if compressed {
        parse_ms_spectrum(io::BufReader::new(GzDecoder::new(handle)))
    } else {
        parse_ms_spectrum(handle)
    }
}
