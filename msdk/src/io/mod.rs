//! Readers for spectrum file formats
pub mod txt;

pub use txt::{parse_ms_spectrum, read_ms_spectrum_path, SpectrumParseError};
