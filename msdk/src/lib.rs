//! Spectral data points and spectra, staging of the native GLPK libraries the
//! formula solver links against, and the interfaces identification engines implement.
pub mod datapoint;
pub mod identification;
pub mod io;
pub mod natives;
pub mod spectrum;

pub use crate::datapoint::{DataPoint, DataPointError, MsDataPoint};
pub use crate::spectrum::{MsSpectrum, MsSpectrumType};
