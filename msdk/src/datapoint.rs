//! A single point of a mass spectrum.
use std::fmt::Display;

use mzpeaks::{CentroidPeak, CoordinateLike, IndexType, IntensityMeasurement, MZ};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An error raised when a [`DataPoint`] would carry an invalid value
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DataPointError {
    #[error("m/z must be a finite, non-negative number, got {0}")]
    InvalidMZ(f64),
    #[error("Intensity must be a finite, non-negative number, got {0}")]
    InvalidIntensity(f64),
}

/// The read-only view of a spectral data point, a pair of m/z and intensity.
///
/// Anything that implements this can be handed to code that only needs to look
/// at spectral signal, like [`MsSpectrum`](crate::spectrum::MsSpectrum) construction.
pub trait MsDataPoint {
    /// The mass-to-charge ratio of this point
    fn mz(&self) -> f64;

    /// The signal magnitude of this point
    fn intensity(&self) -> f64;
}

/// An immutable pair of m/z and intensity.
///
/// The fields are private and there are no mutating methods, so a `DataPoint`
/// can be shared freely between threads once built.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DataPoint {
    mz: f64,
    intensity: f64,
}

impl DataPoint {
    /// Create a new point, rejecting negative, infinite or NaN values
    pub fn new(mz: f64, intensity: f64) -> Result<Self, DataPointError> {
        if !mz.is_finite() || mz < 0.0 {
            return Err(DataPointError::InvalidMZ(mz));
        }
        if !intensity.is_finite() || intensity < 0.0 {
            return Err(DataPointError::InvalidIntensity(intensity));
        }
        Ok(Self { mz, intensity })
    }

    pub fn mz(&self) -> f64 {
        self.mz
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    /// Convert into a [`CentroidPeak`] with the given index.
    ///
    /// Intensity is narrowed to `f32`, as `mzpeaks` stores it.
    pub fn to_centroid(&self, index: IndexType) -> CentroidPeak {
        CentroidPeak::new(self.mz, self.intensity as f32, index)
    }
}

impl MsDataPoint for DataPoint {
    fn mz(&self) -> f64 {
        self.mz
    }

    fn intensity(&self) -> f64 {
        self.intensity
    }
}

impl MsDataPoint for CentroidPeak {
    fn mz(&self) -> f64 {
        CoordinateLike::<MZ>::coordinate(self)
    }

    fn intensity(&self) -> f64 {
        IntensityMeasurement::intensity(self) as f64
    }
}

impl CoordinateLike<MZ> for DataPoint {
    fn coordinate(&self) -> f64 {
        self.mz
    }
}

impl IntensityMeasurement for DataPoint {
    fn intensity(&self) -> f32 {
        self.intensity as f32
    }
}

impl From<DataPoint> for CentroidPeak {
    fn from(value: DataPoint) -> Self {
        value.to_centroid(0)
    }
}

impl TryFrom<(f64, f64)> for DataPoint {
    type Error = DataPointError;

    fn try_from(value: (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(value.0, value.1)
    }
}

impl Display for DataPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}\t{:.3}", self.mz, self.intensity)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_construct() -> Result<(), DataPointError> {
        let p = DataPoint::new(315.123, 1500.0)?;
        assert_eq!(p.mz(), 315.123);
        assert_eq!(p.intensity(), 1500.0);

        let q: DataPoint = (315.123, 1500.0).try_into()?;
        assert_eq!(p, q);

        let z = DataPoint::new(0.0, 0.0)?;
        assert_eq!(z, DataPoint::default());
        Ok(())
    }

    #[test]
    fn test_reject_invalid() {
        assert_eq!(
            DataPoint::new(-1.0, 10.0),
            Err(DataPointError::InvalidMZ(-1.0))
        );
        assert_eq!(
            DataPoint::new(100.0, -0.5),
            Err(DataPointError::InvalidIntensity(-0.5))
        );
        assert!(DataPoint::new(f64::NAN, 1.0).is_err());
        assert!(DataPoint::new(100.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_mzpeaks_interop() {
        let p = DataPoint::new(500.25, 42.0).unwrap();
        let c: CentroidPeak = p.into();
        assert_eq!(CoordinateLike::<MZ>::coordinate(&c), 500.25);
        assert_eq!(IntensityMeasurement::intensity(&c), 42.0f32);
        assert_eq!(MsDataPoint::mz(&c), MsDataPoint::mz(&p));
        assert_eq!(CoordinateLike::<MZ>::coordinate(&p), 500.25);
    }

    #[test]
    fn test_shared_across_threads() {
        let p = DataPoint::new(200.0, 5.0).unwrap();
        let handles: Vec<_> = (0..3)
            .map(|_| std::thread::spawn(move || p.mz() + p.intensity()))
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 205.0);
        }
    }
}
