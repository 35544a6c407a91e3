//! A container of [`DataPoint`]s making up one mass spectrum.
use std::fmt::Display;
use std::ops::Index;

use mzpeaks::{CentroidPeak, IndexType, MZPeakSetType, Tolerance};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::debug;

use crate::datapoint::{DataPoint, DataPointError, MsDataPoint};

/// Whether the signal of a spectrum is centroided or continuous
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MsSpectrumType {
    #[default]
    Centroided,
    Profile,
}

impl Display for MsSpectrumType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Compute the inclusive m/z window a tolerance allows around `mz`
pub fn tolerance_window(mz: f64, error_tolerance: Tolerance) -> (f64, f64) {
    match error_tolerance {
        Tolerance::PPM(ppm) => {
            let width = mz * ppm / 1e6;
            (mz - width, mz + width)
        }
        Tolerance::Da(da) => (mz - da, mz + da),
    }
}

/// A mass spectrum, its data points kept sorted by m/z.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MsSpectrum {
    data_points: Vec<DataPoint>,
    spectrum_type: MsSpectrumType,
}

impl MsSpectrum {
    pub fn new(mut data_points: Vec<DataPoint>, spectrum_type: MsSpectrumType) -> Self {
        data_points.sort_by(|a, b| a.mz().total_cmp(&b.mz()));
        Self {
            data_points,
            spectrum_type,
        }
    }

    /// Build a spectrum from anything that looks like a data point.
    ///
    /// Points that would violate [`DataPoint`]'s invariants are dropped and
    /// logged. Use [`MsSpectrum::try_from_points`] to reject them instead.
    pub fn from_points<P: MsDataPoint, I: IntoIterator<Item = P>>(
        points: I,
        spectrum_type: MsSpectrumType,
    ) -> Self {
        let data_points = points
            .into_iter()
            .filter_map(|p| match DataPoint::new(p.mz(), p.intensity()) {
                Ok(point) => Some(point),
                Err(e) => {
                    debug!("Dropping data point: {e}");
                    None
                }
            })
            .collect();
        Self::new(data_points, spectrum_type)
    }

    /// Build a spectrum from anything that looks like a data point, failing on
    /// the first point that is not a valid [`DataPoint`]
    pub fn try_from_points<P: MsDataPoint, I: IntoIterator<Item = P>>(
        points: I,
        spectrum_type: MsSpectrumType,
    ) -> Result<Self, DataPointError> {
        let data_points = points
            .into_iter()
            .map(|p| DataPoint::new(p.mz(), p.intensity()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(data_points, spectrum_type))
    }

    pub fn len(&self) -> usize {
        self.data_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DataPoint> {
        self.data_points.iter()
    }

    pub fn data_points(&self) -> &[DataPoint] {
        &self.data_points
    }

    pub fn spectrum_type(&self) -> MsSpectrumType {
        self.spectrum_type
    }

    /// The lowest and highest m/z in the spectrum, if it has any points
    pub fn mz_range(&self) -> Option<(f64, f64)> {
        match (self.data_points.first(), self.data_points.last()) {
            (Some(first), Some(last)) => Some((first.mz(), last.mz())),
            _ => None,
        }
    }

    pub fn total_ion_current(&self) -> f64 {
        self.data_points.iter().map(|p| p.intensity()).sum()
    }

    /// The most intense point. Ties resolve to the lowest m/z.
    pub fn base_peak(&self) -> Option<&DataPoint> {
        self.data_points.iter().fold(None, |best: Option<&DataPoint>, p| match best {
            Some(b) if b.intensity() >= p.intensity() => Some(b),
            _ => Some(p),
        })
    }

    /// The most intense point within `error_tolerance` of `mz`
    pub fn has_peak(&self, mz: f64, error_tolerance: Tolerance) -> Option<&DataPoint> {
        let (low, high) = tolerance_window(mz, error_tolerance);
        let start = self.data_points.partition_point(|p| p.mz() < low);
        self.data_points[start..]
            .iter()
            .take_while(|p| p.mz() <= high)
            .fold(None, |best: Option<&DataPoint>, p| match best {
                Some(b) if b.intensity() >= p.intensity() => Some(b),
                _ => Some(p),
            })
    }

    /// Copy the spectrum into an `mzpeaks` peak set for use with peak-based algorithms
    pub fn to_peak_set(&self) -> MZPeakSetType<CentroidPeak> {
        let peaks = self
            .data_points
            .iter()
            .enumerate()
            .map(|(i, p)| p.to_centroid(i as IndexType))
            .collect();
        MZPeakSetType::new(peaks)
    }
}

impl Index<usize> for MsSpectrum {
    type Output = DataPoint;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data_points[index]
    }
}

impl<'a> IntoIterator for &'a MsSpectrum {
    type Item = &'a DataPoint;
    type IntoIter = std::slice::Iter<'a, DataPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<DataPoint> for MsSpectrum {
    fn from_iter<T: IntoIterator<Item = DataPoint>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect(), MsSpectrumType::default())
    }
}
