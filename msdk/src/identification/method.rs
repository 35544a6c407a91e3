//! The boundary between request values built here and the external formula and
//! fingerprint prediction engines that answer them.
use std::sync::{Arc, Barrier};
use std::thread;

use crossbeam_channel::unbounded;
use mzpeaks::Tolerance;
use thiserror::Error;
use tracing::{debug, trace, warn};

use super::constraints::FormulaConstraints;
use super::ion_type::IonType;
use crate::spectrum::MsSpectrum;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IdentificationError {
    #[error("At least one MS/MS spectrum is required")]
    EmptyMs2,
    #[error("At least one candidate must be requested")]
    NoCandidates,
    #[error("The precursor m/z {0} must be a positive, finite value")]
    InvalidPrecursor(f64),
    #[error("The identification engine failed: {0}")]
    Engine(String),
    #[error("The worker running identification {0} panicked")]
    WorkerPanicked(usize),
}

/// A candidate explanation of a precursor ion produced by an engine.
///
/// Formula engines fill in `formula`, fingerprint engines add the structure
/// fields. Anything an engine does not know is left as `None`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IonAnnotation {
    pub formula: Option<String>,
    pub smiles: Option<String>,
    pub inchi_key: Option<String>,
    pub description: Option<String>,
    pub ion_type: Option<IonType>,
    pub expected_mz: Option<f64>,
    pub score: f64,
}

impl IonAnnotation {
    pub fn with_formula<S: Into<String>>(formula: S, score: f64) -> Self {
        Self {
            formula: Some(formula.into()),
            score,
            ..Default::default()
        }
    }
}

/// Everything an engine needs to explain one precursor ion.
#[derive(Debug, Clone)]
pub struct Ms2Experiment {
    ms1: Vec<MsSpectrum>,
    ms2: Vec<MsSpectrum>,
    precursor_mz: f64,
    ion_type: IonType,
    constraints: FormulaConstraints,
    deviation: Tolerance,
}

impl Ms2Experiment {
    /// Start an experiment with the default alphabet and a 10 ppm mass deviation
    pub fn new(precursor_mz: f64, ion_type: IonType) -> Result<Self, IdentificationError> {
        if !precursor_mz.is_finite() || precursor_mz <= 0.0 {
            return Err(IdentificationError::InvalidPrecursor(precursor_mz));
        }
        Ok(Self {
            ms1: Vec::new(),
            ms2: Vec::new(),
            precursor_mz,
            ion_type,
            constraints: FormulaConstraints::default(),
            deviation: Tolerance::PPM(10.0),
        })
    }

    pub fn with_ms1(mut self, spectra: Vec<MsSpectrum>) -> Self {
        self.ms1 = spectra;
        self
    }

    pub fn with_ms2(mut self, spectra: Vec<MsSpectrum>) -> Self {
        self.ms2 = spectra;
        self
    }

    pub fn with_constraints(mut self, constraints: FormulaConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Set the allowed mass deviation in parts-per-million
    pub fn with_deviation(mut self, ppm: f64) -> Self {
        self.deviation = Tolerance::PPM(ppm);
        self
    }

    pub fn ms1(&self) -> &[MsSpectrum] {
        &self.ms1
    }

    pub fn ms2(&self) -> &[MsSpectrum] {
        &self.ms2
    }

    pub fn precursor_mz(&self) -> f64 {
        self.precursor_mz
    }

    pub fn ion_type(&self) -> &IonType {
        &self.ion_type
    }

    pub fn constraints(&self) -> &FormulaConstraints {
        &self.constraints
    }

    pub fn deviation(&self) -> Tolerance {
        self.deviation
    }

    /// The neutral mass of the precursor under the experiment's ion type
    pub fn neutral_mass(&self) -> f64 {
        self.ion_type.neutralize(self.precursor_mz)
    }
}

/// An engine that proposes molecular formulae for the precursor of an experiment
pub trait FormulaEngine {
    /// Return at most `candidates` annotations, best first
    fn identify(
        &self,
        experiment: &Ms2Experiment,
        candidates: usize,
    ) -> Result<Vec<IonAnnotation>, IdentificationError>;
}

/// An engine that proposes structures for a precursor whose formula is known
pub trait FingerprintEngine {
    /// Return at most `candidates` annotations for `annotation`'s formula, best first
    fn predict(
        &self,
        experiment: &Ms2Experiment,
        annotation: &IonAnnotation,
        candidates: usize,
    ) -> Result<Vec<IonAnnotation>, IdentificationError>;
}

fn check_candidates(candidates: usize) -> Result<usize, IdentificationError> {
    if candidates == 0 {
        Err(IdentificationError::NoCandidates)
    } else {
        Ok(candidates)
    }
}

/// Molecular formula prediction for one precursor
#[derive(Debug)]
pub struct SiriusIdentificationMethod<E: FormulaEngine> {
    engine: E,
    experiment: Arc<Ms2Experiment>,
    candidates: usize,
    result: Option<Vec<IonAnnotation>>,
}

impl<E: FormulaEngine> SiriusIdentificationMethod<E> {
    pub fn new(
        engine: E,
        experiment: Ms2Experiment,
        candidates: usize,
    ) -> Result<Self, IdentificationError> {
        if experiment.ms2().is_empty() {
            return Err(IdentificationError::EmptyMs2);
        }
        let candidates = check_candidates(candidates)?;
        Ok(Self {
            engine,
            experiment: Arc::new(experiment),
            candidates,
            result: None,
        })
    }

    /// The experiment this method was built from, shareable with a fingerprint step
    pub fn experiment(&self) -> &Arc<Ms2Experiment> {
        &self.experiment
    }

    pub fn candidates(&self) -> usize {
        self.candidates
    }

    pub fn execute(&mut self) -> Result<&[IonAnnotation], IdentificationError> {
        debug!(
            "Predicting up to {} formulae for precursor {:0.4} as {}",
            self.candidates,
            self.experiment.precursor_mz(),
            self.experiment.ion_type()
        );
        let mut annotations = self.engine.identify(&self.experiment, self.candidates)?;
        annotations.truncate(self.candidates);
        trace!("Formula engine returned {} annotations", annotations.len());
        Ok(self.result.insert(annotations).as_slice())
    }

    pub fn result(&self) -> Option<&[IonAnnotation]> {
        self.result.as_deref()
    }
}

/// Structure prediction for one formula annotation, holding its own engine handle
#[derive(Debug)]
pub struct FingerIdMethod<E: FingerprintEngine> {
    engine: E,
    experiment: Arc<Ms2Experiment>,
    annotation: IonAnnotation,
    candidates: usize,
    result: Option<Vec<IonAnnotation>>,
}

impl<E: FingerprintEngine> FingerIdMethod<E> {
    pub fn new(
        engine: E,
        experiment: Arc<Ms2Experiment>,
        annotation: IonAnnotation,
        candidates: usize,
    ) -> Result<Self, IdentificationError> {
        let candidates = check_candidates(candidates)?;
        Ok(Self {
            engine,
            experiment,
            annotation,
            candidates,
            result: None,
        })
    }

    pub fn annotation(&self) -> &IonAnnotation {
        &self.annotation
    }

    pub fn execute(&mut self) -> Result<&[IonAnnotation], IdentificationError> {
        debug!(
            "Predicting up to {} structures for {}",
            self.candidates,
            self.annotation.formula.as_deref().unwrap_or("?")
        );
        let mut annotations =
            self.engine
                .predict(&self.experiment, &self.annotation, self.candidates)?;
        annotations.truncate(self.candidates);
        Ok(self.result.insert(annotations).as_slice())
    }

    pub fn result(&self) -> Option<&[IonAnnotation]> {
        self.result.as_deref()
    }
}

/// Execute every method on its own thread.
///
/// The threads wait on a shared barrier so they all start predicting at once.
/// Results come back in the order of `methods`, and each method also keeps its
/// own result.
pub fn run_concurrently<E: FingerprintEngine + Send>(
    methods: &mut [FingerIdMethod<E>],
) -> Vec<Result<Vec<IonAnnotation>, IdentificationError>> {
    let n = methods.len();
    let start = Barrier::new(n);
    let (sender, receiver) = unbounded();

    let panicked: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = methods
            .iter_mut()
            .enumerate()
            .map(|(idx, method)| {
                let sender = sender.clone();
                let start = &start;
                scope.spawn(move || {
                    start.wait();
                    if tracing::event_enabled!(tracing::Level::TRACE) {
                        let tid = thread::current().id();
                        trace!("{tid:?}: Running identification {idx}");
                    }
                    let result = method.execute().map(|r| r.to_vec());
                    if let Err(e) = sender.send((idx, result)) {
                        warn!("Failed to send result {idx}: {e}");
                    }
                })
            })
            .collect();
        handles
            .into_iter()
            .enumerate()
            .filter_map(|(idx, handle)| handle.join().err().map(|_| idx))
            .collect()
    });
    drop(sender);

    let mut slots: Vec<Option<Result<Vec<IonAnnotation>, IdentificationError>>> =
        (0..n).map(|_| None).collect();
    while let Ok((idx, result)) = receiver.recv() {
        slots[idx] = Some(result);
    }
    for idx in panicked {
        warn!("Identification {idx} did not finish");
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(idx, slot)| slot.unwrap_or(Err(IdentificationError::WorkerPanicked(idx))))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::datapoint::DataPoint;

    #[derive(Debug)]
    struct TopFormula;

    impl FormulaEngine for TopFormula {
        fn identify(
            &self,
            experiment: &Ms2Experiment,
            candidates: usize,
        ) -> Result<Vec<IonAnnotation>, IdentificationError> {
            let formulae = ["C18H18O5", "C17H18N2O4", "C15H23O5P"];
            Ok(formulae
                .iter()
                .take(candidates)
                .enumerate()
                .map(|(i, f)| {
                    let mut ann = IonAnnotation::with_formula(*f, 10.0 - i as f64);
                    ann.expected_mz = Some(experiment.precursor_mz());
                    ann
                })
                .collect())
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl FingerprintEngine for Failing {
        fn predict(
            &self,
            _experiment: &Ms2Experiment,
            _annotation: &IonAnnotation,
            _candidates: usize,
        ) -> Result<Vec<IonAnnotation>, IdentificationError> {
            Err(IdentificationError::Engine("service unavailable".into()))
        }
    }

    fn experiment() -> Ms2Experiment {
        let ms2: MsSpectrum = [(121.0648, 50.0), (315.1230, 100.0)]
            .into_iter()
            .map(|(mz, i)| DataPoint::new(mz, i).unwrap())
            .collect();
        Ms2Experiment::new(315.1230, "[M+H]+".parse().unwrap())
            .unwrap()
            .with_ms2(vec![ms2])
    }

    #[test]
    fn test_sirius_method() {
        let mut method = SiriusIdentificationMethod::new(TopFormula, experiment(), 1).unwrap();
        assert!(method.result().is_none());
        let result = method.execute().unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].formula.as_deref(), Some("C18H18O5"));
        assert_eq!(method.result().map(|r| r.len()), Some(1));
        assert!((method.experiment().neutral_mass() - 314.1157).abs() < 1e-3);
    }

    #[test]
    fn test_rejects_bad_requests() {
        let exp = Ms2Experiment::new(315.1230, "[M+H]+".parse().unwrap()).unwrap();
        assert_eq!(
            SiriusIdentificationMethod::new(TopFormula, exp, 1).unwrap_err(),
            IdentificationError::EmptyMs2
        );
        assert_eq!(
            SiriusIdentificationMethod::new(TopFormula, experiment(), 0).unwrap_err(),
            IdentificationError::NoCandidates
        );
        assert!(matches!(
            Ms2Experiment::new(-1.0, "[M+H]+".parse().unwrap()),
            Err(IdentificationError::InvalidPrecursor(_))
        ));
    }

    #[test]
    fn test_engine_error_per_method() {
        let exp = Arc::new(experiment());
        let ann = IonAnnotation::with_formula("C18H18O5", 1.0);
        let mut methods = vec![
            FingerIdMethod::new(Failing, exp.clone(), ann.clone(), 3).unwrap(),
            FingerIdMethod::new(Failing, exp, ann, 3).unwrap(),
        ];
        let results = run_concurrently(&mut methods);
        assert_eq!(results.len(), 2);
        for r in results {
            assert!(matches!(r, Err(IdentificationError::Engine(_))));
        }
        assert!(methods[0].result().is_none());
    }

    #[test]
    fn test_run_nothing() {
        let mut methods: Vec<FingerIdMethod<Failing>> = Vec::new();
        assert!(run_concurrently(&mut methods).is_empty());
    }
}
