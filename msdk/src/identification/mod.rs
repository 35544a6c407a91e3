//! Request types and engine traits for molecular formula and structure identification.
pub mod constraints;
pub mod ion_type;
pub mod method;

pub use constraints::{
    ConstraintError, ConstraintsGenerator, ElementBounds, ElementRange, FormulaConstraints,
    DEFAULT_ALPHABET,
};
pub use ion_type::{IonType, IonTypeParseError, Polarity};
pub use method::{
    run_concurrently, FingerIdMethod, FingerprintEngine, FormulaEngine, IdentificationError,
    IonAnnotation, Ms2Experiment, SiriusIdentificationMethod,
};
