//! Element bounds handed to a formula prediction engine.
use std::collections::BTreeMap;
use std::fmt::Display;

use chemical_elements::ElementSpecification;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("{0:?} is not a known element")]
    UnknownElement(String),
    #[error("The lower bound for {symbol} ({min}) is greater than its upper bound ({max})")]
    InvertedBounds { symbol: String, min: u32, max: u32 },
}

/// The number of atoms of one element a formula may contain, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementBounds {
    pub min: u32,
    pub max: u32,
}

impl ElementBounds {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn unbounded() -> Self {
        Self::new(0, u32::MAX)
    }

    pub fn is_banned(&self) -> bool {
        self.max == 0
    }
}

impl Display for ElementBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.max == u32::MAX {
            write!(f, "[{}, *]", self.min)
        } else {
            write!(f, "[{}, {}]", self.min, self.max)
        }
    }
}

fn check_element(symbol: &str) -> Result<(), ConstraintError> {
    ElementSpecification::parse(symbol)
        .map(|_| ())
        .map_err(|_| ConstraintError::UnknownElement(symbol.to_string()))
}

/// A molecular formula range, a set of per-element atom count bounds.
///
/// An upper bound of zero bans the element outright.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ElementRange {
    elements: BTreeMap<String, ElementBounds>,
}

impl ElementRange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bounds for `symbol`, replacing any previous bounds
    pub fn add_element(&mut self, symbol: &str, min: u32, max: u32) -> Result<(), ConstraintError> {
        check_element(symbol)?;
        if min > max {
            return Err(ConstraintError::InvertedBounds {
                symbol: symbol.to_string(),
                min,
                max,
            });
        }
        self.elements
            .insert(symbol.to_string(), ElementBounds::new(min, max));
        Ok(())
    }

    pub fn get(&self, symbol: &str) -> Option<&ElementBounds> {
        self.elements.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ElementBounds)> {
        self.elements.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// The alphabet of elements a formula engine may use, with their upper bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaConstraints {
    alphabet: BTreeMap<String, ElementBounds>,
}

/// The elements every formula search allows unless told otherwise
pub const DEFAULT_ALPHABET: [&str; 5] = ["C", "H", "N", "O", "P"];

impl Default for FormulaConstraints {
    fn default() -> Self {
        let alphabet = DEFAULT_ALPHABET
            .iter()
            .map(|s| (s.to_string(), ElementBounds::unbounded()))
            .collect();
        Self { alphabet }
    }
}

impl FormulaConstraints {
    pub fn empty() -> Self {
        Self {
            alphabet: BTreeMap::new(),
        }
    }

    pub fn allows(&self, symbol: &str) -> bool {
        self.alphabet.contains_key(symbol)
    }

    pub fn bounds(&self, symbol: &str) -> Option<&ElementBounds> {
        self.alphabet.get(symbol)
    }

    pub fn set_bound(&mut self, symbol: &str, bounds: ElementBounds) -> Result<(), ConstraintError> {
        check_element(symbol)?;
        self.alphabet.insert(symbol.to_string(), bounds);
        Ok(())
    }

    pub fn ban(&mut self, symbol: &str) {
        self.alphabet.remove(symbol);
    }

    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.alphabet.keys().map(|k| k.as_str())
    }
}

impl Display for FormulaConstraints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (symbol, bounds) in self.alphabet.iter() {
            write!(f, "{symbol}{bounds}")?;
        }
        Ok(())
    }
}

/// Turns a molecular formula range into [`FormulaConstraints`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConstraintsGenerator {
    base: FormulaConstraints,
}

impl ConstraintsGenerator {
    pub fn new(base: FormulaConstraints) -> Self {
        Self { base }
    }

    /// Start from the base alphabet, add every element of `range` that is
    /// allowed at least one atom, and remove every element `range` bans.
    pub fn generate_constraint(&self, range: &ElementRange) -> FormulaConstraints {
        let mut constraints = self.base.clone();
        for (symbol, bounds) in range.iter() {
            if bounds.is_banned() {
                trace!("Banning {symbol}");
                constraints.ban(symbol);
            } else {
                trace!("Allowing {symbol}{bounds}");
                constraints
                    .alphabet
                    .insert(symbol.to_string(), *bounds);
            }
        }
        constraints
    }
}
