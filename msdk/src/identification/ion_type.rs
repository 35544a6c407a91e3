//! Ion types written in bracket notation, like `[M+H]+`, `[M+2H]2+` or `[M+H-H2O]+`.
use std::fmt::Display;
use std::str::FromStr;

use chemical_elements::{ChemicalComposition, PROTON};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IonTypeParseError {
    #[error("Ion type {0:?} must be written as [nM+Adduct]z+ or [nM-Adduct]z-")]
    MalformedNotation(String),
    #[error("Ion type {0:?} does not state a charge and polarity after the brackets")]
    MissingCharge(String),
    #[error("Adduct {adduct:?} in {notation:?} is not a formula of known elements")]
    InvalidAdduct { adduct: String, notation: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn sign(&self) -> i32 {
        match self {
            Polarity::Positive => 1,
            Polarity::Negative => -1,
        }
    }
}

/// The monoisotopic mass of an adduct formula like `H2O` or `NH4`
fn formula_mass(formula: &str, notation: &str) -> Result<f64, IonTypeParseError> {
    let well_formed = formula.starts_with(|c: char| c.is_ascii_uppercase())
        && formula.chars().all(|c| c.is_ascii_alphanumeric());
    if !well_formed {
        return Err(IonTypeParseError::MalformedNotation(notation.to_string()));
    }
    formula
        .parse::<ChemicalComposition>()
        .map(|composition| composition.mass())
        .map_err(|_| IonTypeParseError::InvalidAdduct {
            adduct: formula.to_string(),
            notation: notation.to_string(),
        })
}

/// Split the leading decimal digits off `s`
fn split_count(s: &str) -> (Option<u32>, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        (None, s)
    } else {
        (s[..end].parse().ok(), &s[end..])
    }
}

/// An ionization state of a molecule: how many copies of the molecule, which
/// adducts were gained or lost, and the resulting charge.
#[derive(Debug, Clone, PartialEq)]
pub struct IonType {
    name: String,
    polarity: Polarity,
    charge: u32,
    multimer: u32,
    adduct_mass: f64,
}

impl IonType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// The signed charge state
    pub fn charge(&self) -> i32 {
        self.charge as i32 * self.polarity.sign()
    }

    pub fn multimer(&self) -> u32 {
        self.multimer
    }

    /// The mass added to the molecule(s), including the electrons gained or lost
    pub fn adduct_mass(&self) -> f64 {
        self.adduct_mass
    }

    /// The m/z an ion of this type would be observed at for a molecule of `neutral_mass`
    pub fn ionize(&self, neutral_mass: f64) -> f64 {
        (neutral_mass * self.multimer as f64 + self.adduct_mass) / self.charge as f64
    }

    /// The neutral mass of the molecule an ion of this type observed at `mz` came from
    pub fn neutralize(&self, mz: f64) -> f64 {
        (mz * self.charge as f64 - self.adduct_mass) / self.multimer as f64
    }
}

impl FromStr for IonType {
    type Err = IonTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let notation = s.trim();
        let malformed = || IonTypeParseError::MalformedNotation(notation.to_string());

        let inner_end = notation.rfind(']').ok_or_else(malformed)?;
        let inner = notation.strip_prefix('[').ok_or_else(malformed)?;
        let inner = &inner[..inner_end - 1];
        let tail = &notation[inner_end + 1..];

        let (charge, sign) = split_count(tail);
        let polarity = match sign {
            "+" => Polarity::Positive,
            "-" => Polarity::Negative,
            _ => return Err(IonTypeParseError::MissingCharge(notation.to_string())),
        };
        let charge = charge.unwrap_or(1);
        if charge == 0 {
            return Err(malformed());
        }

        let (multimer, rest) = split_count(inner);
        let multimer = multimer.unwrap_or(1);
        let mut rest = rest.strip_prefix('M').ok_or_else(malformed)?;
        if multimer == 0 {
            return Err(malformed());
        }

        let mut adduct_mass = 0.0;
        while !rest.is_empty() {
            let direction = match rest.as_bytes()[0] {
                b'+' => 1.0,
                b'-' => -1.0,
                _ => return Err(malformed()),
            };
            let term_end = rest[1..]
                .find(['+', '-'])
                .map(|i| i + 1)
                .unwrap_or(rest.len());
            let (count, formula) = split_count(&rest[1..term_end]);
            let count = count.unwrap_or(1) as f64;
            adduct_mass += direction * count * formula_mass(formula, notation)?;
            rest = &rest[term_end..];
        }
        // Each unit of charge is an electron lost or gained relative to a neutral hydrogen
        let electron = formula_mass("H", notation)? - PROTON;
        adduct_mass -= polarity.sign() as f64 * charge as f64 * electron;

        Ok(Self {
            name: notation.to_string(),
            polarity,
            charge,
            multimer,
            adduct_mass,
        })
    }
}

impl Display for IonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
