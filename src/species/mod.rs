//! Physics oracles supplying energies and transition rates for an atomic species.
//!
//! The rate table and cascade simulation only talk to a species through the
//! [TransitionRateOracle] trait. [QuantumDefectAtom] is the implementation shipped
//! with the crate, with predefined species for caesium, rubidium 87 and hydrogen.

pub mod quantum_defect;
pub mod radial;

pub use quantum_defect::QuantumDefectAtom;

use crate::atom::AtomicState;
use crate::constant::{C, H};
use crate::error::{CascadeError, OracleError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Energies, selection rules and transition rates of an atomic species.
pub trait TransitionRateOracle: Send + Sync {
    /// Short name of the species, eg `Cs`. Used to label persisted rate tables.
    fn name(&self) -> &str;

    /// Whether the electric dipole selection rules permit a transition between `a` and `b`.
    fn is_dipole_allowed(&self, a: &AtomicState, b: &AtomicState) -> bool;

    /// Rate of transitions from `from` to `to`, in units of s^-1, including blackbody
    /// stimulated emission and absorption at the given `temperature` (Kelvin).
    ///
    /// Must only be called when [is_dipole_allowed](TransitionRateOracle::is_dipole_allowed) is true.
    fn transition_rate(
        &self,
        from: &AtomicState,
        to: &AtomicState,
        temperature: f64,
    ) -> Result<f64, OracleError>;

    /// Energy of the state, in Joules, measured from the ionisation limit.
    fn energy(&self, state: &AtomicState) -> Result<f64, OracleError>;

    /// Lowest principal quantum number available for orbital angular momentum `l`.
    fn lowest_principal(&self, l: u32) -> u32 {
        l + 1
    }

    /// The ground state of the species, if it should be treated as terminal.
    fn ground_state(&self) -> Option<AtomicState> {
        None
    }

    /// Wavelength of the photon emitted in the transition `from -> to`, in metres.
    ///
    /// The wavelength is negative when `to` lies above `from`, ie when a photon is absorbed.
    fn transition_wavelength(
        &self,
        from: &AtomicState,
        to: &AtomicState,
    ) -> Result<f64, OracleError> {
        let delta = self.energy(from)? - self.energy(to)?;
        Ok(H * C / delta)
    }
}

/// The species that have predefined oracles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeciesKind {
    #[serde(rename = "Cs", alias = "Caesium")]
    Caesium,
    #[serde(rename = "Rb87", alias = "Rb", alias = "Rubidium87")]
    Rubidium87,
    #[serde(rename = "H", alias = "Hydrogen")]
    Hydrogen,
}

impl SpeciesKind {
    /// Creates the oracle for this species.
    pub fn oracle(&self) -> QuantumDefectAtom {
        match self {
            SpeciesKind::Caesium => QuantumDefectAtom::caesium(),
            SpeciesKind::Rubidium87 => QuantumDefectAtom::rubidium87(),
            SpeciesKind::Hydrogen => QuantumDefectAtom::hydrogen(),
        }
    }

    /// Short name used in file names and table metadata.
    pub fn name(&self) -> &'static str {
        match self {
            SpeciesKind::Caesium => "Cs",
            SpeciesKind::Rubidium87 => "Rb87",
            SpeciesKind::Hydrogen => "H",
        }
    }
}

impl fmt::Display for SpeciesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpeciesKind {
    type Err = CascadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cs" | "Caesium" => Ok(SpeciesKind::Caesium),
            "Rb" | "Rb87" | "Rubidium87" => Ok(SpeciesKind::Rubidium87),
            "H" | "Hydrogen" => Ok(SpeciesKind::Hydrogen),
            other => Err(CascadeError::Input(format!(
                "unknown species '{}', expected one of Cs, Rb87, H",
                other
            ))),
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_species_names() {
        assert_eq!("Cs".parse::<SpeciesKind>().unwrap(), SpeciesKind::Caesium);
        assert_eq!("Rb".parse::<SpeciesKind>().unwrap(), SpeciesKind::Rubidium87);
        assert!("Xe".parse::<SpeciesKind>().is_err());
        assert_eq!(SpeciesKind::Rubidium87.oracle().name(), "Rb87");
        let kind: SpeciesKind = serde_yaml::from_str("Cs").unwrap();
        assert_eq!(kind, SpeciesKind::Caesium);
    }
}
