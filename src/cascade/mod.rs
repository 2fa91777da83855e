//! Stochastic simulation of radiative decay cascades.
//!
//! Starting from a chosen state, a cascade repeatedly picks the next state according to the
//! branching ratios of a [RateTable](crate::rate_table::RateTable), until it reaches a state
//! with no outgoing rates. Photons emitted inside a wavelength window are histogrammed, and
//! optionally tallied by arrival state and by transition.

pub mod channels;
pub mod simulator;
pub mod spectrum;

pub use simulator::{run, CascadeSimulator};
pub use spectrum::{Histogram, PathwayCount, Spectrum, SpectrumAccumulator, StatePopulation};

use crate::atom::AtomicState;
use serde::{Deserialize, Serialize};

/// One step of a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayEvent {
    pub source: AtomicState,
    pub destination: AtomicState,
    /// Wavelength of the emitted photon in nm, negative if a photon was absorbed.
    pub wavelength: f64,
}

#[cfg(test)]
pub mod tests {
    use crate::atom::AtomicState;
    use crate::constant;
    use crate::error::OracleError;
    use crate::rate_table::RateTable;
    use crate::species::TransitionRateOracle;

    /// Ladder of `S` states whose energies give 500 nm for `0 -> 1`, 333 nm for `1 -> 2`
    /// and 200 nm for `0 -> 2`.
    pub struct LevelOracle {
        states: Vec<AtomicState>,
    }

    impl LevelOracle {
        /// Energy of state index `i`, in Joules.
        pub fn level(&self, i: usize) -> f64 {
            let unit = constant::H * constant::C / 500.0e-9;
            if i == 0 {
                0.0
            } else {
                -unit * (1.0 + 1.5 * (i - 1) as f64)
            }
        }
    }

    impl TransitionRateOracle for LevelOracle {
        fn name(&self) -> &str {
            "Synthetic"
        }

        fn is_dipole_allowed(&self, _a: &AtomicState, _b: &AtomicState) -> bool {
            true
        }

        fn transition_rate(
            &self,
            _from: &AtomicState,
            _to: &AtomicState,
            _temperature: f64,
        ) -> Result<f64, OracleError> {
            Ok(0.0)
        }

        fn energy(&self, state: &AtomicState) -> Result<f64, OracleError> {
            self.states
                .iter()
                .position(|s| s == state)
                .map(|i| self.level(i))
                .ok_or(OracleError::UnsupportedState(*state))
        }
    }

    /// A table without metadata over states `20S1/2, 21S1/2, ...`, with the given
    /// `(from, to, rate)` entries and zeros elsewhere.
    pub fn synthetic_table(entries: &[(usize, usize, f64)]) -> (RateTable, LevelOracle) {
        let size = entries
            .iter()
            .map(|&(from, to, _)| from.max(to) + 1)
            .max()
            .unwrap_or(1);
        let states: Vec<AtomicState> = (0..size)
            .map(|i| AtomicState::new(20 + i as u32, 0, 0.5).unwrap())
            .collect();
        let mut rows = vec![vec![0.0; size]; size];
        for &(from, to, rate) in entries {
            rows[from][to] = rate;
        }
        let table = RateTable::from_rows(states.clone(), &rows, None).unwrap();
        (table, LevelOracle { states })
    }

    #[test]
    fn test_synthetic_wavelengths() {
        let (table, oracle) = synthetic_table(&[(0, 1, 1.0), (1, 2, 1.0)]);
        let states = table.states();
        let wavelength = |a: usize, b: usize| {
            oracle.transition_wavelength(&states[a], &states[b]).unwrap() * 1e9
        };
        assert!((wavelength(0, 1) - 500.0).abs() < 1e-6);
        assert!((wavelength(1, 2) - 1000.0 / 3.0).abs() < 1e-6);
        assert!((wavelength(0, 2) - 200.0).abs() < 1e-6);
        assert!(wavelength(2, 0) < 0.0);
    }
}
