//! Construction of complete rate tables from a [TransitionRateOracle].

use super::{RateTable, TableMetadata};
use crate::atom::AtomicState;
use crate::error::{CascadeError, OracleError};
use crate::species::TransitionRateOracle;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Builds the [RateTable] of every state within the quantum-number bounds.
///
/// The oracle is asked whether each ordered pair is dipole allowed before its rate is
/// requested; forbidden pairs get a rate of exactly zero and the oracle's rate function is
/// never called for them. Any failure of the oracle on an allowed pair aborts the build.
///
/// Rows are computed in parallel.
pub struct RateTableBuilder<'a, O: TransitionRateOracle + ?Sized> {
    oracle: &'a O,
    /// Maximum principal quantum number.
    n_max: u32,
    /// Maximum orbital angular momentum quantum number.
    l_max: u32,
    /// Temperature of the blackbody field, in Kelvin.
    temperature: f64,
    /// If true, the oracle's ground state has no outgoing transitions.
    absorbing_ground_state: bool,
}

impl<'a, O: TransitionRateOracle + ?Sized> RateTableBuilder<'a, O> {
    pub fn new(oracle: &'a O, n_max: u32, l_max: u32, temperature: f64) -> Self {
        RateTableBuilder {
            oracle,
            n_max,
            l_max,
            temperature,
            absorbing_ground_state: true,
        }
    }

    /// Sets whether the ground state row is zeroed, making the ground state terminal.
    ///
    /// At finite temperature the ground state can absorb blackbody photons, so without
    /// this a cascade would only stop in states with no modelled exits.
    pub fn absorbing_ground_state(mut self, absorbing: bool) -> Self {
        self.absorbing_ground_state = absorbing;
        self
    }

    fn validate(&self) -> Result<(), CascadeError> {
        if self.n_max < 2 {
            return Err(CascadeError::Input(format!(
                "n_max = {} must be at least 2",
                self.n_max
            )));
        }
        if self.l_max >= self.n_max {
            return Err(CascadeError::Input(format!(
                "l_max = {} must be smaller than n_max = {}",
                self.l_max, self.n_max
            )));
        }
        if !(self.temperature.is_finite() && self.temperature >= 0.0) {
            return Err(CascadeError::Input(format!(
                "temperature {} K must be finite and non-negative",
                self.temperature
            )));
        }
        Ok(())
    }

    /// Lists every state within the bounds, ordered by `n`, then `l`, then `j`.
    pub fn enumerate_states(&self) -> Result<Vec<AtomicState>, CascadeError> {
        self.validate()?;
        let mut states = Vec::new();
        for n in 1..=self.n_max {
            for l in 0..=self.l_max.min(n - 1) {
                if n < self.oracle.lowest_principal(l) {
                    continue;
                }
                for twice_j in AtomicState::allowed_twice_j(l) {
                    states.push(AtomicState::from_twice_j(n, l, twice_j)?);
                }
            }
        }
        if states.is_empty() {
            return Err(CascadeError::Input(format!(
                "no {} states exist with n <= {} and l <= {}",
                self.oracle.name(),
                self.n_max,
                self.l_max
            )));
        }
        Ok(states)
    }

    /// Computes the rates of all transitions out of `states[from]`.
    fn row(&self, from: usize, states: &[AtomicState]) -> Result<Vec<f64>, CascadeError> {
        let mut row = vec![0.0; states.len()];
        let source = &states[from];
        if self.absorbing_ground_state && self.oracle.ground_state().as_ref() == Some(source) {
            return Ok(row);
        }
        for (to, destination) in states.iter().enumerate() {
            if to == from || !self.oracle.is_dipole_allowed(source, destination) {
                continue;
            }
            let rate = self
                .oracle
                .transition_rate(source, destination, self.temperature)
                .and_then(|rate| {
                    if rate.is_finite() && rate >= 0.0 {
                        Ok(rate)
                    } else {
                        Err(OracleError::Numerical {
                            state: *source,
                            reason: format!("rate to {} is {}", destination, rate),
                        })
                    }
                })
                .map_err(|error| self.oracle_error(source, destination, error))?;
            row[to] = rate;
        }
        Ok(row)
    }

    fn oracle_error(
        &self,
        from: &AtomicState,
        to: &AtomicState,
        source: OracleError,
    ) -> CascadeError {
        CascadeError::Oracle {
            species: self.oracle.name().to_string(),
            n_max: self.n_max,
            l_max: self.l_max,
            from: *from,
            to: *to,
            source,
        }
    }

    /// Builds the complete table. No partial table is returned on failure.
    pub fn build(&self) -> Result<RateTable, CascadeError> {
        let states = self.enumerate_states()?;
        let size = states.len();
        log::info!(
            "Building {} rate table: n_max = {}, l_max = {}, T = {} K, {} states, {} pairs.",
            self.oracle.name(),
            self.n_max,
            self.l_max,
            self.temperature,
            size,
            size * (size - 1)
        );

        let completed = AtomicUsize::new(0);
        let rows = (0..size)
            .into_par_iter()
            .map(|from| -> Result<Vec<f64>, CascadeError> {
                let row = self.row(from, &states)?;
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                log::debug!("Calculated transitions for state {} of {}", done, size);
                Ok(row)
            })
            .collect::<Result<Vec<Vec<f64>>, CascadeError>>()?;

        let metadata = TableMetadata {
            species: self.oracle.name().to_string(),
            n_max: self.n_max,
            l_max: self.l_max,
            temperature: self.temperature,
            absorbing_ground_state: self.absorbing_ground_state,
        };
        let table = RateTable::from_rows(states, &rows, Some(metadata))?;
        log::info!("Rate table for {} complete.", self.oracle.name());
        Ok(table)
    }
}

/// Builds the rate table of `oracle` for all states with `n <= n_max` and `l <= l_max`.
pub fn build<O: TransitionRateOracle + ?Sized>(
    oracle: &O,
    n_max: u32,
    l_max: u32,
    temperature: f64,
) -> Result<RateTable, CascadeError> {
    RateTableBuilder::new(oracle, n_max, l_max, temperature).build()
}
