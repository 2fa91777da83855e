//! Monte Carlo simulation of the fluorescence emitted by Rydberg atoms as they cascade
//! down to their ground state.
//!
//! A [RateTable](rate_table::RateTable) of transition rates between every pair of states
//! below some `n_max` is built once from a physics oracle (see [species]) and persisted.
//! The [CascadeSimulator](cascade::CascadeSimulator) then samples many decay cascades
//! through the table, histogramming the wavelengths of photons emitted in a band of
//! interest.

pub mod atom;
pub mod cascade;
pub mod configuration;
pub mod constant;
pub mod error;
pub mod maths;
pub mod output;
pub mod rate_table;
pub mod species;

#[cfg(test)]
pub mod integration_tests;
