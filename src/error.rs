//! Error types for rate table construction and cascade simulation.

use crate::atom::AtomicState;
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a [TransitionRateOracle](crate::species::TransitionRateOracle).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
    /// The oracle has no data for this state, eg a shell below the core electrons.
    #[error("state {0} is not supported by this species")]
    UnsupportedState(AtomicState),
    /// The rate of a dipole-forbidden pair was requested.
    #[error("transition {0} -> {1} is not dipole allowed")]
    ForbiddenTransition(AtomicState, AtomicState),
    /// The physics backend produced an unusable number.
    #[error("numerical failure for state {state}: {reason}")]
    Numerical { state: AtomicState, reason: String },
}

/// Canonical error type of the crate.
#[derive(Debug, Error)]
pub enum CascadeError {
    /// Invalid quantum numbers, bounds, iteration counts, ranges or bin widths.
    #[error("invalid input: {0}")]
    Input(String),

    /// The oracle failed on a dipole-allowed pair while building a table.
    #[error("oracle failed for {species} (n_max = {n_max}, l_max = {l_max}) on {from} -> {to}: {source}")]
    Oracle {
        species: String,
        n_max: u32,
        l_max: u32,
        from: AtomicState,
        to: AtomicState,
        #[source]
        source: OracleError,
    },

    /// A loaded table does not match what the simulation expects.
    #[error("inconsistent configuration: {0}")]
    Consistency(String),

    /// A persisted table could not be parsed or breaks the table invariants.
    #[error("malformed rate table {path:?} (line {line}): {reason}")]
    MalformedTable {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
