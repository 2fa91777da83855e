//! Lookup tables of transition rates between atomic states.
//!
//! A [RateTable] pairs a fixed [StateIndex] with a dense matrix of rates, where
//! entry `(i, j)` is the rate of transitions from state `i` to state `j` in s^-1.
//! Tables are expensive to compute (see [builder]) but cheap to reuse, so they can
//! be persisted to disk and reloaded with [persist].

pub mod builder;
pub mod persist;

pub use builder::RateTableBuilder;

use crate::atom::AtomicState;
use crate::error::CascadeError;
use hashbrown::HashMap;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Bijective map between [AtomicState]s and dense indices `0..S`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateIndex {
    states: Vec<AtomicState>,
    lookup: HashMap<AtomicState, usize>,
}

impl StateIndex {
    /// Creates an index from an ordered list of distinct states.
    pub fn new(states: Vec<AtomicState>) -> Result<Self, CascadeError> {
        let mut lookup = HashMap::with_capacity(states.len());
        for (index, state) in states.iter().enumerate() {
            if lookup.insert(*state, index).is_some() {
                return Err(CascadeError::Input(format!(
                    "state {} appears more than once",
                    state
                )));
            }
        }
        Ok(StateIndex { states, lookup })
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Index of the state, if it is part of the table.
    pub fn index_of(&self, state: &AtomicState) -> Option<usize> {
        self.lookup.get(state).copied()
    }

    /// The state stored at `index`.
    pub fn state(&self, index: usize) -> AtomicState {
        self.states[index]
    }

    pub fn states(&self) -> &[AtomicState] {
        &self.states
    }
}

/// The inputs a table was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Short species name, eg `Cs`.
    pub species: String,
    pub n_max: u32,
    pub l_max: u32,
    /// Temperature of the blackbody field, in Kelvin.
    pub temperature: f64,
    /// Whether the ground state row was zeroed to make it terminal.
    pub absorbing_ground_state: bool,
}

/// Rates of transitions between every ordered pair of states in a [StateIndex].
///
/// Invariants: the matrix is square with one row per state, the diagonal is zero and
/// all entries are finite and non-negative. The table is immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    index: StateIndex,
    rates: DMatrix<f64>,
    metadata: Option<TableMetadata>,
}

impl RateTable {
    /// Creates a table, checking the rate matrix invariants.
    pub fn new(
        states: Vec<AtomicState>,
        rates: DMatrix<f64>,
        metadata: Option<TableMetadata>,
    ) -> Result<Self, CascadeError> {
        let index = StateIndex::new(states)?;
        if rates.nrows() != index.len() || rates.ncols() != index.len() {
            return Err(CascadeError::Input(format!(
                "rate matrix is {}x{} but there are {} states",
                rates.nrows(),
                rates.ncols(),
                index.len()
            )));
        }
        for i in 0..index.len() {
            if rates[(i, i)] != 0.0 {
                return Err(CascadeError::Input(format!(
                    "self transition rate of {} is {}, expected 0",
                    index.state(i),
                    rates[(i, i)]
                )));
            }
            for j in 0..index.len() {
                let rate = rates[(i, j)];
                if !(rate.is_finite() && rate >= 0.0) {
                    return Err(CascadeError::Input(format!(
                        "rate {} -> {} is {}, expected a finite non-negative value",
                        index.state(i),
                        index.state(j),
                        rate
                    )));
                }
            }
        }
        Ok(RateTable {
            index,
            rates,
            metadata,
        })
    }

    /// Creates a table from rows of rates, one row per state.
    pub fn from_rows(
        states: Vec<AtomicState>,
        rows: &[Vec<f64>],
        metadata: Option<TableMetadata>,
    ) -> Result<Self, CascadeError> {
        let size = states.len();
        if rows.len() != size || rows.iter().any(|row| row.len() != size) {
            return Err(CascadeError::Input(format!(
                "expected {} rows of {} rates",
                size, size
            )));
        }
        let data: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::new(states, DMatrix::from_row_slice(size, size, &data), metadata)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &StateIndex {
        &self.index
    }

    pub fn states(&self) -> &[AtomicState] {
        self.index.states()
    }

    pub fn rates(&self) -> &DMatrix<f64> {
        &self.rates
    }

    pub fn metadata(&self) -> Option<&TableMetadata> {
        self.metadata.as_ref()
    }

    /// Rate of transitions from state index `from` to state index `to`, in s^-1.
    pub fn rate(&self, from: usize, to: usize) -> f64 {
        self.rates[(from, to)]
    }

    /// Iterates over the non-zero outgoing rates of state index `from` as `(to, rate)`.
    pub fn outgoing(&self, from: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        (0..self.len())
            .map(move |to| (to, self.rates[(from, to)]))
            .filter(|&(_, rate)| rate > 0.0)
    }

    /// Total rate out of state index `from`.
    pub fn total_rate(&self, from: usize) -> f64 {
        self.rates.row(from).iter().sum()
    }

    /// Checks that the table was built for the given species and temperature.
    ///
    /// Tables without metadata cannot be checked and are accepted.
    pub fn check_consistency(
        &self,
        species: &str,
        temperature: f64,
        n_max: Option<u32>,
        l_max: Option<u32>,
    ) -> Result<(), CascadeError> {
        let metadata = match &self.metadata {
            Some(metadata) => metadata,
            None => {
                log::warn!(
                    "Rate table carries no metadata; cannot check species or temperature."
                );
                return Ok(());
            }
        };
        if metadata.species != species {
            return Err(CascadeError::Consistency(format!(
                "table was built for species {} but the simulation uses {}",
                metadata.species, species
            )));
        }
        if (metadata.temperature - temperature).abs() > 1e-9 * temperature.abs().max(1.0) {
            return Err(CascadeError::Consistency(format!(
                "table was built at {} K but the simulation expects {} K",
                metadata.temperature, temperature
            )));
        }
        if let Some(n_max) = n_max {
            if metadata.n_max != n_max {
                return Err(CascadeError::Consistency(format!(
                    "table was built with n_max = {} but the simulation expects n_max = {}",
                    metadata.n_max, n_max
                )));
            }
        }
        if let Some(l_max) = l_max {
            if metadata.l_max != l_max {
                return Err(CascadeError::Consistency(format!(
                    "table was built with l_max = {} but the simulation expects l_max = {}",
                    metadata.l_max, l_max
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    fn states() -> Vec<AtomicState> {
        vec![
            AtomicState::new(5, 0, 0.5).unwrap(),
            AtomicState::new(5, 1, 0.5).unwrap(),
            AtomicState::new(5, 1, 1.5).unwrap(),
        ]
    }

    fn metadata() -> TableMetadata {
        TableMetadata {
            species: "Rb87".to_string(),
            n_max: 5,
            l_max: 1,
            temperature: 300.0,
            absorbing_ground_state: true,
        }
    }

    #[test]
    fn test_table_lookup() {
        let rows = vec![
            vec![0.0, 0.0, 0.0],
            vec![3.6e7, 0.0, 0.0],
            vec![3.8e7, 0.0, 0.0],
        ];
        let table = RateTable::from_rows(states(), &rows, None).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.index().index_of(&states()[2]), Some(2));
        assert_eq!(table.rate(1, 0), 3.6e7);
        assert_eq!(table.outgoing(2).collect::<Vec<_>>(), vec![(0, 3.8e7)]);
        assert_eq!(table.outgoing(0).count(), 0);
        assert_eq!(table.total_rate(0), 0.0);
    }

    #[test]
    fn test_invariants_are_enforced() {
        let diagonal = vec![vec![1.0, 0.0, 0.0], vec![0.0; 3], vec![0.0; 3]];
        assert!(RateTable::from_rows(states(), &diagonal, None).is_err());
        let negative = vec![vec![0.0, -1.0, 0.0], vec![0.0; 3], vec![0.0; 3]];
        assert!(RateTable::from_rows(states(), &negative, None).is_err());
        let short = vec![vec![0.0; 3], vec![0.0; 3]];
        assert!(RateTable::from_rows(states(), &short, None).is_err());
        let mut duplicated = states();
        duplicated[2] = duplicated[1];
        assert!(RateTable::from_rows(duplicated, &vec![vec![0.0; 3]; 3], None).is_err());
    }

    #[test]
    fn test_consistency_checks() {
        let table =
            RateTable::from_rows(states(), &vec![vec![0.0; 3]; 3], Some(metadata())).unwrap();
        assert!(table.check_consistency("Rb87", 300.0, Some(5), None).is_ok());
        assert!(matches!(
            table.check_consistency("Cs", 300.0, None, None),
            Err(CascadeError::Consistency(_))
        ));
        assert!(matches!(
            table.check_consistency("Rb87", 350.0, None, None),
            Err(CascadeError::Consistency(_))
        ));
        assert!(matches!(
            table.check_consistency("Rb87", 300.0, Some(80), None),
            Err(CascadeError::Consistency(_))
        ));
        assert!(table.check_consistency("Rb87", 300.0, Some(5), Some(1)).is_ok());
        assert!(matches!(
            table.check_consistency("Rb87", 300.0, Some(5), Some(3)),
            Err(CascadeError::Consistency(_))
        ));
    }
}
