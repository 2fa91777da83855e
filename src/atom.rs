//! Atomic states of a single valence electron, labelled by `(n, l, j)`.

use crate::error::CascadeError;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

/// Spectroscopic letters for the orbital quantum number. `J` is skipped by convention.
const ORBITAL_LABELS: [char; 21] = [
    'S', 'P', 'D', 'F', 'G', 'H', 'I', 'K', 'L', 'M', 'N', 'O', 'Q', 'R', 'T', 'U', 'V', 'W', 'X',
    'Y', 'Z',
];

/// A fine-structure resolved state of a one-electron atom.
///
/// The total angular momentum `j` is half-integer for a spin-1/2 electron, so it is
/// stored exactly as `2j`. Two states are equal only if all three quantum numbers match.
///
/// States are ordered by `n`, then `l`, then `j`. This is the order in which a
/// [RateTable](crate::rate_table::RateTable) enumerates its states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "StateLabel", into = "StateLabel")]
pub struct AtomicState {
    n: u32,
    l: u32,
    twice_j: u32,
}

impl AtomicState {
    /// Creates a new state, checking that the quantum numbers are physically realisable.
    ///
    /// # Arguments
    ///
    /// `n`: principal quantum number, `n >= 1`.
    ///
    /// `l`: orbital angular momentum, `0 <= l <= n - 1`.
    ///
    /// `j`: total angular momentum, a half-integer with `|l - 1/2| <= j <= l + 1/2`.
    pub fn new(n: u32, l: u32, j: f64) -> Result<Self, CascadeError> {
        let twice_j = 2.0 * j;
        if !twice_j.is_finite() || twice_j < 0.0 || (twice_j - twice_j.round()).abs() > 1e-9 {
            return Err(CascadeError::Input(format!(
                "j = {} is not a half-integer (n = {}, l = {})",
                j, n, l
            )));
        }
        Self::from_twice_j(n, l, twice_j.round() as u32)
    }

    /// Creates a new state from `2j`, which avoids any floating point representation of `j`.
    pub fn from_twice_j(n: u32, l: u32, twice_j: u32) -> Result<Self, CascadeError> {
        if n < 1 {
            return Err(CascadeError::Input(format!("n = {} must be at least 1", n)));
        }
        if l >= n {
            return Err(CascadeError::Input(format!(
                "l = {} is not realisable for n = {}",
                l, n
            )));
        }
        if !Self::allowed_twice_j(l).any(|allowed| allowed == twice_j) {
            return Err(CascadeError::Input(format!(
                "j = {}/2 is not allowed for l = {}",
                twice_j, l
            )));
        }
        Ok(AtomicState { n, l, twice_j })
    }

    /// Creates a state from trusted quantum numbers, such as tabulated species data.
    pub(crate) const fn from_parts(n: u32, l: u32, twice_j: u32) -> Self {
        AtomicState { n, l, twice_j }
    }

    /// The allowed values of `2j` for a given `l`, in ascending order.
    pub fn allowed_twice_j(l: u32) -> impl Iterator<Item = u32> {
        let lowest = if l == 0 { 1 } else { 2 * l - 1 };
        (lowest..=2 * l + 1).step_by(2)
    }

    pub fn n(&self) -> u32 {
        self.n
    }

    pub fn l(&self) -> u32 {
        self.l
    }

    pub fn twice_j(&self) -> u32 {
        self.twice_j
    }

    /// Total angular momentum `j`.
    pub fn j(&self) -> f64 {
        self.twice_j as f64 / 2.0
    }

    /// Spectroscopic letter for the orbital angular momentum, eg `D` for `l = 2`.
    pub fn orbital_label(&self) -> Option<char> {
        ORBITAL_LABELS.get(self.l as usize).copied()
    }
}

impl fmt::Display for AtomicState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.orbital_label() {
            Some(label) => write!(f, "{}{}{}/2", self.n, label, self.twice_j),
            None => write!(f, "{}[l={}]{}/2", self.n, self.l, self.twice_j),
        }
    }
}

/// Human readable form of an [AtomicState] used in configuration files, eg `{n: 30, l: 2, j: 2.5}`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct StateLabel {
    pub n: u32,
    pub l: u32,
    pub j: f64,
}

impl TryFrom<StateLabel> for AtomicState {
    type Error = CascadeError;

    fn try_from(label: StateLabel) -> Result<Self, Self::Error> {
        AtomicState::new(label.n, label.l, label.j)
    }
}

impl From<AtomicState> for StateLabel {
    fn from(state: AtomicState) -> Self {
        StateLabel {
            n: state.n,
            l: state.l,
            j: state.j(),
        }
    }
}
