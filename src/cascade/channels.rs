//! Precalculated decay channels out of every state of a rate table.

use crate::constant;
use crate::error::CascadeError;
use crate::rate_table::RateTable;
use crate::species::TransitionRateOracle;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// The exits of a single non-terminal state.
struct Channel {
    targets: Vec<usize>,
    /// Wavelength of the photon emitted on each exit, in nm.
    wavelengths: Vec<f64>,
    distribution: WeightedIndex<f64>,
}

/// Branching ratio samplers for each row of a [RateTable].
///
/// A row whose rates are all zero has no channel; a cascade reaching that state ends.
/// Sampling is a cumulative sum and binary search over the non-zero rates of the row.
pub struct DecayChannels {
    channels: Vec<Option<Channel>>,
}

impl DecayChannels {
    /// Builds samplers for every row of `table`, using `oracle` for the state energies.
    pub fn new<O: TransitionRateOracle + ?Sized>(
        table: &RateTable,
        oracle: &O,
    ) -> Result<Self, CascadeError> {
        let energies = table
            .states()
            .iter()
            .map(|state| {
                oracle.energy(state).map_err(|error| {
                    CascadeError::Consistency(format!(
                        "species {} cannot provide the energy of table state {}: {}",
                        oracle.name(),
                        state,
                        error
                    ))
                })
            })
            .collect::<Result<Vec<f64>, CascadeError>>()?;

        let mut channels = Vec::with_capacity(table.len());
        for from in 0..table.len() {
            let (targets, rates): (Vec<usize>, Vec<f64>) = table.outgoing(from).unzip();
            if targets.is_empty() {
                channels.push(None);
                continue;
            }
            let distribution = WeightedIndex::new(&rates).map_err(|error| {
                CascadeError::Input(format!(
                    "rates out of {} cannot be sampled: {}",
                    table.index().state(from),
                    error
                ))
            })?;
            let wavelengths = targets
                .iter()
                .map(|&to| {
                    constant::H * constant::C / (energies[from] - energies[to]) * constant::NM_PER_M
                })
                .collect();
            channels.push(Some(Channel {
                targets,
                wavelengths,
                distribution,
            }));
        }
        Ok(DecayChannels { channels })
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// True if no transition leaves state index `from`.
    pub fn is_terminal(&self, from: usize) -> bool {
        self.channels[from].is_none()
    }

    /// Chooses the next state after `from` with probability proportional to its rate.
    ///
    /// Returns the destination index and the emitted wavelength in nm, or `None` if
    /// `from` is terminal.
    pub fn sample<R: Rng + ?Sized>(&self, from: usize, rng: &mut R) -> Option<(usize, f64)> {
        self.channels[from].as_ref().map(|channel| {
            let choice = channel.distribution.sample(rng);
            (channel.targets[choice], channel.wavelengths[choice])
        })
    }
}
