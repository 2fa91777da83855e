//! Monte Carlo sampling of decay cascades through a rate table.

use super::channels::DecayChannels;
use super::spectrum::{Spectrum, SpectrumAccumulator};
use super::DecayEvent;
use crate::atom::AtomicState;
use crate::configuration::CascadeConfig;
use crate::error::CascadeError;
use crate::rate_table::RateTable;
use crate::species::TransitionRateOracle;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Seed of the random stream of a chunk of cascades.
fn chunk_seed(seed: u64, chunk: u64) -> u64 {
    seed ^ chunk.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Runs cascades from a chosen state through a shared [RateTable].
///
/// Each step of a cascade picks the next state with probability proportional to the rate
/// out of the current state, so only branching ratios matter and no dwell times are
/// simulated. A cascade ends on a state whose rates are all zero. Cascades may revisit
/// states; there is no limit on their length.
pub struct CascadeSimulator<'a> {
    table: &'a RateTable,
    channels: DecayChannels,
}

impl<'a> CascadeSimulator<'a> {
    /// Prepares a simulator for `table`, with emitted wavelengths taken from `oracle`.
    pub fn new<O: TransitionRateOracle + ?Sized>(
        table: &'a RateTable,
        oracle: &O,
    ) -> Result<Self, CascadeError> {
        Ok(CascadeSimulator {
            table,
            channels: DecayChannels::new(table, oracle)?,
        })
    }

    pub fn table(&self) -> &RateTable {
        self.table
    }

    fn start_index(&self, initial_state: &AtomicState) -> Result<usize, CascadeError> {
        self.table.index().index_of(initial_state).ok_or_else(|| {
            CascadeError::Input(format!(
                "initial state {} is not part of the rate table",
                initial_state
            ))
        })
    }

    /// Samples one full cascade from `initial_state`, returning every step taken.
    pub fn sample_cascade<R: Rng + ?Sized>(
        &self,
        initial_state: &AtomicState,
        rng: &mut R,
    ) -> Result<Vec<DecayEvent>, CascadeError> {
        let index = self.table.index();
        let mut current = self.start_index(initial_state)?;
        let mut events = Vec::new();
        while let Some((next, wavelength)) = self.channels.sample(current, rng) {
            events.push(DecayEvent {
                source: index.state(current),
                destination: index.state(next),
                wavelength,
            });
            current = next;
        }
        Ok(events)
    }

    fn cascade_into<R: Rng + ?Sized>(
        &self,
        start: usize,
        rng: &mut R,
        accumulator: &mut SpectrumAccumulator,
    ) {
        let mut current = start;
        while let Some((next, wavelength)) = self.channels.sample(current, rng) {
            accumulator.record(current, next, wavelength);
            current = next;
        }
        accumulator.finish_cascade();
    }

    /// Runs `config.iterations` cascades and returns the raw totals.
    ///
    /// Cascades are split into chunks of `config.chunk_size()`, each with its own random
    /// stream derived from the seed, and chunks run in parallel. The result for a given
    /// seed does not depend on the number of threads.
    ///
    /// # Arguments
    ///
    /// `config`: the simulation inputs. The species and temperature are not checked here,
    /// see [run](CascadeSimulator::run).
    ///
    /// `seed`: seed of the random streams.
    pub fn accumulate(
        &self,
        config: &CascadeConfig,
        seed: u64,
    ) -> Result<SpectrumAccumulator, CascadeError> {
        config.validate()?;
        let start = self.start_index(&config.initial_state)?;
        let histogram = config.histogram()?;
        let chunk_size = config.chunk_size();
        let chunks = (config.iterations + chunk_size - 1) / chunk_size;

        let accumulator = (0..chunks)
            .into_par_iter()
            .map(|chunk| {
                let mut rng = StdRng::seed_from_u64(chunk_seed(seed, chunk));
                let mut accumulator = SpectrumAccumulator::new(histogram.clone());
                let cascades = chunk_size.min(config.iterations - chunk * chunk_size);
                for _ in 0..cascades {
                    self.cascade_into(start, &mut rng, &mut accumulator);
                }
                log::debug!("Finished chunk {} of {}", chunk + 1, chunks);
                accumulator
            })
            .reduce(
                || SpectrumAccumulator::new(histogram.clone()),
                |mut total, partial| {
                    total.merge(partial);
                    total
                },
            );
        Ok(accumulator)
    }

    /// Simulates the cascades described by `config` and returns the normalised spectrum.
    ///
    /// Fails if the table metadata does not match the species and temperature of the
    /// configuration, or its `n_max` and `l_max` when those are set.
    pub fn run(&self, config: &CascadeConfig) -> Result<Spectrum, CascadeError> {
        self.table.check_consistency(
            config.species.name(),
            config.temperature,
            config.n_max,
            config.l_max,
        )?;
        let seed = match config.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::thread_rng().gen();
                log::info!("No seed configured, using seed {}", seed);
                seed
            }
        };
        log::info!(
            "Running {} cascades of {} from {}",
            config.iterations,
            config.species,
            config.initial_state
        );
        let accumulator = self.accumulate(config, seed)?;
        log::info!(
            "Finished {} cascades: {} photons in [{}, {}] nm, mean cascade length {:.3}",
            accumulator.cascades(),
            accumulator.qualifying_events(),
            config.wavelength_range.min,
            config.wavelength_range.max,
            accumulator.transitions() as f64 / accumulator.cascades() as f64
        );
        Ok(accumulator.into_spectrum(
            self.table,
            config.iterations,
            config.emit_population_stats,
            config.emit_pathway_stats,
        ))
    }
}

/// Runs the simulation described by `config` on `table`.
pub fn run<O: TransitionRateOracle + ?Sized>(
    table: &RateTable,
    oracle: &O,
    config: &CascadeConfig,
) -> Result<Spectrum, CascadeError> {
    CascadeSimulator::new(table, oracle)?.run(config)
}
