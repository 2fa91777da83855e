//! Accumulation of emitted photons into a spectrum, state populations and pathways.

use crate::atom::AtomicState;
use crate::error::CascadeError;
use crate::rate_table::RateTable;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Largest number of bins a histogram may hold.
const MAX_BINS: usize = 50_000_000;

/// Fixed-width histogram of wavelengths over a closed range `[min, max]`, in nm.
///
/// The number of bins is `floor((max - min) / bin_width)`, at least one. Bins are spread
/// evenly over the range, so the last bin includes `max`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    min: f64,
    max: f64,
    counts: Vec<u64>,
}

impl Histogram {
    pub fn new(min: f64, max: f64, bin_width: f64) -> Result<Self, CascadeError> {
        if !(min.is_finite() && max.is_finite()) || min >= max {
            return Err(CascadeError::Input(format!(
                "wavelength range [{}, {}] nm is empty or inverted",
                min, max
            )));
        }
        if !(bin_width.is_finite() && bin_width > 0.0) {
            return Err(CascadeError::Input(format!(
                "bin width {} nm must be positive",
                bin_width
            )));
        }
        // The small offset keeps eg 100 / 0.1 from truncating to 999 bins.
        let bins = ((max - min) / bin_width + 1e-9).floor().max(1.0);
        if bins > MAX_BINS as f64 {
            return Err(CascadeError::Input(format!(
                "bin width {} nm gives more than {} bins over [{}, {}] nm",
                bin_width, MAX_BINS, min, max
            )));
        }
        Ok(Histogram {
            min,
            max,
            counts: vec![0; bins as usize],
        })
    }

    /// True if the wavelength falls inside the closed range of the histogram.
    pub fn contains(&self, wavelength: f64) -> bool {
        self.min <= wavelength && wavelength <= self.max
    }

    /// Bin holding the wavelength, or `None` if it is out of range.
    pub fn bin_of(&self, wavelength: f64) -> Option<usize> {
        if !self.contains(wavelength) {
            return None;
        }
        let bins = self.counts.len();
        let bin = ((wavelength - self.min) / (self.max - self.min) * bins as f64) as usize;
        Some(bin.min(bins - 1))
    }

    /// Counts the wavelength if it is in range, returning whether it was counted.
    pub fn add(&mut self, wavelength: f64) -> bool {
        match self.bin_of(wavelength) {
            Some(bin) => {
                self.counts[bin] += 1;
                true
            }
            None => false,
        }
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all bin counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Left edge of each bin, in nm.
    pub fn left_edges(&self) -> Vec<f64> {
        let step = (self.max - self.min) / self.counts.len() as f64;
        (0..self.counts.len())
            .map(|i| self.min + i as f64 * step)
            .collect()
    }

    /// Adds the counts of another histogram over the same bins.
    pub fn merge(&mut self, other: &Histogram) {
        for (count, other) in self.counts.iter_mut().zip(other.counts.iter()) {
            *count += other;
        }
    }
}

/// The running totals of a set of cascades.
///
/// Only qualifying events, those whose wavelength lies in the histogram range, enter the
/// histogram and the tallies. Counts are raw; normalisation happens on output.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumAccumulator {
    histogram: Histogram,
    /// Qualifying events arriving in each state index.
    populations: HashMap<usize, u64>,
    /// Qualifying events for each `(source, destination)` pair of state indices.
    pathways: HashMap<(usize, usize), u64>,
    cascades: u64,
    transitions: u64,
}

impl SpectrumAccumulator {
    pub fn new(histogram: Histogram) -> Self {
        SpectrumAccumulator {
            histogram,
            populations: HashMap::new(),
            pathways: HashMap::new(),
            cascades: 0,
            transitions: 0,
        }
    }

    /// Records one step of a cascade. Returns true if the event qualified.
    pub fn record(&mut self, source: usize, destination: usize, wavelength: f64) -> bool {
        self.transitions += 1;
        if !self.histogram.add(wavelength) {
            return false;
        }
        *self.populations.entry(destination).or_insert(0) += 1;
        *self.pathways.entry((source, destination)).or_insert(0) += 1;
        true
    }

    /// Marks the end of a cascade.
    pub fn finish_cascade(&mut self) {
        self.cascades += 1;
    }

    /// Adds the totals of another accumulator with the same histogram bins.
    pub fn merge(&mut self, other: SpectrumAccumulator) {
        self.histogram.merge(&other.histogram);
        for (state, count) in other.populations {
            *self.populations.entry(state).or_insert(0) += count;
        }
        for (pair, count) in other.pathways {
            *self.pathways.entry(pair).or_insert(0) += count;
        }
        self.cascades += other.cascades;
        self.transitions += other.transitions;
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Number of cascades run to completion.
    pub fn cascades(&self) -> u64 {
        self.cascades
    }

    /// Number of transitions made, including those outside the wavelength range.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Number of events whose wavelength was in range.
    pub fn qualifying_events(&self) -> u64 {
        self.histogram.total()
    }

    /// Qualifying arrivals in state index `state`.
    pub fn population(&self, state: usize) -> u64 {
        self.populations.get(&state).copied().unwrap_or(0)
    }

    /// Qualifying transitions between state indices `source` and `destination`.
    pub fn pathway(&self, source: usize, destination: usize) -> u64 {
        self.pathways
            .get(&(source, destination))
            .copied()
            .unwrap_or(0)
    }

    /// Histogram counts divided by the number of requested cascades.
    pub fn normalised_counts(&self, iterations: u64) -> Vec<f64> {
        self.histogram
            .counts()
            .iter()
            .map(|&count| count as f64 / iterations as f64)
            .collect()
    }

    /// Converts the totals into a [Spectrum], labelling states from `table`.
    ///
    /// # Arguments
    ///
    /// `table`: the rate table the cascades ran on.
    ///
    /// `iterations`: the number of cascades requested, used to normalise the histogram.
    ///
    /// `emit_populations`, `emit_pathways`: whether to include the tallies.
    pub fn into_spectrum(
        self,
        table: &RateTable,
        iterations: u64,
        emit_populations: bool,
        emit_pathways: bool,
    ) -> Spectrum {
        let index = table.index();
        let populations = if emit_populations {
            let mut populations: Vec<StatePopulation> = self
                .populations
                .iter()
                .map(|(&state, &count)| StatePopulation {
                    state: index.state(state),
                    count,
                })
                .collect();
            populations.sort_by_key(|population| population.state);
            Some(populations)
        } else {
            None
        };
        let pathways = if emit_pathways {
            let mut pathways: Vec<PathwayCount> = self
                .pathways
                .iter()
                .map(|(&(source, destination), &count)| {
                    PathwayCount::new(index.state(source), index.state(destination), count)
                })
                .collect();
            pathways.sort_by_key(|pathway| (pathway.source, pathway.destination));
            Some(pathways)
        } else {
            None
        };
        Spectrum {
            bin_edges: self.histogram.left_edges(),
            intensities: self.normalised_counts(iterations),
            iterations,
            qualifying_events: self.qualifying_events(),
            populations,
            pathways,
        }
    }
}

/// Number of qualifying events that arrived in a state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatePopulation {
    pub state: AtomicState,
    pub count: u64,
}

/// Number of qualifying events for one transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayCount {
    pub source: AtomicState,
    pub destination: AtomicState,
    /// Spectroscopic label, eg `30D5/2 -> 6P3/2`.
    pub label: String,
    pub count: u64,
}

impl PathwayCount {
    pub fn new(source: AtomicState, destination: AtomicState, count: u64) -> Self {
        PathwayCount {
            source,
            destination,
            label: format!("{} -> {}", source, destination),
            count,
        }
    }
}

/// The result of a cascade simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Left edge of each wavelength bin, in nm.
    pub bin_edges: Vec<f64>,
    /// Photons emitted into each bin per cascade.
    pub intensities: Vec<f64>,
    /// Number of cascades requested.
    pub iterations: u64,
    /// Number of photons emitted inside the wavelength range.
    pub qualifying_events: u64,
    pub populations: Option<Vec<StatePopulation>>,
    pub pathways: Option<Vec<PathwayCount>>,
}
