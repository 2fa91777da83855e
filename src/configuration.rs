//! Configuration of rate table builds and cascade simulations, loadable from YAML files.
//!
//! A simulation file looks like:
//!
//! ```yaml
//! initial_state: {n: 30, l: 2, j: 2.5}
//! species: Cs
//! temperature: 350.0
//! n_max: 80
//! l_max: 5
//! iterations: 50000
//! wavelength_range: {min: 400.0, max: 750.0}
//! bin_width: 0.5
//! emit_population_stats: true
//! emit_pathway_stats: false
//! seed: 7
//! ```

use crate::atom::AtomicState;
use crate::cascade::spectrum::Histogram;
use crate::error::CascadeError;
use crate::rate_table::RateTableBuilder;
use crate::species::{QuantumDefectAtom, SpeciesKind};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Number of cascades simulated by each parallel task.
pub const DEFAULT_CHUNK_SIZE: u64 = 1000;

/// A closed band of wavelengths, in nm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WavelengthRange {
    pub min: f64,
    pub max: f64,
}

fn default_true() -> bool {
    true
}

/// Inputs of one cascade simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeConfig {
    /// State every cascade starts from.
    pub initial_state: AtomicState,
    pub species: SpeciesKind,
    /// Temperature in Kelvin. Must equal the temperature the rate table was built at.
    pub temperature: f64,
    /// Principal number bound the rate table is expected to have been built with.
    #[serde(default)]
    pub n_max: Option<u32>,
    /// Orbital number bound the rate table is expected to have been built with.
    #[serde(default)]
    pub l_max: Option<u32>,
    /// Number of cascades to run.
    pub iterations: u64,
    pub wavelength_range: WavelengthRange,
    /// Width of the histogram bins, in nm.
    pub bin_width: f64,
    #[serde(default)]
    pub emit_population_stats: bool,
    #[serde(default)]
    pub emit_pathway_stats: bool,
    /// Seed of the random number generators. A random seed is drawn if absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub chunk_size: Option<u64>,
}

impl CascadeConfig {
    /// Creates a configuration with default options, binning from `min` to `max` nm.
    pub fn new(
        initial_state: AtomicState,
        species: SpeciesKind,
        temperature: f64,
        iterations: u64,
        wavelength_range: (f64, f64),
        bin_width: f64,
    ) -> Self {
        CascadeConfig {
            initial_state,
            species,
            temperature,
            n_max: None,
            l_max: None,
            iterations,
            wavelength_range: WavelengthRange {
                min: wavelength_range.0,
                max: wavelength_range.1,
            },
            bin_width,
            emit_population_stats: false,
            emit_pathway_stats: false,
            seed: None,
            chunk_size: None,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, CascadeError> {
        let config: CascadeConfig = serde_yaml::from_str(&read_file(path)?)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration without reference to a rate table.
    pub fn validate(&self) -> Result<(), CascadeError> {
        if self.iterations == 0 {
            return Err(CascadeError::Input(
                "iterations must be a positive integer".to_string(),
            ));
        }
        if !(self.temperature.is_finite() && self.temperature >= 0.0) {
            return Err(CascadeError::Input(format!(
                "temperature {} K must be finite and non-negative",
                self.temperature
            )));
        }
        if self.chunk_size == Some(0) {
            return Err(CascadeError::Input("chunk_size must be positive".to_string()));
        }
        self.histogram().map(|_| ())
    }

    /// An empty histogram with the configured range and bin width.
    pub fn histogram(&self) -> Result<Histogram, CascadeError> {
        Histogram::new(
            self.wavelength_range.min,
            self.wavelength_range.max,
            self.bin_width,
        )
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE)
    }
}

/// Inputs of a rate table build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    pub species: SpeciesKind,
    pub n_max: u32,
    pub l_max: u32,
    /// Temperature in Kelvin.
    pub temperature: f64,
    /// Zero the ground state row so that cascades end there.
    #[serde(default = "default_true")]
    pub absorbing_ground_state: bool,
    /// Directory the table is written to, under its canonical file name.
    #[serde(default)]
    pub output_directory: Option<PathBuf>,
}

impl TableConfig {
    /// Reads a table configuration. Bounds and temperature are checked by the builder.
    pub fn from_file(path: &Path) -> Result<Self, CascadeError> {
        Ok(serde_yaml::from_str(&read_file(path)?)?)
    }

    /// A builder for the configured table, computing rates with `oracle`.
    pub fn builder<'a>(
        &self,
        oracle: &'a QuantumDefectAtom,
    ) -> RateTableBuilder<'a, QuantumDefectAtom> {
        RateTableBuilder::new(oracle, self.n_max, self.l_max, self.temperature)
            .absorbing_ground_state(self.absorbing_ground_state)
    }
}

fn read_file(path: &Path) -> Result<String, CascadeError> {
    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;
    Ok(contents)
}
