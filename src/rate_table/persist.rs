//! Saving and loading rate tables as CSV files.
//!
//! The file starts with a metadata comment, followed by one record per state:
//!
//! ```text
//! # species=Cs n_max=80 l_max=5 temperature=350 absorbing_ground_state=true
//! n,l,j,rate_0,rate_1,...,rate_{S-1}
//! ```
//!
//! Records appear in [StateIndex](super::StateIndex) order, and the rate columns follow
//! the same order, so loading a file reproduces the indices it was saved with. Rates are
//! written in the shortest representation that parses back to the identical `f64`.

use super::{RateTable, TableMetadata};
use crate::atom::AtomicState;
use crate::error::CascadeError;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const METADATA_PREFIX: char = '#';

/// Formats a temperature for file names: `350` rather than `350.0`.
fn format_temperature(temperature: f64) -> String {
    if temperature.fract() == 0.0 {
        format!("{:.0}", temperature)
    } else {
        format!("{}", temperature)
    }
}

/// Canonical file name of a rate table, eg `Transition_Rates_nmax=80_temp=350K_Cs.csv`.
pub fn lut_file_name(species: &str, n_max: u32, temperature: f64) -> String {
    format!(
        "Transition_Rates_nmax={}_temp={}K_{}.csv",
        n_max,
        format_temperature(temperature),
        species
    )
}

fn format_metadata(metadata: &TableMetadata) -> String {
    format!(
        "{} species={} n_max={} l_max={} temperature={} absorbing_ground_state={}",
        METADATA_PREFIX,
        metadata.species,
        metadata.n_max,
        metadata.l_max,
        metadata.temperature,
        metadata.absorbing_ground_state
    )
}

fn parse_metadata(line: &str, path: &Path) -> Result<TableMetadata, CascadeError> {
    let malformed = |reason: String| CascadeError::MalformedTable {
        path: path.to_path_buf(),
        line: 1,
        reason,
    };
    let mut species = None;
    let mut n_max = None;
    let mut l_max = None;
    let mut temperature = None;
    let mut absorbing_ground_state = None;
    for field in line.trim_start_matches(METADATA_PREFIX).split_whitespace() {
        let (key, value) = field
            .split_once('=')
            .ok_or_else(|| malformed(format!("metadata field '{}' is not key=value", field)))?;
        let invalid =
            |error: String| malformed(format!("invalid value '{}' for {}: {}", value, key, error));
        match key {
            "species" => species = Some(value.to_string()),
            "n_max" => n_max = Some(value.parse::<u32>().map_err(|e| invalid(e.to_string()))?),
            "l_max" => l_max = Some(value.parse::<u32>().map_err(|e| invalid(e.to_string()))?),
            "temperature" => {
                temperature = Some(value.parse::<f64>().map_err(|e| invalid(e.to_string()))?)
            }
            "absorbing_ground_state" => {
                absorbing_ground_state =
                    Some(value.parse::<bool>().map_err(|e| invalid(e.to_string()))?)
            }
            _ => log::debug!("Ignoring unknown rate table metadata field {}", key),
        }
    }
    match (species, n_max, l_max, temperature) {
        (Some(species), Some(n_max), Some(l_max), Some(temperature)) => Ok(TableMetadata {
            species,
            n_max,
            l_max,
            temperature,
            absorbing_ground_state: absorbing_ground_state.unwrap_or(false),
        }),
        _ => Err(malformed(
            "metadata must contain species, n_max, l_max and temperature".to_string(),
        )),
    }
}

/// Reads `n` or `l` written either as an integer or as a float with an integral value,
/// eg `5.000000000000000000e+00` from numpy's `savetxt`.
fn parse_quantum_number(field: &str) -> Result<u32, String> {
    if let Ok(value) = field.parse::<u32>() {
        return Ok(value);
    }
    let value = field
        .parse::<f64>()
        .map_err(|e| format!("'{}': {}", field, e))?;
    if value.fract() != 0.0 || !(0.0..=u32::MAX as f64).contains(&value) {
        return Err(format!("'{}': not a non-negative integer", field));
    }
    Ok(value as u32)
}

/// Writes the table to `path`.
pub fn save(table: &RateTable, path: &Path) -> Result<(), CascadeError> {
    let mut writer = BufWriter::new(File::create(path)?);
    if let Some(metadata) = table.metadata() {
        writeln!(writer, "{}", format_metadata(metadata))?;
    }
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    let size = table.len();
    let mut record = Vec::with_capacity(size + 3);
    for (from, state) in table.states().iter().enumerate() {
        record.clear();
        record.push(state.n().to_string());
        record.push(state.l().to_string());
        record.push(state.j().to_string());
        for to in 0..size {
            record.push(format!("{:e}", table.rate(from, to)));
        }
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    log::info!("Saved rate table with {} states to {}", size, path.display());
    Ok(())
}

/// Writes the table into `directory` under its canonical [lut_file_name].
pub fn save_to_dir(table: &RateTable, directory: &Path) -> Result<PathBuf, CascadeError> {
    let metadata = table.metadata().ok_or_else(|| {
        CascadeError::Input("a table without metadata has no canonical file name".to_string())
    })?;
    let path = directory.join(lut_file_name(
        &metadata.species,
        metadata.n_max,
        metadata.temperature,
    ));
    save(table, &path)?;
    Ok(path)
}

/// Loads a table previously written by [save].
///
/// Files without a metadata line are accepted, but the resulting table cannot be
/// checked for consistency with a simulation.
pub fn load(path: &Path) -> Result<RateTable, CascadeError> {
    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;

    let metadata = match contents.lines().next() {
        Some(line) if line.starts_with(METADATA_PREFIX) => Some(parse_metadata(line, path)?),
        _ => {
            log::warn!("Rate table {} has no metadata line.", path.display());
            None
        }
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(METADATA_PREFIX as u8))
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let mut states = Vec::new();
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let malformed = |reason: String| CascadeError::MalformedTable {
            path: path.to_path_buf(),
            line,
            reason,
        };
        if record.len() < 3 {
            return Err(malformed(format!("expected n,l,j but found {} fields", record.len())));
        }
        let n = parse_quantum_number(&record[0])
            .map_err(|reason| malformed(format!("invalid n {}", reason)))?;
        let l = parse_quantum_number(&record[1])
            .map_err(|reason| malformed(format!("invalid l {}", reason)))?;
        let j = record[2]
            .parse::<f64>()
            .map_err(|e| malformed(format!("invalid j '{}': {}", &record[2], e)))?;
        let state = AtomicState::new(n, l, j).map_err(|e| malformed(e.to_string()))?;
        let row = record
            .iter()
            .skip(3)
            .map(|field| {
                field
                    .parse::<f64>()
                    .map_err(|e| malformed(format!("invalid rate '{}': {}", field, e)))
            })
            .collect::<Result<Vec<f64>, CascadeError>>()?;
        states.push(state);
        rows.push(row);
    }

    let table = RateTable::from_rows(states, &rows, metadata).map_err(|error| {
        CascadeError::MalformedTable {
            path: path.to_path_buf(),
            line: 0,
            reason: error.to_string(),
        }
    })?;
    log::info!("Loaded rate table with {} states from {}", table.len(), path.display());
    Ok(table)
}

/// Loads the table with the canonical file name for these inputs from `directory`.
pub fn load_from_dir(
    directory: &Path,
    species: &str,
    n_max: u32,
    temperature: f64,
) -> Result<RateTable, CascadeError> {
    let table = load(&directory.join(lut_file_name(species, n_max, temperature)))?;
    table.check_consistency(species, temperature, Some(n_max), None)?;
    Ok(table)
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::rate_table::builder::RateTableBuilder;
    use crate::species::QuantumDefectAtom;
    use std::fs;

    #[test]
    fn test_file_name() {
        assert_eq!(
            lut_file_name("Cs", 80, 350.0),
            "Transition_Rates_nmax=80_temp=350K_Cs.csv"
        );
        assert_eq!(
            lut_file_name("Rb87", 60, 77.5),
            "Transition_Rates_nmax=60_temp=77.5K_Rb87.csv"
        );
    }

    #[test]
    fn test_roundtrip_is_exact() {
        let rubidium = QuantumDefectAtom::rubidium87();
        let table = RateTableBuilder::new(&rubidium, 10, 3, 300.0).build().unwrap();
        let directory = tempfile::tempdir().unwrap();
        let path = save_to_dir(&table, directory.path()).unwrap();
        assert!(path.ends_with("Transition_Rates_nmax=10_temp=300K_Rb87.csv"));

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.states(), table.states());
        assert_eq!(loaded.rates(), table.rates());
        assert_eq!(loaded.metadata(), table.metadata());
        assert_eq!(loaded, table);

        let by_name = load_from_dir(directory.path(), "Rb87", 10, 300.0).unwrap();
        assert_eq!(by_name, table);
    }

    #[test]
    fn test_table_without_metadata() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("plain.csv");
        fs::write(&path, "5,0,0.5,0,0\n5,1,0.5,3.6e7,0\n").unwrap();
        let table = load(&path).unwrap();
        assert!(table.metadata().is_none());
        assert_eq!(table.rate(1, 0), 3.6e7);
        assert!(table.check_consistency("Cs", 1.0, Some(3), Some(1)).is_ok());
    }

    #[test]
    fn test_numpy_savetxt_table() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("Transition_Rates_nmax=5_temp=0K_Cs.csv");
        fs::write(
            &path,
            "5.000000000000000000e+00,0.000000000000000000e+00,5.000000000000000000e-01,\
             0.000000000000000000e+00,0.000000000000000000e+00\n\
             5.000000000000000000e+00,1.000000000000000000e+00,5.000000000000000000e-01,\
             3.600000000000000000e+07,0.000000000000000000e+00\n",
        )
        .unwrap();
        let table = load(&path).unwrap();
        assert!(table.metadata().is_none());
        assert_eq!(
            table.states(),
            &[
                AtomicState::new(5, 0, 0.5).unwrap(),
                AtomicState::new(5, 1, 0.5).unwrap()
            ][..]
        );
        assert_eq!(table.rate(1, 0), 3.6e7);
    }

    #[test]
    fn test_quantum_numbers_must_be_integral() {
        assert_eq!(parse_quantum_number("7"), Ok(7));
        assert_eq!(parse_quantum_number("3.000000000000000000e+00"), Ok(3));
        assert!(parse_quantum_number("2.5e+00").is_err());
        assert!(parse_quantum_number("-1.0e+00").is_err());
        assert!(parse_quantum_number("nan").is_err());
    }

    #[test]
    fn test_malformed_tables_are_rejected() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("bad.csv");

        fs::write(&path, "5,0,0.5,1.0\n").unwrap();
        assert!(matches!(load(&path), Err(CascadeError::MalformedTable { .. })));

        fs::write(&path, "5,0,0.7,0\n").unwrap();
        assert!(matches!(load(&path), Err(CascadeError::MalformedTable { .. })));

        fs::write(&path, "5,0,0.5,0,abc\n5,1,0.5,1,0\n").unwrap();
        assert!(matches!(load(&path), Err(CascadeError::MalformedTable { .. })));

        fs::write(&path, "# species=Cs n_max=oops\n5,0,0.5,0\n").unwrap();
        assert!(matches!(load(&path), Err(CascadeError::MalformedTable { .. })));
    }

    #[test]
    fn test_mismatched_directory_load() {
        let hydrogen = QuantumDefectAtom::hydrogen();
        let table = RateTableBuilder::new(&hydrogen, 4, 2, 300.0).build().unwrap();
        let directory = tempfile::tempdir().unwrap();
        let path = save_to_dir(&table, directory.path()).unwrap();
        let renamed = directory.path().join(lut_file_name("H", 4, 350.0));
        fs::rename(&path, &renamed).unwrap();
        assert!(matches!(
            load_from_dir(directory.path(), "H", 4, 350.0),
            Err(CascadeError::Consistency(_))
        ));
    }
}
