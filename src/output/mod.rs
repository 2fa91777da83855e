//! Writes the results of a cascade simulation to disk.
//!
//! The spectrum is written as a two column CSV of bin left edge and normalised intensity.
//! Populations and pathways, when present, are written to their own CSV files.

use crate::cascade::Spectrum;
use crate::error::CascadeError;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub const SPECTRUM_FILE: &str = "spectrum.csv";
pub const POPULATIONS_FILE: &str = "populations.csv";
pub const PATHWAYS_FILE: &str = "pathways.csv";
pub const JSON_FILE: &str = "spectrum.json";

/// Writes `wavelength_nm,intensity` records for every bin.
pub fn write_spectrum(spectrum: &Spectrum, path: &Path) -> Result<(), CascadeError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["wavelength_nm", "intensity"])?;
    for (edge, intensity) in spectrum.bin_edges.iter().zip(spectrum.intensities.iter()) {
        writer.write_record(&[edge.to_string(), intensity.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `n,l,j,count` records, one per state that received a qualifying photon.
///
/// Does nothing if the spectrum has no population data.
pub fn write_populations(spectrum: &Spectrum, path: &Path) -> Result<bool, CascadeError> {
    let populations = match &spectrum.populations {
        Some(populations) => populations,
        None => return Ok(false),
    };
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["n", "l", "j", "count"])?;
    for population in populations {
        let state = population.state;
        writer.write_record(&[
            state.n().to_string(),
            state.l().to_string(),
            state.j().to_string(),
            population.count.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(true)
}

/// Writes one record per transition that emitted a qualifying photon.
///
/// Does nothing if the spectrum has no pathway data.
pub fn write_pathways(spectrum: &Spectrum, path: &Path) -> Result<bool, CascadeError> {
    let pathways = match &spectrum.pathways {
        Some(pathways) => pathways,
        None => return Ok(false),
    };
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["pathway", "n1", "l1", "j1", "n2", "l2", "j2", "count"])?;
    for pathway in pathways {
        let (source, destination) = (pathway.source, pathway.destination);
        writer.write_record(&[
            pathway.label.clone(),
            source.n().to_string(),
            source.l().to_string(),
            source.j().to_string(),
            destination.n().to_string(),
            destination.l().to_string(),
            destination.j().to_string(),
            pathway.count.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(true)
}

/// Serialises the whole spectrum as JSON.
pub fn write_json(spectrum: &Spectrum, path: &Path) -> Result<(), CascadeError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, spectrum)?;
    Ok(())
}

/// Writes every available output into `directory`, returning the files created.
pub fn write_all(
    spectrum: &Spectrum,
    directory: &Path,
    json: bool,
) -> Result<Vec<PathBuf>, CascadeError> {
    std::fs::create_dir_all(directory)?;
    let mut written = Vec::new();

    let path = directory.join(SPECTRUM_FILE);
    write_spectrum(spectrum, &path)?;
    written.push(path);

    let path = directory.join(POPULATIONS_FILE);
    if write_populations(spectrum, &path)? {
        written.push(path);
    }
    let path = directory.join(PATHWAYS_FILE);
    if write_pathways(spectrum, &path)? {
        written.push(path);
    }
    if json {
        let path = directory.join(JSON_FILE);
        write_json(spectrum, &path)?;
        written.push(path);
    }
    for path in written.iter() {
        log::info!("Wrote {}", path.display());
    }
    Ok(written)
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::atom::AtomicState;
    use crate::cascade::{PathwayCount, StatePopulation};
    use std::fs;

    fn spectrum() -> Spectrum {
        let source = AtomicState::new(30, 2, 2.5).unwrap();
        let destination = AtomicState::new(6, 1, 1.5).unwrap();
        Spectrum {
            bin_edges: vec![400.0, 400.5],
            intensities: vec![0.25, 0.0],
            iterations: 4,
            qualifying_events: 1,
            populations: Some(vec![StatePopulation {
                state: destination,
                count: 1,
            }]),
            pathways: Some(vec![PathwayCount::new(source, destination, 1)]),
        }
    }

    #[test]
    fn test_write_all() {
        let directory = tempfile::tempdir().unwrap();
        let written = write_all(&spectrum(), directory.path(), true).unwrap();
        assert_eq!(written.len(), 4);

        let contents = fs::read_to_string(directory.path().join(SPECTRUM_FILE)).unwrap();
        assert_eq!(contents, "wavelength_nm,intensity\n400,0.25\n400.5,0\n");

        let contents = fs::read_to_string(directory.path().join(PATHWAYS_FILE)).unwrap();
        assert!(contents.contains("30D5/2 -> 6P3/2,30,2,2.5,6,1,1.5,1"));

        let json = fs::read_to_string(directory.path().join(JSON_FILE)).unwrap();
        let parsed: Spectrum = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, spectrum());
    }

    #[test]
    fn test_optional_outputs_are_skipped() {
        let mut spectrum = spectrum();
        spectrum.populations = None;
        spectrum.pathways = None;
        let directory = tempfile::tempdir().unwrap();
        let written = write_all(&spectrum, directory.path(), false).unwrap();
        assert_eq!(written, vec![directory.path().join(SPECTRUM_FILE)]);
        assert!(!directory.path().join(POPULATIONS_FILE).exists());
    }
}
