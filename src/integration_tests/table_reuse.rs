//! A persisted table can be reloaded and reused by simulations without rebuilding it.

#[cfg(test)]
pub mod tests {
    use crate::atom::AtomicState;
    use crate::cascade::CascadeSimulator;
    use crate::configuration::CascadeConfig;
    use crate::error::CascadeError;
    use crate::rate_table::{persist, RateTableBuilder};
    use crate::species::{QuantumDefectAtom, SpeciesKind};

    #[test]
    fn reloaded_table_gives_identical_spectra() {
        let rubidium = QuantumDefectAtom::rubidium87();
        let table = RateTableBuilder::new(&rubidium, 11, 4, 300.0).build().unwrap();
        let directory = tempfile::tempdir().unwrap();
        persist::save_to_dir(&table, directory.path()).unwrap();
        let reloaded = persist::load_from_dir(directory.path(), "Rb87", 11, 300.0).unwrap();
        assert_eq!(reloaded.states(), table.states());
        assert_eq!(reloaded, table);

        let start = AtomicState::new(11, 3, 3.5).unwrap();
        let mut config =
            CascadeConfig::new(start, SpeciesKind::Rubidium87, 300.0, 3_000, (300.0, 3000.0), 2.0);
        config.seed = Some(42);
        config.emit_population_stats = true;
        config.emit_pathway_stats = true;

        let original = CascadeSimulator::new(&table, &rubidium)
            .unwrap()
            .run(&config)
            .unwrap();
        let repeated = CascadeSimulator::new(&reloaded, &rubidium)
            .unwrap()
            .run(&config)
            .unwrap();
        assert_eq!(original, repeated);
        assert!(original.qualifying_events > 0);

        // Different starting states reuse the same table.
        config.initial_state = AtomicState::new(10, 1, 0.5).unwrap();
        let other = CascadeSimulator::new(&reloaded, &rubidium)
            .unwrap()
            .run(&config)
            .unwrap();
        assert_ne!(other.intensities, original.intensities);
    }

    #[test]
    fn mismatched_simulation_is_rejected() {
        let rubidium = QuantumDefectAtom::rubidium87();
        let table = RateTableBuilder::new(&rubidium, 8, 2, 300.0).build().unwrap();
        let simulator = CascadeSimulator::new(&table, &rubidium).unwrap();
        let start = AtomicState::new(8, 2, 2.5).unwrap();

        let mut config =
            CascadeConfig::new(start, SpeciesKind::Rubidium87, 350.0, 10, (400.0, 800.0), 1.0);
        assert!(matches!(
            simulator.run(&config),
            Err(CascadeError::Consistency(_))
        ));

        config.temperature = 300.0;
        config.species = SpeciesKind::Caesium;
        assert!(matches!(
            simulator.run(&config),
            Err(CascadeError::Consistency(_))
        ));

        config.species = SpeciesKind::Rubidium87;
        config.n_max = Some(80);
        assert!(matches!(
            simulator.run(&config),
            Err(CascadeError::Consistency(_))
        ));

        config.n_max = Some(8);
        config.l_max = Some(4);
        assert!(matches!(
            simulator.run(&config),
            Err(CascadeError::Consistency(_))
        ));

        config.l_max = Some(2);
        assert!(simulator.run(&config).is_ok());
    }
}
