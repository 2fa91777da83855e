//! Cascades through small tables whose outcome is known in advance.

#[cfg(test)]
pub mod tests {
    use crate::atom::AtomicState;
    use crate::cascade::tests::synthetic_table;
    use crate::cascade::CascadeSimulator;
    use crate::configuration::CascadeConfig;
    use crate::rate_table::RateTableBuilder;
    use crate::species::{QuantumDefectAtom, SpeciesKind, TransitionRateOracle};
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// A decays to B with rate 3 and to C with rate 1, B always decays to C.
    #[test]
    fn three_state_branching() {
        let (table, oracle) = synthetic_table(&[(0, 1, 3.0), (0, 2, 1.0), (1, 2, 5.0)]);
        let (a, b, c) = (
            table.index().state(0),
            table.index().state(1),
            table.index().state(2),
        );
        let simulator = CascadeSimulator::new(&table, &oracle).unwrap();
        let iterations = 10_000;

        let mut rng = StdRng::seed_from_u64(2024);
        let mut through_b = 0;
        for _ in 0..iterations {
            let events = simulator.sample_cascade(&a, &mut rng).unwrap();
            assert_eq!(events[0].source, a);
            if events[0].destination == b {
                assert_eq!(events.len(), 2);
                assert_eq!(events[1].destination, c);
                through_b += 1;
            } else {
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].destination, c);
            }
        }
        assert_approx_eq!(through_b as f64 / iterations as f64, 0.75, 0.02);

        // The window holds A -> B (500 nm) and B -> C (333 nm) but not A -> C (200 nm).
        let mut config = CascadeConfig::new(
            a,
            SpeciesKind::Hydrogen,
            0.0,
            iterations,
            (300.0, 600.0),
            0.5,
        );
        config.seed = Some(99);
        config.emit_pathway_stats = true;
        config.emit_population_stats = true;
        let spectrum = simulator.run(&config).unwrap();
        let pathways = spectrum.pathways.unwrap();
        assert_eq!(pathways.len(), 2);
        assert_eq!((pathways[0].source, pathways[0].destination), (a, b));
        assert_eq!((pathways[1].source, pathways[1].destination), (b, c));
        assert_eq!(pathways[0].count, pathways[1].count);
        assert_approx_eq!(pathways[0].count as f64 / iterations as f64, 0.75, 0.02);

        let populations = spectrum.populations.unwrap();
        assert_eq!(populations.len(), 2);
        assert_eq!(populations[0].state, b);
        assert_eq!(populations[1].state, c);

        let total: f64 = spectrum.intensities.iter().sum();
        assert_approx_eq!(total, 2.0 * pathways[0].count as f64 / iterations as f64, 1e-9);
    }

    /// In hydrogen at 0 K, 3D5/2 can only decay through 2P3/2, emitting Balmer alpha.
    #[test]
    fn hydrogen_balmer_alpha() {
        let hydrogen = QuantumDefectAtom::hydrogen();
        let table = RateTableBuilder::new(&hydrogen, 3, 2, 0.0).build().unwrap();
        let start = AtomicState::new(3, 2, 2.5).unwrap();
        let mut config =
            CascadeConfig::new(start, SpeciesKind::Hydrogen, 0.0, 2_000, (600.0, 700.0), 1.0);
        config.n_max = Some(3);
        config.seed = Some(1);
        config.emit_pathway_stats = true;
        let spectrum = crate::cascade::run(&table, &hydrogen, &config).unwrap();

        assert_eq!(spectrum.qualifying_events, 2_000);
        let bright: Vec<usize> = (0..spectrum.intensities.len())
            .filter(|&i| spectrum.intensities[i] > 0.0)
            .collect();
        assert_eq!(bright, vec![56]);
        assert_eq!(spectrum.bin_edges[56], 656.0);
        assert_eq!(spectrum.intensities[56], 1.0);

        let pathways = spectrum.pathways.unwrap();
        assert_eq!(pathways.len(), 1);
        assert_eq!(pathways[0].label, "3D5/2 -> 2P3/2");

        let simulator = CascadeSimulator::new(&table, &hydrogen).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let events = simulator.sample_cascade(&start, &mut rng).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].destination, AtomicState::new(1, 0, 0.5).unwrap());
        assert_approx_eq!(events[1].wavelength, 121.57, 0.01);
    }

    /// At room temperature every caesium cascade still ends in the ground state.
    #[test]
    fn caesium_cascades_reach_ground() {
        let caesium = QuantumDefectAtom::caesium();
        let table = RateTableBuilder::new(&caesium, 12, 3, 300.0).build().unwrap();
        let start = AtomicState::new(12, 2, 2.5).unwrap();
        let ground = caesium.ground_state().unwrap();
        let simulator = CascadeSimulator::new(&table, &caesium).unwrap();

        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            let events = simulator.sample_cascade(&start, &mut rng).unwrap();
            assert_eq!(events.last().unwrap().destination, ground);
        }

        let mut config =
            CascadeConfig::new(start, SpeciesKind::Caesium, 300.0, 5_000, (400.0, 1500.0), 1.0);
        config.n_max = Some(12);
        config.seed = Some(3);
        let spectrum = simulator.run(&config).unwrap();
        let d2 = caesium
            .transition_wavelength(&AtomicState::new(6, 1, 1.5).unwrap(), &ground)
            .unwrap()
            * 1e9;
        let bin = (d2 - 400.0).floor() as usize;
        assert!(spectrum.intensities[bin] > 0.0);
        assert_eq!(spectrum.iterations, 5_000);
    }
}
