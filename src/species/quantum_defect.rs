//! Alkali and hydrogen atoms described by quantum defects.
//!
//! Binding energies follow the Rydberg-Ritz formula
//! `E = -h c R_M / (n - d(n))^2` with `d(n) = d0 + d2/(n-d0)^2 + d4/(n-d0)^4 + ...`.
//! Low-lying levels where the expansion is inaccurate are overridden by measured term values.
//! Transition rates use the Coulomb approximation for the radial matrix element.

use super::radial::RadialWavefunction;
use super::TransitionRateOracle;
use crate::atom::AtomicState;
use crate::constant::{
    AMU, BOHR_RADIUS, C, ELECTRON_CHARGE, ELECTRON_MASS, EPSILON0, H, HBAR, PI, RYDBERG_INFINITY,
};
use crate::error::OracleError;
use crate::maths::{planck_occupation, wigner_6j};
use hashbrown::HashMap;
use std::sync::{Arc, RwLock};

/// Rydberg-Ritz coefficients `[d0, d2, d4, d6, d8]` for a single `(l, j)` series.
#[derive(Debug, Clone, Copy)]
pub struct DefectSeries {
    pub l: u32,
    pub twice_j: u32,
    pub coefficients: [f64; 5],
}

impl DefectSeries {
    const fn new(l: u32, twice_j: u32, coefficients: [f64; 5]) -> Self {
        DefectSeries {
            l,
            twice_j,
            coefficients,
        }
    }

    /// Quantum defect for principal quantum number `n`.
    pub fn defect(&self, n: u32) -> f64 {
        let [d0, d2, d4, d6, d8] = self.coefficients;
        let inverse_square = 1.0 / (n as f64 - d0).powi(2);
        d0 + inverse_square * (d2 + inverse_square * (d4 + inverse_square * (d6 + inverse_square * d8)))
    }
}

/// Measured term value of a low-lying level, in cm^-1 above the ground state.
#[derive(Debug, Clone, Copy)]
pub struct MeasuredLevel {
    pub n: u32,
    pub l: u32,
    pub twice_j: u32,
    pub term: f64,
}

const fn level(n: u32, l: u32, twice_j: u32, term: f64) -> MeasuredLevel {
    MeasuredLevel {
        n,
        l,
        twice_j,
        term,
    }
}

/// Quantum defects for 133Cs. [Weber & Sansonetti, PRA 35, 4650 (1987); Goy et al., PRA 26, 2733 (1982)]
const CAESIUM_DEFECTS: [DefectSeries; 8] = [
    DefectSeries::new(0, 1, [4.049_356_65, 0.237_703_7, 0.255_401, 0.003_78, 0.254_86]),
    DefectSeries::new(1, 1, [3.591_589_50, 0.360_926, 0.419_05, 0.643_88, 1.450_35]),
    DefectSeries::new(1, 3, [3.558_959_9, 0.392_469, -0.674_31, 22.353_1, -92.289]),
    DefectSeries::new(2, 3, [2.475_456_2, 0.009_320, -0.434_98, -0.763_58, -18.006_1]),
    DefectSeries::new(2, 5, [2.466_314_4, 0.014_964, -0.458_28, -0.254_89, -19.622_4]),
    DefectSeries::new(3, 5, [0.033_414_24, -0.198_674, 0.289_53, -0.260_1, 0.0]),
    DefectSeries::new(3, 7, [0.033_537, -0.191, 0.0, 0.0, 0.0]),
    DefectSeries::new(4, 7, [0.007_038_65, -0.049_252, 0.012_91, 0.0, 0.0]),
];

/// Low-lying levels of 133Cs from the NIST atomic spectra database.
const CAESIUM_LEVELS: [MeasuredLevel; 13] = [
    level(6, 0, 1, 0.0),
    level(6, 1, 1, 11_178.268),
    level(6, 1, 3, 11_732.307),
    level(5, 2, 3, 14_499.258),
    level(5, 2, 5, 14_596.842),
    level(7, 0, 1, 18_535.529),
    level(7, 1, 1, 21_765.348),
    level(7, 1, 3, 21_946.397),
    level(6, 2, 3, 22_588.821),
    level(6, 2, 5, 22_631.686),
    level(8, 0, 1, 24_317.149),
    level(4, 3, 5, 24_472.043),
    level(4, 3, 7, 24_471.978),
];

/// Quantum defects for 87Rb. [Li et al., PRA 67, 052502 (2003); Han et al., PRA 74, 054502 (2006)]
const RUBIDIUM_DEFECTS: [DefectSeries; 7] = [
    DefectSeries::new(0, 1, [3.131_180_4, 0.178_4, 0.0, 0.0, 0.0]),
    DefectSeries::new(1, 1, [2.654_884_9, 0.290_0, 0.0, 0.0, 0.0]),
    DefectSeries::new(1, 3, [2.641_673_7, 0.295_0, 0.0, 0.0, 0.0]),
    DefectSeries::new(2, 3, [1.348_091_71, -0.602_86, 0.0, 0.0, 0.0]),
    DefectSeries::new(2, 5, [1.346_465_72, -0.596_00, 0.0, 0.0, 0.0]),
    DefectSeries::new(3, 5, [0.016_519_2, -0.085, 0.0, 0.0, 0.0]),
    DefectSeries::new(3, 7, [0.016_543_7, -0.086, 0.0, 0.0, 0.0]),
];

/// Low-lying levels of 87Rb from the NIST atomic spectra database.
const RUBIDIUM_LEVELS: [MeasuredLevel; 13] = [
    level(5, 0, 1, 0.0),
    level(5, 1, 1, 12_578.950),
    level(5, 1, 3, 12_816.545),
    level(4, 2, 5, 19_355.203),
    level(4, 2, 3, 19_355.649),
    level(6, 0, 1, 20_132.510),
    level(6, 1, 1, 23_715.081),
    level(6, 1, 3, 23_792.591),
    level(5, 2, 3, 25_703.498),
    level(5, 2, 5, 25_700.536),
    level(7, 0, 1, 26_311.437),
    level(4, 3, 7, 26_792.092),
    level(4, 3, 5, 26_792.118),
];

/// A one-electron atom described by quantum defects.
///
/// Radial wavefunctions are cached per state, so a single instance can be shared by
/// all threads building a rate table.
pub struct QuantumDefectAtom {
    name: &'static str,
    /// Rydberg constant corrected for the reduced mass, in 1/m.
    rydberg_constant: f64,
    /// Ionisation limit measured from the ground state, in 1/m.
    ionisation_limit: f64,
    ground_state: AtomicState,
    /// Lowest principal quantum number for `l = 0, 1, 2, ...`; `l + 1` beyond the list.
    lowest_principal: &'static [u32],
    defects: &'static [DefectSeries],
    levels: &'static [MeasuredLevel],
    wavefunctions: RwLock<HashMap<AtomicState, Arc<RadialWavefunction>>>,
}

impl QuantumDefectAtom {
    fn create(
        name: &'static str,
        mass_amu: f64,
        ionisation_limit_per_cm: f64,
        ground_state: AtomicState,
        lowest_principal: &'static [u32],
        defects: &'static [DefectSeries],
        levels: &'static [MeasuredLevel],
    ) -> Self {
        QuantumDefectAtom {
            name,
            rydberg_constant: RYDBERG_INFINITY / (1.0 + ELECTRON_MASS / (mass_amu * AMU)),
            ionisation_limit: ionisation_limit_per_cm * 100.0,
            ground_state,
            lowest_principal,
            defects,
            levels,
            wavefunctions: RwLock::new(HashMap::new()),
        }
    }

    /// Caesium 133.
    pub fn caesium() -> Self {
        Self::create(
            "Cs",
            132.905_451_961,
            31_406.467_732_5,
            AtomicState::from_parts(6, 0, 1),
            &[6, 6, 5, 4],
            &CAESIUM_DEFECTS,
            &CAESIUM_LEVELS,
        )
    }

    /// Rubidium 87.
    pub fn rubidium87() -> Self {
        Self::create(
            "Rb87",
            86.909_180_527,
            33_690.946_44,
            AtomicState::from_parts(5, 0, 1),
            &[5, 5, 4, 4],
            &RUBIDIUM_DEFECTS,
            &RUBIDIUM_LEVELS,
        )
    }

    /// Hydrogen, without fine structure splitting.
    pub fn hydrogen() -> Self {
        let mass = 1.007_825_032;
        let rydberg = RYDBERG_INFINITY / (1.0 + ELECTRON_MASS / (mass * AMU));
        Self::create(
            "H",
            mass,
            rydberg / 100.0,
            AtomicState::from_parts(1, 0, 1),
            &[],
            &[],
            &[],
        )
    }

    fn check_supported(&self, state: &AtomicState) -> Result<(), OracleError> {
        if state.n() < TransitionRateOracle::lowest_principal(self, state.l()) {
            return Err(OracleError::UnsupportedState(*state));
        }
        Ok(())
    }

    /// Quantum defect of the state from the Rydberg-Ritz expansion; zero for series
    /// without tabulated coefficients.
    pub fn quantum_defect(&self, state: &AtomicState) -> f64 {
        self.defects
            .iter()
            .find(|series| series.l == state.l() && series.twice_j == state.twice_j())
            .map(|series| series.defect(state.n()))
            .unwrap_or(0.0)
    }

    /// Binding energy of the state, as a wavenumber in 1/m.
    fn binding_wavenumber(&self, state: &AtomicState) -> Result<f64, OracleError> {
        self.check_supported(state)?;
        let measured = self.levels.iter().find(|level| {
            level.n == state.n() && level.l == state.l() && level.twice_j == state.twice_j()
        });
        let wavenumber = match measured {
            Some(level) => self.ionisation_limit - level.term * 100.0,
            None => {
                let n_star = state.n() as f64 - self.quantum_defect(state);
                self.rydberg_constant / (n_star * n_star)
            }
        };
        if !(wavenumber.is_finite() && wavenumber > 0.0) {
            return Err(OracleError::Numerical {
                state: *state,
                reason: format!("binding energy {} 1/m is not positive", wavenumber),
            });
        }
        Ok(wavenumber)
    }

    /// Effective principal quantum number `n*`, consistent with the energy of the state.
    pub fn effective_principal(&self, state: &AtomicState) -> Result<f64, OracleError> {
        Ok((self.rydberg_constant / self.binding_wavenumber(state)?).sqrt())
    }

    fn wavefunction(&self, state: &AtomicState) -> Result<Arc<RadialWavefunction>, OracleError> {
        if let Ok(cache) = self.wavefunctions.read() {
            if let Some(wavefunction) = cache.get(state) {
                return Ok(Arc::clone(wavefunction));
            }
        }
        let n_star = self.effective_principal(state)?;
        let wavefunction = Arc::new(RadialWavefunction::coulomb(n_star, state.l()).map_err(
            |reason| OracleError::Numerical {
                state: *state,
                reason,
            },
        )?);
        if let Ok(mut cache) = self.wavefunctions.write() {
            cache.insert(*state, Arc::clone(&wavefunction));
        }
        Ok(wavefunction)
    }

    /// Line strength `|<a||er||b>|^2` of the transition, in SI units of (C m)^2.
    pub fn line_strength(&self, a: &AtomicState, b: &AtomicState) -> Result<f64, OracleError> {
        let radial = self
            .wavefunction(a)?
            .radial_matrix_element(&*self.wavefunction(b)?)
            * BOHR_RADIUS
            * ELECTRON_CHARGE;
        let angular = wigner_6j(
            2 * a.l(),
            a.twice_j(),
            1,
            b.twice_j(),
            2 * b.l(),
            2,
        );
        let degeneracy = (a.twice_j() as f64 + 1.0) * (b.twice_j() as f64 + 1.0);
        Ok(degeneracy * angular * angular * a.l().max(b.l()) as f64 * radial * radial)
    }
}

impl TransitionRateOracle for QuantumDefectAtom {
    fn name(&self) -> &str {
        self.name
    }

    fn is_dipole_allowed(&self, a: &AtomicState, b: &AtomicState) -> bool {
        let delta_l = (a.l() as i64 - b.l() as i64).abs();
        let delta_twice_j = (a.twice_j() as i64 - b.twice_j() as i64).abs();
        delta_l == 1
            && delta_twice_j <= 2
            && self.check_supported(a).is_ok()
            && self.check_supported(b).is_ok()
    }

    fn transition_rate(
        &self,
        from: &AtomicState,
        to: &AtomicState,
        temperature: f64,
    ) -> Result<f64, OracleError> {
        if !self.is_dipole_allowed(from, to) {
            return Err(OracleError::ForbiddenTransition(*from, *to));
        }
        let energy_from = self.energy(from)?;
        let energy_to = self.energy(to)?;
        let omega = (energy_from - energy_to).abs() / HBAR;
        if omega == 0.0 {
            return Ok(0.0);
        }
        let mut occupation = planck_occupation(omega, temperature);
        if energy_from > energy_to {
            occupation += 1.0;
        }
        let strength = self.line_strength(from, to)?;
        let rate = omega.powi(3) * strength * occupation
            / (3.0 * PI * EPSILON0 * HBAR * C.powi(3) * (from.twice_j() as f64 + 1.0));
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(OracleError::Numerical {
                state: *from,
                reason: format!("transition rate to {} evaluated to {}", to, rate),
            });
        }
        Ok(rate)
    }

    fn energy(&self, state: &AtomicState) -> Result<f64, OracleError> {
        Ok(-H * C * self.binding_wavenumber(state)?)
    }

    fn lowest_principal(&self, l: u32) -> u32 {
        self.lowest_principal
            .get(l as usize)
            .copied()
            .unwrap_or(l + 1)
            .max(l + 1)
    }

    fn ground_state(&self) -> Option<AtomicState> {
        Some(self.ground_state)
    }
}
