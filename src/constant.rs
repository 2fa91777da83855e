/// Reduced plank constant in SI units
pub const HBAR: f64 = 1.054_571_817e-34;

/// Plank constant in SI units
pub const H: f64 = 6.626_070_15e-34;

/// Mathematica constant pi
pub const PI: f64 = std::f64::consts::PI;

/// Boltzmann constant in SI units
pub const BOLTZCONST: f64 = 1.380_649e-23;

/// Speed of light in SI units of m/s
pub const C: f64 = 299_792_458.0;

/// Elementary charge, in Coulombs.
pub const ELECTRON_CHARGE: f64 = 1.602_176_634e-19;

/// Vacuum permittivity in SI units of F/m.
pub const EPSILON0: f64 = 8.854_187_8128e-12;

/// Bohr radius, in metres.
pub const BOHR_RADIUS: f64 = 5.291_772_109_03e-11;

/// Electron mass, in kg.
pub const ELECTRON_MASS: f64 = 9.109_383_7015e-31;

/// The value of 1 Atomic Mass Unit (amu) in SI units of kg.
pub const AMU: f64 = 1.660_539_066_60e-27;

/// Rydberg constant for infinite nuclear mass, in units of 1/m.
pub const RYDBERG_INFINITY: f64 = 10_973_731.568_160;

/// Conversion from metres to nanometres.
pub const NM_PER_M: f64 = 1.0e9;
