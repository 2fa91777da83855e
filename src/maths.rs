//! Mathematical utilities

use crate::constant::{BOLTZCONST, HBAR};

/// Natural log of `n!`.
pub fn ln_factorial(n: u32) -> f64 {
    (2..=n).map(|k| (k as f64).ln()).sum()
}

/// Returns true if the doubled angular momenta `(a, b, c)` satisfy the triangle rule.
fn triangle(a: u32, b: u32, c: u32) -> bool {
    (a + b + c) % 2 == 0 && c <= a + b && a <= b + c && b <= a + c
}

/// Log of the triangle coefficient Δ(abc), with doubled arguments.
fn ln_triangle_coefficient(a: u32, b: u32, c: u32) -> f64 {
    0.5 * (ln_factorial((a + b - c) / 2) + ln_factorial((a + c - b) / 2)
        + ln_factorial((b + c - a) / 2)
        - ln_factorial((a + b + c) / 2 + 1))
}

/// Wigner 6j symbol `{j1 j2 j3; j4 j5 j6}` evaluated with the Racah formula.
///
/// All arguments are doubled, so that half-integer momenta are represented exactly.
/// For example `wigner_6j(2, 1, 1, 1, 0, 2)` is `{1 1/2 1/2; 1/2 0 1}`.
pub fn wigner_6j(j1: u32, j2: u32, j3: u32, j4: u32, j5: u32, j6: u32) -> f64 {
    if !(triangle(j1, j2, j3)
        && triangle(j1, j5, j6)
        && triangle(j4, j2, j6)
        && triangle(j4, j5, j3))
    {
        return 0.0;
    }

    let a1 = (j1 + j2 + j3) / 2;
    let a2 = (j1 + j5 + j6) / 2;
    let a3 = (j4 + j2 + j6) / 2;
    let a4 = (j4 + j5 + j3) / 2;
    let b1 = (j1 + j2 + j4 + j5) / 2;
    let b2 = (j2 + j3 + j5 + j6) / 2;
    let b3 = (j3 + j1 + j6 + j4) / 2;

    let prefactor = ln_triangle_coefficient(j1, j2, j3)
        + ln_triangle_coefficient(j1, j5, j6)
        + ln_triangle_coefficient(j4, j2, j6)
        + ln_triangle_coefficient(j4, j5, j3);

    let t_min = a1.max(a2).max(a3).max(a4);
    let t_max = b1.min(b2).min(b3);
    let mut sum = 0.0;
    for t in t_min..=t_max {
        let ln_term = ln_factorial(t + 1)
            - ln_factorial(t - a1)
            - ln_factorial(t - a2)
            - ln_factorial(t - a3)
            - ln_factorial(t - a4)
            - ln_factorial(b1 - t)
            - ln_factorial(b2 - t)
            - ln_factorial(b3 - t);
        let sign = if t % 2 == 0 { 1.0 } else { -1.0 };
        sum += sign * (ln_term + prefactor).exp();
    }
    sum
}

/// Mean photon occupation of a thermal radiation mode.
///
/// # Arguments
///
/// `omega`: angular frequency of the mode, in rad/s.
///
/// `temperature`: temperature of the radiation field, in Kelvin.
pub fn planck_occupation(omega: f64, temperature: f64) -> f64 {
    if temperature <= 0.0 {
        return 0.0;
    }
    1.0 / (HBAR * omega / (BOLTZCONST * temperature)).exp_m1()
}
