//! Radial wavefunctions in the Coulomb approximation.
//!
//! The radial equation for `u(r) = r R(r)` (atomic units, Coulomb core) is
//! integrated inwards with the Numerov method on the scaled coordinate `x = sqrt(r)`,
//! which spreads grid points evenly over the oscillations of a Rydberg wavefunction.
//! With `u = x^(1/2) X(x)` the equation becomes `X'' = g(x) X`, where
//!
//! `g(x) = -8 + 4 x^2 / n*^2 + (2l + 1/2)(2l + 3/2) / x^2`.

/// Grid spacing in `x = sqrt(r / a0)`.
pub const STEP: f64 = 0.01;

/// Value of the wavefunction at the outermost grid point before normalisation.
const SEED_AMPLITUDE: f64 = 1.0e-10;

/// A normalised radial wavefunction sampled on the grid `x_i = i * STEP`.
#[derive(Debug, Clone)]
pub struct RadialWavefunction {
    /// Grid index of the first stored point.
    first_index: usize,
    /// `X(x_i)` for `i = first_index, first_index + 1, ...`
    values: Vec<f64>,
}

impl RadialWavefunction {
    /// Integrates the Coulomb-approximation wavefunction with effective principal number
    /// `n_star` and orbital angular momentum `l`.
    pub fn coulomb(n_star: f64, l: u32) -> Result<Self, String> {
        if !(n_star.is_finite() && n_star > 0.0) {
            return Err(format!("effective principal number {} is not positive", n_star));
        }
        let l = l as f64;
        let centrifugal = (2.0 * l + 0.5) * (2.0 * l + 1.5);
        let g = |x: f64| -8.0 + 4.0 * x * x / (n_star * n_star) + centrifugal / (x * x);

        let r_outer = 2.0 * n_star * (n_star + 15.0);
        let last_index = (r_outer.sqrt() / STEP).ceil() as usize;
        if last_index < 3 {
            return Err("radial grid is too short".to_string());
        }

        // Integration below the inner turning point is stopped once the irregular
        // solution starts to dominate.
        let inner_turning = {
            let discriminant = (1.0 - l * (l + 1.0) / (n_star * n_star)).max(0.0);
            (n_star * n_star * (1.0 - discriminant.sqrt())).sqrt()
        };

        let h2 = STEP * STEP / 12.0;
        let mut reversed = Vec::with_capacity(last_index);
        reversed.push(SEED_AMPLITUDE);
        reversed.push(SEED_AMPLITUDE * (1.0 + STEP * g(last_index as f64 * STEP).max(0.0).sqrt()));

        let mut index = last_index - 1;
        while index > 1 {
            let x_next = (index + 1) as f64 * STEP;
            let x = index as f64 * STEP;
            let x_prev = (index - 1) as f64 * STEP;
            let y_next = reversed[reversed.len() - 2];
            let y = reversed[reversed.len() - 1];
            let y_prev = (2.0 * y * (1.0 + 5.0 * h2 * g(x)) - y_next * (1.0 - h2 * g(x_next)))
                / (1.0 - h2 * g(x_prev));

            if !y_prev.is_finite() {
                return Err(format!("wavefunction diverged at r = {:.3e} a0", x_prev * x_prev));
            }
            if x_prev < inner_turning && y_prev.abs() > y.abs() {
                break;
            }
            reversed.push(y_prev);
            index -= 1;
        }

        let first_index = last_index + 1 - reversed.len();
        reversed.reverse();
        let mut wavefunction = RadialWavefunction {
            first_index,
            values: reversed,
        };

        // Norm: integral of u^2 dr = integral of 2 x^2 X^2 dx
        let norm: f64 = wavefunction
            .points()
            .map(|(x, value)| 2.0 * x * x * value * value * STEP)
            .sum();
        if !(norm.is_finite() && norm > 0.0) {
            return Err("wavefunction could not be normalised".to_string());
        }
        let scale = 1.0 / norm.sqrt();
        for value in wavefunction.values.iter_mut() {
            *value *= scale;
        }
        Ok(wavefunction)
    }

    /// Iterates over `(x, X(x))` pairs.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(offset, &value)| ((self.first_index + offset) as f64 * STEP, value))
    }

    /// Radial matrix element `<self| r |other>`, in units of the Bohr radius.
    pub fn radial_matrix_element(&self, other: &RadialWavefunction) -> f64 {
        let start = self.first_index.max(other.first_index);
        let end = (self.first_index + self.values.len()).min(other.first_index + other.values.len());
        let mut sum = 0.0;
        for index in start..end {
            let x = index as f64 * STEP;
            let a = self.values[index - self.first_index];
            let b = other.values[index - other.first_index];
            // u1 u2 r dr = x^(1/2) X1 x^(1/2) X2 x^2 2x dx
            sum += 2.0 * x.powi(4) * a * b;
        }
        sum * STEP
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_hydrogen_radial_matrix_elements() {
        let s1 = RadialWavefunction::coulomb(1.0, 0).unwrap();
        let p2 = RadialWavefunction::coulomb(2.0, 1).unwrap();
        // <1s|r|2p> = 128 sqrt(6) / 243
        let expected = 128.0 * 6f64.sqrt() / 243.0;
        assert_approx_eq!(s1.radial_matrix_element(&p2).abs(), expected, 1e-3);
        assert_approx_eq!(p2.radial_matrix_element(&s1).abs(), expected, 1e-3);
    }

    #[test]
    fn test_expectation_value_of_r() {
        // <r> = (3 n^2 - l(l+1)) / 2 for hydrogen
        let wf = RadialWavefunction::coulomb(3.0, 1).unwrap();
        assert_approx_eq!(wf.radial_matrix_element(&wf), 12.5, 1e-2);
    }

    #[test]
    fn test_invalid_effective_number() {
        assert!(RadialWavefunction::coulomb(-1.0, 0).is_err());
        assert!(RadialWavefunction::coulomb(f64::NAN, 0).is_err());
    }
}
