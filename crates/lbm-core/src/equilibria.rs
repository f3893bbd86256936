//! Equilibrium distributions and forcing terms for the momentum (`f`) and
//! enthalpy (`h`) populations.

use crate::lattice::{e_dot, CS2, Q, WEIGHTS};

/// Momentum equilibrium `f_eq(q; rho, u)`.
#[inline]
pub fn f_eq(q: usize, rho: f64, u: [f64; 3]) -> f64 {
    let eu = e_dot(q, u);
    let uu = u[0] * u[0] + u[1] * u[1] + u[2] * u[2];
    WEIGHTS[q] * rho * (1.0 + eu / CS2 + (eu * eu) / (2.0 * CS2 * CS2) - uu / (2.0 * CS2))
}

/// Enthalpy equilibrium `h_eq(q; enthalpy, T, u)`.
///
/// The `q == 0` case is split so that `sum_q h_eq(q) == enthalpy` exactly,
/// regardless of `T` and `u`.
#[inline]
pub fn h_eq(q: usize, enthalpy: f64, cp: f64, t: f64, u: [f64; 3]) -> f64 {
    let uu = u[0] * u[0] + u[1] * u[1] + u[2] * u[2];
    if q == 0 {
        enthalpy - cp * t + WEIGHTS[0] * cp * t * (1.0 - uu / (2.0 * CS2))
    } else {
        let eu = e_dot(q, u);
        WEIGHTS[q] * cp * t * (1.0 + eu / CS2 + (eu * eu) / (2.0 * CS2 * CS2) - uu / (2.0 * CS2))
    }
}

/// Guo momentum forcing, projected onto velocity `q`.
#[inline]
pub fn f_forcing(q: usize, u: [f64; 3], force: [f64; 3], tau_nu: f64) -> f64 {
    let e = crate::lattice::VELOCITIES[q];
    let e = [e[0] as f64, e[1] as f64, e[2] as f64];
    let eu = e[0] * u[0] + e[1] * u[1] + e[2] * u[2];
    let mut term = [0.0; 3];
    for k in 0..3 {
        term[k] = (e[k] - u[k]) / CS2 + (eu / (CS2 * CS2)) * e[k];
    }
    let dot = term[0] * force[0] + term[1] * force[1] + term[2] * force[2];
    (1.0 - 1.0 / (2.0 * tau_nu)) * WEIGHTS[q] * dot
}

/// Enthalpy forcing for a volumetric heat source `q_dot`, uniformly
/// projected across velocities.
#[inline]
pub fn h_forcing(q: usize, heat_source: f64, rho: f64) -> f64 {
    if rho <= 0.0 {
        return 0.0;
    }
    (heat_source / rho) * WEIGHTS[q]
}

/// All 19 momentum-equilibrium values for a cell, in one call.
pub fn f_eq_all(rho: f64, u: [f64; 3]) -> [f64; Q] {
    let mut out = [0.0; Q];
    for q in 0..Q {
        out[q] = f_eq(q, rho, u);
    }
    out
}

/// All 19 enthalpy-equilibrium values for a cell, in one call.
pub fn h_eq_all(enthalpy: f64, cp: f64, t: f64, u: [f64; 3]) -> [f64; Q] {
    let mut out = [0.0; Q];
    for q in 0..Q {
        out[q] = h_eq(q, enthalpy, cp, t, u);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f_eq_reduces_to_rho_at_rest() {
        let rho = 3.4;
        let sum: f64 = (0..Q).map(|q| f_eq(q, rho, [0.0; 3])).sum();
        assert!((sum - rho).abs() < 1e-10, "sum={sum}");
    }

    #[test]
    fn h_eq_sums_to_enthalpy_exactly() {
        let enthalpy = 12.5;
        let cp = 2.0;
        let t = 3.0;
        let u = [0.1, -0.05, 0.02];
        let sum: f64 = (0..Q).map(|q| h_eq(q, enthalpy, cp, t, u)).sum();
        assert!((sum - enthalpy).abs() < 1e-10, "sum={sum}, enthalpy={enthalpy}");
    }

    #[test]
    fn h_eq_sums_to_enthalpy_at_rest() {
        let enthalpy = 0.7;
        let sum: f64 = (0..Q).map(|q| h_eq(q, enthalpy, 1.0, 1.0, [0.0; 3])).sum();
        assert!((sum - enthalpy).abs() < 1e-12);
    }
}
