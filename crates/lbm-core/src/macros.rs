//! Macro reductions (C5): density, enthalpy, temperature, VOF, and velocity
//! derived each step from the distributions, phase, and mass fields.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::PhysicalParams;
use crate::field::{FieldStore, Phase};
use crate::lattice::{Q, VELOCITIES};

/// Lattice timestep; fixed at 1 by the nondimensionalization in
/// [`crate::units`].
const DT: f64 = 1.0;

/// `T(enthalpy)`: a piecewise map with a latent-heat plateau between
/// `enthalpy_s` and `enthalpy_l`. Monotone non-decreasing and continuous at
/// both breakpoints by construction.
#[inline]
pub fn temperature_from_enthalpy(params: &PhysicalParams, enthalpy: f64) -> f64 {
    let cp = params.heat_capacity;
    if enthalpy < params.enthalpy_s {
        enthalpy / cp
    } else if enthalpy < params.enthalpy_l {
        params.t_solidus
            + (enthalpy - params.enthalpy_s) / (params.enthalpy_l - params.enthalpy_s)
                * (params.t_liquidus - params.t_solidus)
    } else {
        params.t_liquidus + (enthalpy - params.enthalpy_l) / cp
    }
}

#[inline]
fn macro_at(store: &FieldStore, params: &PhysicalParams, idx: usize) -> (f64, f64, f64, f64) {
    let rho: f64 = store.f[idx].iter().sum();
    let enthalpy: f64 = store.h[idx].iter().sum();
    let t = temperature_from_enthalpy(params, enthalpy);
    let vof = match store.phase[idx] {
        Phase::Liquid => rho,
        Phase::Lg => store.mass[idx],
        Phase::Gas => 0.0,
        Phase::Wall => params.rho0,
    };
    (rho, enthalpy, t, vof)
}

/// Recomputes `rho`, `enthalpy`, `temperature`, and `vof` for every cell from
/// the current distributions, phase, and mass.
pub fn compute_macros(store: &mut FieldStore, params: &PhysicalParams) {
    let n = store.len();

    #[cfg(feature = "parallel")]
    let results: Vec<(f64, f64, f64, f64)> = (0..n)
        .into_par_iter()
        .map(|idx| macro_at(store, params, idx))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results: Vec<(f64, f64, f64, f64)> = (0..n).map(|idx| macro_at(store, params, idx)).collect();

    for (idx, (rho, enthalpy, t, vof)) in results.into_iter().enumerate() {
        store.rho[idx] = rho;
        store.enthalpy[idx] = enthalpy;
        store.temperature[idx] = t;
        store.vof[idx] = vof;
    }
}

#[inline]
fn velocity_at(store: &FieldStore, params: &PhysicalParams, force: &[[f64; 3]], idx: usize) -> [f64; 3] {
    const M: f64 = 0.5;
    let rho = store.rho[idx];
    if rho == 0.0 || store.temperature[idx] < params.t_solidus {
        return [0.0; 3];
    }
    let mut momentum = [0.0; 3];
    for q in 0..Q {
        let e = VELOCITIES[q];
        let f = store.f[idx][q];
        momentum[0] += f * e[0] as f64;
        momentum[1] += f * e[1] as f64;
        momentum[2] += f * e[2] as f64;
    }
    [
        (momentum[0] + DT * M * force[idx][0]) / rho,
        (momentum[1] + DT * M * force[idx][1]) / rho,
        (momentum[2] + DT * M * force[idx][2]) / rho,
    ]
}

/// Recomputes `u` with the Guo half-step force correction. Zeroed where
/// `rho == 0` (vacuum) or `T < T_solidus` (solid freeze).
pub fn compute_velocity(store: &mut FieldStore, params: &PhysicalParams, force: &[[f64; 3]]) {
    let n = store.len();

    #[cfg(feature = "parallel")]
    let u: Vec<[f64; 3]> = (0..n).into_par_iter().map(|idx| velocity_at(store, params, force, idx)).collect();

    #[cfg(not(feature = "parallel"))]
    let u: Vec<[f64; 3]> = (0..n).map(|idx| velocity_at(store, params, force, idx)).collect();

    store.u = u;
}
