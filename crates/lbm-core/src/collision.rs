//! BGK collision (C8) for both populations. Purely local: every cell reads
//! and writes only its own distributions, so no double buffering is needed
//! here (contrast [`crate::streaming`]).

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::PhysicalParams;
use crate::equilibria::{f_eq, f_forcing, h_eq, h_forcing};
use crate::field::{FieldStore, Phase};
use crate::lattice::{Q, WEIGHTS};

/// One BGK step for a single cell, returning its updated `(f, h)`.
///
/// Below `T_solidus` the momentum population is forced to the rest-state
/// equilibrium `w_q * rho` instead of relaxed — a solid cell cannot flow,
/// so there is nothing for it to relax toward. Enthalpy still relaxes,
/// using the solid relaxation time, so conduction through frozen metal
/// keeps working.
fn collide_values(store: &FieldStore, params: &PhysicalParams, idx: usize, force: [f64; 3], heat_source: f64) -> ([f64; Q], [f64; Q]) {
    let rho = store.rho[idx];
    let enthalpy = store.enthalpy[idx];
    let t = store.temperature[idx];
    let is_solid = t < params.t_solidus;
    let u = if is_solid { [0.0; 3] } else { store.u[idx] };
    let tau_h = if is_solid { params.tau_diffusivity_s } else { params.tau_diffusivity_l };

    let mut f = store.f[idx];
    if is_solid {
        for q in 0..Q {
            f[q] = WEIGHTS[q] * rho;
        }
    } else {
        let tau_nu = params.tau_viscosity_nu;
        for q in 0..Q {
            let feq = f_eq(q, rho, u);
            let forcing = f_forcing(q, u, force, tau_nu);
            f[q] += -(f[q] - feq) / tau_nu + forcing;
        }
    }

    let mut h = store.h[idx];
    for q in 0..Q {
        let heq = h_eq(q, enthalpy, params.heat_capacity, t, u);
        let forcing = h_forcing(q, heat_source, rho.max(1e-12));
        h[q] += -(h[q] - heq) / tau_h + forcing;
    }

    (f, h)
}

/// Collides a single fluid cell in place; a no-op on `Gas`/`Wall` cells.
pub fn collide_cell(store: &mut FieldStore, params: &PhysicalParams, idx: usize, force: [f64; 3], heat_source: f64) {
    if !store.phase[idx].is_fluid() {
        return;
    }
    let (f, h) = collide_values(store, params, idx, force, heat_source);
    store.f[idx] = f;
    store.h[idx] = h;
}

/// Collides every cell: fluid cells relax per [`collide_values`]; `Gas` and
/// `Wall` cells have both populations forced to zero, since they carry no
/// physical distribution and must not leak stale values into streaming's
/// boundary-condition formulas.
pub fn collide(store: &mut FieldStore, params: &PhysicalParams, force: &[[f64; 3]], heat_source: &[f64]) {
    let n = store.len();
    debug_assert_eq!(force.len(), n);
    debug_assert_eq!(heat_source.len(), n);

    let compute = |idx: usize| -> ([f64; Q], [f64; Q]) {
        if store.phase[idx].is_fluid() {
            collide_values(store, params, idx, force[idx], heat_source[idx])
        } else {
            ([0.0; Q], [0.0; Q])
        }
    };

    #[cfg(feature = "parallel")]
    let updates: Vec<([f64; Q], [f64; Q])> = (0..n).into_par_iter().map(compute).collect();
    #[cfg(not(feature = "parallel"))]
    let updates: Vec<([f64; Q], [f64; Q])> = (0..n).map(compute).collect();

    for (idx, (f, h)) in updates.into_iter().enumerate() {
        store.f[idx] = f;
        store.h[idx] = h;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::equilibria::f_eq_all;

    fn params() -> PhysicalParams {
        SimConfig::default().validate_and_convert().unwrap()
    }

    #[test]
    fn collision_is_a_no_op_at_equilibrium() {
        let p = params();
        let centroids = vec![[0.0; 3]; 1];
        let mut store = FieldStore::new(1, 1, 1, centroids);
        store.phase[0] = Phase::Liquid;
        let rho = 1.0;
        let u = [0.01, 0.0, 0.0];
        store.f[0] = f_eq_all(rho, u);
        store.rho[0] = rho;
        store.u[0] = u;
        store.enthalpy[0] = p.enthalpy_l + 1.0;
        store.temperature[0] = p.t_liquidus + 1.0;
        let before = store.f[0];
        collide_cell(&mut store, &p, 0, [0.0; 3], 0.0);
        for q in 0..Q {
            assert!((store.f[0][q] - before[q]).abs() < 1e-9, "q={q}");
        }
    }

    #[test]
    fn solid_cells_freeze_to_the_rest_state() {
        let p = params();
        let centroids = vec![[0.0; 3]; 1];
        let mut store = FieldStore::new(1, 1, 1, centroids);
        store.phase[0] = Phase::Liquid;
        store.f[0] = f_eq_all(1.0, [0.3, 0.0, 0.0]);
        store.rho[0] = 1.0;
        store.u[0] = [0.3, 0.0, 0.0];
        store.enthalpy[0] = p.enthalpy_s - 1.0;
        store.temperature[0] = p.t_solidus - 10.0;
        collide_cell(&mut store, &p, 0, [0.0; 3], 0.0);
        for q in 0..Q {
            assert!((store.f[0][q] - WEIGHTS[q]).abs() < 1e-12, "q={q}");
        }
    }

    #[test]
    fn gas_and_wall_cells_are_zeroed_by_the_full_pass() {
        let p = params();
        let centroids = vec![[0.0; 3]; 2];
        let mut store = FieldStore::new(1, 1, 2, centroids);
        store.phase[0] = Phase::Gas;
        store.phase[1] = Phase::Liquid;
        store.f[0] = f_eq_all(1.0, [0.0; 3]);
        store.rho[1] = 1.0;
        store.enthalpy[1] = p.enthalpy_l + 1.0;
        store.temperature[1] = p.t_liquidus + 1.0;
        store.f[1] = f_eq_all(1.0, [0.0; 3]);
        collide(&mut store, &p, &vec![[0.0; 3]; 2], &vec![0.0; 2]);
        assert_eq!(store.f[0], [0.0; Q]);
    }
}
