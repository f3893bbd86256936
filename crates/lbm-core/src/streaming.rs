//! Phase-aware streaming (C9): propagates post-collision populations along
//! the lattice velocities, applying bounce-back at walls and atmospheric
//! reconstruction at the free surface, and accumulates the free-surface
//! mass-flux bookkeeping.
//!
//! Streaming reads the whole of `f`/`h` (every neighbor) while writing
//! `f_next`/`h_next`, so it needs the double buffer in [`FieldStore`] — unlike
//! [`crate::collision`], which never looks past its own cell.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::PhysicalParams;
use crate::equilibria::{f_eq, h_eq};
use crate::field::{FieldStore, Phase};
use crate::lattice::{Q, REV};

/// Pulls `f[q]` and `h[q]` into cell `idx` from the upstream direction
/// `REV[q]` (i.e. from `x - e_q`), applying the boundary condition implied
/// by the upstream cell's phase.
fn pull_at(store: &FieldStore, params: &PhysicalParams, idx: usize, q: usize) -> (f64, f64) {
    if q == 0 {
        return (store.f[idx][0], store.h[idx][0]);
    }
    let upstream = store.neighbor(idx, REV[q]);
    match store.phase[upstream] {
        Phase::Wall => {
            let f = store.f[idx][REV[q]];
            let h_wall = h_eq(q, params.t0 * params.heat_capacity, params.heat_capacity, params.t0, [0.0; 3]);
            (f, h_wall)
        }
        Phase::Gas => {
            let rho_g = params.rho0;
            let u = store.u[idx];
            let f = f_eq(q, rho_g, u) + f_eq(REV[q], rho_g, u) - store.f[idx][REV[q]];
            let h = store.h[idx][REV[q]];
            (f, h)
        }
        Phase::Liquid | Phase::Lg => (store.f[upstream][q], store.h[upstream][q]),
    }
}

/// Free-surface mass flux accumulated by cell `idx` this step: the net
/// volume of `f` exchanged with fluid neighbors, counted at full weight
/// against `Liquid` neighbors and half weight against `Lg` neighbors (to
/// avoid double-counting interface-to-interface exchange once both cells
/// process the same pair).
fn mass_flux_at(store: &FieldStore, idx: usize) -> f64 {
    let mut delta = 0.0;
    for q in 1..Q {
        let downstream = store.neighbor(idx, q);
        let weight = match store.phase[downstream] {
            Phase::Liquid => 1.0,
            Phase::Lg => (store.vof[downstream] + store.vof[idx]) / 2.0,
            Phase::Gas | Phase::Wall => 0.0,
        };
        if weight == 0.0 {
            continue;
        }
        let f_in = store.f[downstream][REV[q]];
        let f_out = store.f[idx][q];
        delta += weight * (f_in - f_out);
    }
    delta
}

/// One full streaming step: writes `f_next`/`h_next`/`mass_next`, then swaps
/// all three buffers so the rest of the pipeline sees the streamed state as
/// the new "current" one.
pub fn stream_step(store: &mut FieldStore, params: &PhysicalParams) {
    let n = store.len();

    let compute_cell = |idx: usize| -> ([f64; Q], [f64; Q]) {
        let mut f = [0.0; Q];
        let mut h = [0.0; Q];
        if !store.phase[idx].is_fluid() {
            return (store.f[idx], store.h[idx]);
        }
        for q in 0..Q {
            let (fq, hq) = pull_at(store, params, idx, q);
            f[q] = fq;
            h[q] = hq;
        }
        (f, h)
    };

    #[cfg(feature = "parallel")]
    let streamed: Vec<([f64; Q], [f64; Q])> = (0..n).into_par_iter().map(compute_cell).collect();
    #[cfg(not(feature = "parallel"))]
    let streamed: Vec<([f64; Q], [f64; Q])> = (0..n).map(compute_cell).collect();

    for (idx, (f, h)) in streamed.into_iter().enumerate() {
        store.f_next[idx] = f;
        store.h_next[idx] = h;
    }

    let compute_mass = |idx: usize| -> f64 {
        if store.phase[idx] == Phase::Lg {
            store.mass[idx] + mass_flux_at(store, idx)
        } else {
            store.mass[idx]
        }
    };

    #[cfg(feature = "parallel")]
    let mass_next: Vec<f64> = (0..n).into_par_iter().map(compute_mass).collect();
    #[cfg(not(feature = "parallel"))]
    let mass_next: Vec<f64> = (0..n).map(compute_mass).collect();

    store.mass_next = mass_next;

    store.swap_f();
    store.swap_h();
    store.swap_mass();
}
