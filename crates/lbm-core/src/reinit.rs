//! Free-surface phase reinitialization (C10): five local reclassification
//! rules applied in a fixed order, followed by a global mass fix-up.
//!
//! Every rule reads a snapshot of the phase field taken before the rule
//! runs and writes into the live field, so a rule never sees the
//! reclassifications it is itself producing — each rule is one synchronous
//! sweep, not a fixed-point iteration.

use crate::config::PhysicalParams;
use crate::equilibria::{f_eq_all, h_eq_all};
use crate::field::{FieldStore, Phase};
use crate::lattice::Q;

/// Fractional slack around `mass == rho` before an `Lg` cell is promoted to
/// fully `Liquid`, and around `mass == 0` before it drops to `Gas`.
const FILL_TOLERANCE: f64 = 1e-3;

/// Averages of `rho`, `u`, `enthalpy`, `T` over a cell's `Liquid`/`Lg`
/// neighbors, used to seed a newly promoted `Gas` cell.
struct NeighborAverage {
    rho: f64,
    u: [f64; 3],
    enthalpy: f64,
    temperature: f64,
}

fn fluid_neighbor_average(store: &FieldStore, snapshot: &[Phase], idx: usize) -> NeighborAverage {
    let mut rho = 0.0;
    let mut u = [0.0; 3];
    let mut enthalpy = 0.0;
    let mut temperature = 0.0;
    let mut count = 0.0;
    for q in 1..Q {
        let n = store.neighbor(idx, q);
        if matches!(snapshot[n], Phase::Liquid | Phase::Lg) {
            rho += store.rho[n];
            for k in 0..3 {
                u[k] += store.u[n][k];
            }
            enthalpy += store.enthalpy[n];
            temperature += store.temperature[n];
            count += 1.0;
        }
    }
    if count == 0.0 {
        return NeighborAverage { rho: 0.0, u: [0.0; 3], enthalpy: 0.0, temperature: 0.0 };
    }
    NeighborAverage {
        rho: rho / count,
        u: [u[0] / count, u[1] / count, u[2] / count],
        enthalpy: enthalpy / count,
        temperature: temperature / count,
    }
}

fn has_neighbor_with(store: &FieldStore, snapshot: &[Phase], idx: usize, pred: impl Fn(Phase) -> bool) -> bool {
    (1..Q).any(|q| pred(snapshot[store.neighbor(idx, q)]))
}

/// Rule 1: an `Lg` cell overfull beyond tolerance becomes `Liquid`.
pub fn lg_to_liquid(store: &mut FieldStore) {
    let snapshot = store.phase.clone();
    for idx in 0..store.len() {
        if snapshot[idx] == Phase::Lg && store.mass[idx] > store.rho[idx] * (1.0 + FILL_TOLERANCE) {
            store.phase[idx] = Phase::Liquid;
        }
    }
}

/// Rule 2: any `Gas` cell touching `Liquid` or `Lg` becomes `Lg`. Its macros
/// (`rho`, `u`, `enthalpy`, `T`) are seeded from the average over its fluid
/// neighbors, and `f`/`h` are set to the equilibria at those averages (not
/// to an average of the neighbors' own distributions) so the new interface
/// cell starts exactly at equilibrium rather than inheriting whatever
/// nonequilibrium part its neighbors happened to carry.
pub fn gas_to_lg(store: &mut FieldStore, params: &PhysicalParams) {
    let snapshot = store.phase.clone();
    let mut promoted = Vec::new();
    for idx in 0..store.len() {
        if snapshot[idx] == Phase::Gas && has_neighbor_with(store, &snapshot, idx, |p| matches!(p, Phase::Liquid | Phase::Lg)) {
            promoted.push(idx);
        }
    }
    for idx in promoted {
        let avg = fluid_neighbor_average(store, &snapshot, idx);
        store.rho[idx] = avg.rho;
        store.u[idx] = avg.u;
        store.enthalpy[idx] = avg.enthalpy;
        store.temperature[idx] = avg.temperature;
        store.f[idx] = f_eq_all(avg.rho, avg.u);
        store.h[idx] = h_eq_all(avg.enthalpy, params.heat_capacity, avg.temperature, avg.u);
        store.mass[idx] = 0.0;
        store.phase[idx] = Phase::Lg;
    }
}

/// Rule 3: an `Lg` cell emptied beyond tolerance becomes `Gas`.
pub fn lg_to_gas(store: &mut FieldStore) {
    let snapshot = store.phase.clone();
    for idx in 0..store.len() {
        if snapshot[idx] == Phase::Lg && store.mass[idx] < -store.rho[idx].abs().max(1.0) * FILL_TOLERANCE {
            store.phase[idx] = Phase::Gas;
            store.mass[idx] = 0.0;
        }
    }
}

/// Rule 4: a `Liquid` cell touching `Gas` becomes `Lg` (the interface layer
/// is always exactly one cell thick; bulk liquid never borders gas
/// directly).
pub fn liquid_to_lg(store: &mut FieldStore) {
    let snapshot = store.phase.clone();
    for idx in 0..store.len() {
        if snapshot[idx] == Phase::Liquid && has_neighbor_with(store, &snapshot, idx, |p| p == Phase::Gas) {
            store.mass[idx] = store.rho[idx];
            store.phase[idx] = Phase::Lg;
        }
    }
}

/// Rule 5: cleans up `Lg` cells the first four rules leave in an
/// inconsistent state — an `Lg` cell with no `Liquid`/`Lg` neighbor has
/// nothing to be an interface between and drops to `Gas`; an `Lg` cell with
/// no `Gas` neighbor is interior and is promoted to `Liquid`.
pub fn adhoc_cleanup(store: &mut FieldStore) {
    let snapshot = store.phase.clone();
    for idx in 0..store.len() {
        if snapshot[idx] != Phase::Lg {
            continue;
        }
        let touches_fluid = has_neighbor_with(store, &snapshot, idx, |p| matches!(p, Phase::Liquid | Phase::Lg));
        let touches_gas = has_neighbor_with(store, &snapshot, idx, |p| p == Phase::Gas);
        if !touches_fluid {
            store.phase[idx] = Phase::Gas;
            store.mass[idx] = 0.0;
        } else if !touches_gas {
            store.phase[idx] = Phase::Liquid;
        }
    }
}

/// Total conserved mass across the domain: full cell mass in `Liquid`, the
/// tracked fraction in `Lg`, nothing in `Gas`/`Wall`.
pub fn total_mass(store: &FieldStore) -> f64 {
    (0..store.len())
        .map(|idx| match store.phase[idx] {
            Phase::Liquid => store.rho[idx],
            Phase::Lg => store.mass[idx],
            Phase::Gas | Phase::Wall => 0.0,
        })
        .sum()
}

/// Rescales every `Lg` cell's mass by a uniform additive correction so the
/// domain total matches `target_mass` exactly, compensating for the
/// truncation error the five reclassification rules introduce.
pub fn fix_global_mass(store: &mut FieldStore, target_mass: f64) {
    let lg_cells: Vec<usize> = (0..store.len()).filter(|&i| store.phase[i] == Phase::Lg).collect();
    if lg_cells.is_empty() {
        return;
    }
    let current = total_mass(store);
    let deficit = target_mass - current;
    log::debug!("mass residual before fix-up: {deficit:.3e} over {} Lg cells", lg_cells.len());
    let correction = deficit / lg_cells.len() as f64;
    for idx in lg_cells {
        store.mass[idx] = (store.mass[idx] + correction).clamp(0.0, store.rho[idx].max(0.0) + 1e-9);
    }
}

/// Normalizes `mass`, `f`, `h` and `melted` for output: `Liquid` reports full
/// cell mass, `Gas`/`Wall` have `f`/`h`/`mass` zeroed (they carry no physical
/// population between reinitialization passes), and `melted` latches true
/// once a cell has ever reached `T_liquidus`.
pub fn refresh_for_output(store: &mut FieldStore, t_liquidus: f64) {
    for idx in 0..store.len() {
        match store.phase[idx] {
            Phase::Liquid => store.mass[idx] = store.rho[idx],
            Phase::Gas | Phase::Wall => {
                store.mass[idx] = 0.0;
                store.f[idx] = [0.0; Q];
                store.h[idx] = [0.0; Q];
            }
            Phase::Lg => {}
        }
        if store.temperature[idx] >= t_liquidus {
            store.melted[idx] = true;
        }
    }
}

/// Runs the full reinitialization pass: the four local rules in order,
/// the cleanup sweep, and the global mass fix-up against `target_mass`.
pub fn reinitialize(store: &mut FieldStore, params: &PhysicalParams, target_mass: f64) {
    lg_to_liquid(store);
    gas_to_lg(store, params);
    lg_to_gas(store);
    liquid_to_lg(store);
    adhoc_cleanup(store);
    fix_global_mass(store, target_mass);
}
