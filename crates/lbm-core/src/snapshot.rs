//! Output snapshots (C15): a plain-data record of the fields an external
//! consumer (visualization, checkpointing) cares about, decoupled from the
//! solver's internal double-buffered layout.

use crate::config::PhysicalParams;
use crate::field::{FieldStore, Phase};

/// Per-cell state exposed in a [`Snapshot`].
#[derive(Debug, Clone, Copy)]
pub struct CellSnapshot {
    pub phase: Phase,
    pub mass: f64,
    pub rho: f64,
    pub kappa: f64,
    pub u: [f64; 3],
    pub temperature: f64,
    pub melted: bool,
}

/// A full-domain snapshot taken at a given step, in physical units.
pub struct Snapshot {
    pub step: u64,
    pub cells: Vec<CellSnapshot>,
}

/// Builds a [`Snapshot`], converting temperature and velocity back to
/// physical units via `params.units`.
pub fn build_snapshot(store: &FieldStore, kappa: &[f64], params: &PhysicalParams, step: u64) -> Snapshot {
    let n = store.len();
    debug_assert_eq!(kappa.len(), n);

    let cells: Vec<CellSnapshot> = (0..n)
        .map(|idx| {
            let u_lattice = store.u[idx];
            let u_scale = params.units.c_length / params.units.c_time;
            CellSnapshot {
                phase: store.phase[idx],
                mass: store.mass[idx],
                rho: crate::units::UnitSystem::to_physical(store.rho[idx], params.units.c_density),
                kappa: kappa[idx],
                u: [u_lattice[0] * u_scale, u_lattice[1] * u_scale, u_lattice[2] * u_scale],
                temperature: crate::units::UnitSystem::to_physical(store.temperature[idx], params.units.c_temperature),
                melted: store.melted[idx],
            }
        })
        .collect();

    if let Some((hottest_idx, hottest)) = cells
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.temperature.total_cmp(&b.1.temperature))
    {
        let (x, y, z) = store.coords(hottest_idx);
        log::info!("snapshot at step {step}: max T = {:.1} K at ({x}, {y}, {z})", hottest.temperature);
    }

    Snapshot { step, cells }
}
