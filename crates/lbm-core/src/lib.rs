//! Thermal-hydrodynamic free-surface lattice Boltzmann solver for laser
//! powder-bed fusion melt pools.
//!
//! A D3Q19 BGK momentum population and a double-distribution enthalpy
//! population are advanced together; the free surface between metal and
//! shielding gas is tracked with a VOF-style mass fraction and a four-phase
//! classification (`Liquid`, `Gas`, `Lg`, `Wall`). All solver-internal state
//! lives in lattice units (`h = dt = rho0 = T0 = M0 = 1`); conversion to and
//! from physical units happens only at the [`config`] and [`snapshot`]
//! boundaries.
//!
//! [`solver::Solver`] is the entry point: build one from a [`config::SimConfig`]
//! and call [`solver::Solver::step`] in a loop.

pub mod collision;
pub mod config;
pub mod equilibria;
pub mod error;
pub mod field;
pub mod geometry;
pub mod laser;
pub mod lattice;
pub mod macros;
pub mod reinit;
pub mod snapshot;
pub mod solver;
pub mod sources;
pub mod streaming;
pub mod units;

pub use config::{PhysicalParams, SimConfig};
pub use error::ConfigError;
pub use field::{FieldStore, Phase};
pub use snapshot::{build_snapshot, CellSnapshot, Snapshot};
pub use solver::Solver;
