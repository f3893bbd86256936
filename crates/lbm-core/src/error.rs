use thiserror::Error;

/// Errors that can occur while validating a [`crate::config::SimConfig`] and
/// converting it into lattice units. All of these abort construction; there
/// are no recoverable errors once a [`crate::solver::Solver`] is running —
/// see the propagation policy in the crate-level docs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid extents must be non-zero, got ({nx}, {ny}, {nz})")]
    InvalidGrid { nx: usize, ny: usize, nz: usize },

    #[error(
        "phase-change bounds out of order: enthalpy_s={enthalpy_s}, enthalpy_l={enthalpy_l}, \
         T_solidus={t_solidus}, T_liquidus={t_liquidus}"
    )]
    InvalidPhaseBounds {
        enthalpy_s: f64,
        enthalpy_l: f64,
        t_solidus: f64,
        t_liquidus: f64,
    },

    #[error("field `{field}` must be a positive finite value, got {value}")]
    NonPhysicalValue { field: &'static str, value: f64 },

    #[error("laser path is malformed: {reason}")]
    MalformedLaserPath { reason: String },
}
