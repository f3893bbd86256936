use crate::error::ConfigError;
use crate::lattice::CS2;
use crate::units::{PhysicalConstants, UnitSystem};

/// The laser's scan path: a polyline of waypoints in physical units, each
/// segment tagged with a constant power multiplier ("switch").
///
/// `switch.len()` must equal `x_pos.len() - 1`.
#[derive(Debug, Clone)]
pub struct LaserPathSpec {
    pub x_pos: Vec<f64>,
    pub y_pos: Vec<f64>,
    pub switch: Vec<f64>,
}

/// Every physical input the solver needs, in SI-like physical units, as
/// supplied by the caller. Parsing a config *file* into this struct is
/// outside this crate's scope; only in-memory validation and lattice-unit
/// conversion happen here.
pub struct SimConfig {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,

    /// Characteristic length (m).
    pub h: f64,
    /// Characteristic timestep (s).
    pub dt: f64,
    /// Reference density (kg/m^3).
    pub rho0: f64,
    /// Reference temperature (K).
    pub t0: f64,
    /// Reference molar mass (kg/mol).
    pub m0: f64,

    pub gravity: f64,
    pub dynamic_viscosity: f64,
    pub st_coeff: f64,
    pub st_grad_coeff: f64,
    pub rp_coeff: f64,

    pub laser_power: f64,
    pub beam_size: f64,
    pub absorbed_fraction: f64,
    pub scanning_vel: f64,

    pub heat_capacity: f64,
    pub thermal_diffusivity_l: f64,
    pub thermal_diffusivity_s: f64,
    pub emissivity: f64,
    pub h_conv: f64,
    pub latent_heat_fusion: f64,
    pub latent_heat_evap: f64,

    pub t_liquidus: f64,
    pub t_solidus: f64,
    pub t_evap: f64,
    pub enthalpy_s: f64,
    pub enthalpy_l: f64,

    pub laser_path: LaserPathSpec,
    pub output_interval: u32,

    /// If true, `h` is reset to an isothermal equilibrium above liquidus
    /// every step instead of evolving thermally (see driver step 1).
    pub fluid_only: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            nx: 32,
            ny: 32,
            nz: 32,
            h: 1e-5,
            dt: 1e-7,
            rho0: 7000.0,
            t0: 300.0,
            m0: 0.056,
            gravity: 9.81,
            dynamic_viscosity: 6e-3,
            st_coeff: 1.8,
            st_grad_coeff: -1e-4,
            rp_coeff: 0.55,
            laser_power: 200.0,
            beam_size: 5e-5,
            absorbed_fraction: 0.35,
            scanning_vel: 1.0,
            heat_capacity: 700.0,
            thermal_diffusivity_l: 6e-6,
            thermal_diffusivity_s: 8e-6,
            emissivity: 0.3,
            h_conv: 80.0,
            latent_heat_fusion: 2.7e5,
            latent_heat_evap: 6.1e6,
            t_liquidus: 1723.0,
            t_solidus: 1648.0,
            t_evap: 3086.0,
            enthalpy_s: 1648.0 * 700.0,
            enthalpy_l: 1648.0 * 700.0 + 2.7e5,
            laser_path: LaserPathSpec {
                x_pos: vec![0.0, 1e-3],
                y_pos: vec![0.0, 0.0],
                switch: vec![1.0],
            },
            output_interval: 100,
            fluid_only: false,
        }
    }
}

/// Every physical input converted to lattice units, plus the relaxation
/// times derived from the viscosity and diffusivities. This is what the
/// rest of the crate actually consumes; [`SimConfig`] never reaches a
/// kernel directly.
pub struct PhysicalParams {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,

    pub units: UnitSystem,
    pub constants: PhysicalConstants,

    pub rho0: f64,
    pub t0: f64,

    pub gravity: [f64; 3],
    pub tau_viscosity_nu: f64,
    pub st_coeff: f64,
    pub st_grad_coeff: f64,
    pub rp_coeff: f64,

    pub laser_power: f64,
    pub beam_size: f64,
    pub absorbed_fraction: f64,
    pub scanning_vel: f64,

    pub heat_capacity: f64,
    pub tau_diffusivity_l: f64,
    pub tau_diffusivity_s: f64,
    pub emissivity: f64,
    pub h_conv: f64,
    pub latent_heat_evap: f64,

    pub t_liquidus: f64,
    pub t_solidus: f64,
    pub t_evap: f64,
    pub enthalpy_s: f64,
    pub enthalpy_l: f64,

    pub laser_path: LaserPathSpec,
    pub output_interval: u32,
    pub fluid_only: bool,
}

impl SimConfig {
    /// Validate every field and convert to lattice units. See
    /// [`ConfigError`] for the taxonomy of rejected inputs; an
    /// out-of-range relaxation time is logged as a diagnostic, not
    /// rejected (it is a quality warning, not a malformed input).
    pub fn validate_and_convert(self) -> Result<PhysicalParams, ConfigError> {
        if self.nx == 0 || self.ny == 0 || self.nz == 0 {
            return Err(ConfigError::InvalidGrid {
                nx: self.nx,
                ny: self.ny,
                nz: self.nz,
            });
        }
        if self.enthalpy_l <= self.enthalpy_s || self.t_liquidus <= self.t_solidus {
            return Err(ConfigError::InvalidPhaseBounds {
                enthalpy_s: self.enthalpy_s,
                enthalpy_l: self.enthalpy_l,
                t_solidus: self.t_solidus,
                t_liquidus: self.t_liquidus,
            });
        }
        for (name, value) in [
            ("h", self.h),
            ("dt", self.dt),
            ("rho0", self.rho0),
            ("t0", self.t0),
            ("m0", self.m0),
            ("heat_capacity", self.heat_capacity),
            ("beam_size", self.beam_size),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(ConfigError::NonPhysicalValue { field: name, value });
            }
        }
        if self.laser_path.x_pos.len() != self.laser_path.y_pos.len() {
            return Err(ConfigError::MalformedLaserPath {
                reason: format!(
                    "x_pos has {} waypoints, y_pos has {}",
                    self.laser_path.x_pos.len(),
                    self.laser_path.y_pos.len()
                ),
            });
        }
        if self.laser_path.switch.len() + 1 != self.laser_path.x_pos.len() {
            return Err(ConfigError::MalformedLaserPath {
                reason: format!(
                    "switch has {} entries, expected {} (one per segment)",
                    self.laser_path.switch.len(),
                    self.laser_path.x_pos.len().saturating_sub(1)
                ),
            });
        }

        let units = UnitSystem::new(self.h, self.dt, self.rho0, self.t0, self.m0);
        let constants = units.lattice_physical_constants();

        let viscosity_nu = self.dynamic_viscosity / self.rho0;
        let viscosity_nu_lattice =
            UnitSystem::to_lattice(viscosity_nu, units.c_length * units.c_length / units.c_time);
        let tau_viscosity_nu = viscosity_nu_lattice / CS2 + 0.5;

        let diffusivity_to_lattice = |alpha: f64| -> f64 {
            let alpha_lattice =
                UnitSystem::to_lattice(alpha, units.c_length * units.c_length / units.c_time);
            alpha_lattice / CS2 + 0.5
        };
        let tau_diffusivity_l = diffusivity_to_lattice(self.thermal_diffusivity_l);
        let tau_diffusivity_s = diffusivity_to_lattice(self.thermal_diffusivity_s);

        if !(0.5..=1.0).contains(&tau_viscosity_nu) {
            log::warn!(
                "tau_viscosity_nu = {tau_viscosity_nu:.4} is outside the [0.5, 1.0] stability \
                 band; the simulation may develop oscillations"
            );
        }
        for (name, tau) in [
            ("tau_diffusivity_l", tau_diffusivity_l),
            ("tau_diffusivity_s", tau_diffusivity_s),
        ] {
            if !(0.5..=1.0).contains(&tau) {
                log::warn!("{name} = {tau:.4} is outside the [0.5, 1.0] stability band");
            }
        }

        let gravity_lattice =
            UnitSystem::to_lattice(self.gravity, units.c_length / (units.c_time * units.c_time));

        Ok(PhysicalParams {
            nx: self.nx,
            ny: self.ny,
            nz: self.nz,
            rho0: 1.0,
            t0: 1.0,
            gravity: [0.0, 0.0, -gravity_lattice],
            tau_viscosity_nu,
            st_coeff: UnitSystem::to_lattice(self.st_coeff, units.c_force / units.c_length),
            st_grad_coeff: UnitSystem::to_lattice(
                self.st_grad_coeff,
                units.c_force / (units.c_length * units.c_temperature),
            ),
            rp_coeff: self.rp_coeff,
            laser_power: UnitSystem::to_lattice(self.laser_power, units.c_energy / units.c_time),
            beam_size: UnitSystem::to_lattice(self.beam_size, units.c_length),
            absorbed_fraction: self.absorbed_fraction,
            scanning_vel: UnitSystem::to_lattice(self.scanning_vel, units.c_length / units.c_time),
            heat_capacity: UnitSystem::to_lattice(
                self.heat_capacity,
                units.c_energy / (units.c_mass * units.c_temperature),
            ),
            tau_diffusivity_l,
            tau_diffusivity_s,
            emissivity: self.emissivity,
            h_conv: UnitSystem::to_lattice(
                self.h_conv,
                units.c_energy / (units.c_time * units.c_length * units.c_length * units.c_temperature),
            ),
            latent_heat_evap: UnitSystem::to_lattice(self.latent_heat_evap, units.c_energy / units.c_mass),
            t_liquidus: UnitSystem::to_lattice(self.t_liquidus, units.c_temperature),
            t_solidus: UnitSystem::to_lattice(self.t_solidus, units.c_temperature),
            t_evap: UnitSystem::to_lattice(self.t_evap, units.c_temperature),
            enthalpy_s: UnitSystem::to_lattice(self.enthalpy_s, units.c_energy / units.c_mass),
            enthalpy_l: UnitSystem::to_lattice(self.enthalpy_l, units.c_energy / units.c_mass),
            laser_path: LaserPathSpec {
                x_pos: self
                    .laser_path
                    .x_pos
                    .iter()
                    .map(|&x| UnitSystem::to_lattice(x, units.c_length))
                    .collect(),
                y_pos: self
                    .laser_path
                    .y_pos
                    .iter()
                    .map(|&y| UnitSystem::to_lattice(y, units.c_length))
                    .collect(),
                switch: self.laser_path.switch.clone(),
            },
            output_interval: self.output_interval,
            fluid_only: self.fluid_only,
            units,
            constants,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_grid_extent() {
        let mut cfg = SimConfig::default();
        cfg.nx = 0;
        assert!(matches!(
            cfg.validate_and_convert(),
            Err(ConfigError::InvalidGrid { .. })
        ));
    }

    #[test]
    fn rejects_inverted_phase_bounds() {
        let mut cfg = SimConfig::default();
        cfg.enthalpy_l = cfg.enthalpy_s - 1.0;
        assert!(matches!(
            cfg.validate_and_convert(),
            Err(ConfigError::InvalidPhaseBounds { .. })
        ));
    }

    #[test]
    fn rejects_mismatched_laser_path() {
        let mut cfg = SimConfig::default();
        cfg.laser_path.switch = vec![1.0, 1.0];
        assert!(matches!(
            cfg.validate_and_convert(),
            Err(ConfigError::MalformedLaserPath { .. })
        ));
    }

    #[test]
    fn well_posed_config_converts_successfully() {
        let cfg = SimConfig::default();
        let params = cfg.validate_and_convert().expect("default config is valid");
        assert_eq!(params.nx, 32);
        assert!(params.tau_viscosity_nu > 0.0);
    }

    #[test]
    fn out_of_band_tau_does_not_abort_construction() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut cfg = SimConfig::default();
        cfg.dynamic_viscosity = 50.0;
        let params = cfg.validate_and_convert();
        assert!(params.is_ok(), "out-of-band tau is a diagnostic, not an error");
    }
}
