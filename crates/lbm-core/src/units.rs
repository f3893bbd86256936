//! Conversion between physical units and the lattice's own nondimensional
//! units (`h = dt = rho0 = T0 = M0 = 1`).
//!
//! Every physical input is divided by a characteristic scale built from five
//! base quantities (length, time, density, temperature, molar mass) before
//! it ever reaches a kernel in [`crate::collision`] or [`crate::streaming`].

/// The five base characteristic scales and the derived scales built from
/// them, used to move values between physical units and lattice units.
#[derive(Debug, Clone, Copy)]
pub struct UnitSystem {
    pub c_length: f64,
    pub c_time: f64,
    pub c_density: f64,
    pub c_temperature: f64,
    pub c_molar_mass: f64,
    pub c_mass: f64,
    pub c_force: f64,
    pub c_energy: f64,
    pub c_pressure: f64,
    pub c_molar: f64,
}

impl UnitSystem {
    /// Build the scale system from the five physical reference quantities:
    /// characteristic length `h_phys`, timestep `dt_phys`, reference density
    /// `rho0`, reference temperature `t0`, and molar mass `m0`, together with
    /// their lattice-unit counterparts (all equal to 1 by convention, but
    /// kept explicit so the ratio reads the same way the original derivation
    /// does).
    pub fn new(h_phys: f64, dt_phys: f64, rho0_phys: f64, t0_phys: f64, m0_phys: f64) -> Self {
        let c_length = h_phys / 1.0;
        let c_time = dt_phys / 1.0;
        let c_density = rho0_phys / 1.0;
        let c_temperature = t0_phys / 1.0;
        let c_molar_mass = m0_phys / 1.0;

        let c_mass = c_density * c_length.powi(3);
        let c_force = c_mass * c_length / (c_time * c_time);
        let c_energy = c_force * c_length;
        let c_pressure = c_force / (c_length * c_length);
        let c_molar = c_mass / c_molar_mass;

        Self {
            c_length,
            c_time,
            c_density,
            c_temperature,
            c_molar_mass,
            c_mass,
            c_force,
            c_energy,
            c_pressure,
            c_molar,
        }
    }

    #[inline]
    pub fn to_lattice(physical: f64, scale: f64) -> f64 {
        physical / scale
    }

    #[inline]
    pub fn to_physical(lattice: f64, scale: f64) -> f64 {
        lattice * scale
    }

    /// `p_atm`, `gas_const`, `stefan_boltzmann`, each converted to lattice
    /// units using this scale system.
    pub fn lattice_physical_constants(&self) -> PhysicalConstants {
        const P_ATM_REAL: f64 = 101_325.0;
        const GAS_CONST_REAL: f64 = 8.314;
        const SB_CONST_REAL: f64 = 5.67e-8;

        PhysicalConstants {
            p_atm: Self::to_lattice(P_ATM_REAL, self.c_pressure),
            gas_const: Self::to_lattice(GAS_CONST_REAL, self.c_energy / self.c_molar / self.c_temperature),
            stefan_boltzmann: Self::to_lattice(
                SB_CONST_REAL,
                self.c_energy / (self.c_time * self.c_length * self.c_length * self.c_temperature.powi(4)),
            ),
        }
    }
}

/// Universal constants, already converted into lattice units.
#[derive(Debug, Clone, Copy)]
pub struct PhysicalConstants {
    pub p_atm: f64,
    pub gas_const: f64,
    pub stefan_boltzmann: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_scales_are_self_consistent() {
        let u = UnitSystem::new(1e-5, 1e-7, 7000.0, 300.0, 0.056);
        assert!((u.c_mass - u.c_density * u.c_length.powi(3)).abs() < 1e-30);
        assert!((u.c_force - u.c_mass * u.c_length / u.c_time.powi(2)).abs() < 1e-20);
        assert!((u.c_pressure - u.c_force / u.c_length.powi(2)).abs() < 1e-10);
    }

    #[test]
    fn round_trip_to_lattice_and_back() {
        let scale = 1e-5;
        let physical = 3.2e-4;
        let lattice = UnitSystem::to_lattice(physical, scale);
        let back = UnitSystem::to_physical(lattice, scale);
        assert!((back - physical).abs() < 1e-18);
    }
}
