use lbm_core::config::{LaserPathSpec, SimConfig};
use lbm_core::field::Phase;
use lbm_core::reinit::total_mass;
use lbm_core::Solver;

/// All surface/body forces and the laser switched off, base grid only.
fn quiet_forces(nx: usize, ny: usize, nz: usize) -> SimConfig {
    SimConfig {
        nx,
        ny,
        nz,
        gravity: 0.0,
        st_coeff: 0.0,
        st_grad_coeff: 0.0,
        rp_coeff: 0.0,
        laser_power: 0.0,
        laser_path: LaserPathSpec {
            x_pos: vec![0.0, 1e-5],
            y_pos: vec![0.0, 0.0],
            switch: vec![0.0],
        },
        ..SimConfig::default()
    }
}

/// Same as [`quiet_forces`] but seeded molten (`t0` above `T_liquidus`, in
/// physical units, pushes the lattice-unit reference temperature above the
/// lattice-unit `T_liquidus`) so the momentum solver actually runs instead of
/// the collision stage's solid-freeze shortcut.
fn molten_quiet(nx: usize, ny: usize, nz: usize) -> SimConfig {
    SimConfig { t0: 1800.0, ..quiet_forces(nx, ny, nz) }
}

/// With every body/surface force off and the substrate molten, the fixed
/// point from §8's "boundary behaviors" should hold: `u` stays at zero and
/// the domain's total mass is unchanged.
#[test]
fn stationary_quiescent_fluid_stays_at_rest() {
    let cfg = molten_quiet(8, 8, 8);
    let mut solver = Solver::new(cfg).expect("valid config");

    let initial_mass = total_mass(solver.store());

    for _ in 0..100 {
        solver.step();
    }

    let store = solver.store();
    for idx in 0..store.len() {
        if store.phase[idx] == Phase::Liquid {
            let u = store.u[idx];
            let speed = (u[0] * u[0] + u[1] * u[1] + u[2] * u[2]).sqrt();
            assert!(speed < 1e-6, "liquid cell {idx} drifted: |u|={speed}");
        }
    }

    let final_mass = total_mass(store);
    assert!(
        (final_mass - initial_mass).abs() / initial_mass.max(1.0) < 1e-3,
        "mass drifted: {initial_mass} -> {final_mass}"
    );
}

/// A 16x16x8 molten slab under gravity: the global mass fix-up should keep
/// the domain total within tight tolerance of its initial value even while
/// cells are actively exchanging momentum.
#[test]
fn mass_is_conserved_under_agitation() {
    let mut cfg = molten_quiet(16, 16, 8);
    cfg.gravity = 9.81;
    let mut solver = Solver::new(cfg).expect("valid config");

    let initial_mass = total_mass(solver.store());
    for _ in 0..200 {
        solver.step();
    }
    let final_mass = total_mass(solver.store());

    assert!(
        (final_mass - initial_mass).abs() / initial_mass.max(1.0) < 1e-6,
        "mass drifted beyond the fix-up's tolerance: {initial_mass} -> {final_mass}"
    );
}

/// With the default (cold) reference temperature, the seeded substrate
/// starts below `T_solidus`. A cell colder than `T_solidus` must never carry
/// momentum: the collision stage freezes it to the rest state, so after
/// streaming it neither donates nor accepts momentum from its neighbors.
#[test]
fn solid_cells_never_develop_velocity() {
    let cfg = quiet_forces(6, 6, 8);
    let mut solver = Solver::new(cfg).expect("valid config");

    for _ in 0..20 {
        solver.step();
    }

    let store = solver.store();
    let t_solidus = solver.params().t_solidus;
    let mut saw_a_solid_cell = false;
    for idx in 0..store.len() {
        if store.phase[idx].is_fluid() && store.temperature[idx] < t_solidus {
            saw_a_solid_cell = true;
            assert_eq!(store.u[idx], [0.0, 0.0, 0.0], "frozen cell {idx} has nonzero velocity");
        }
    }
    assert!(saw_a_solid_cell, "test setup should seed at least one cell below T_solidus");
}

/// Phase reinitialization must never leave a `Liquid` cell touching `Gas` or
/// vice versa — the `Lg` layer always mediates between them.
#[test]
fn liquid_and_gas_never_touch_directly_after_reinit() {
    let cfg = molten_quiet(8, 8, 8);
    let mut solver = Solver::new(cfg).expect("valid config");

    for _ in 0..50 {
        solver.step();
        let store = solver.store();
        for idx in 0..store.len() {
            if store.phase[idx] != Phase::Liquid {
                continue;
            }
            for q in 1..lbm_core::lattice::Q {
                let n = store.neighbor(idx, q);
                assert_ne!(store.phase[n], Phase::Gas, "liquid cell {idx} touches gas neighbor directly");
            }
        }
    }
}
