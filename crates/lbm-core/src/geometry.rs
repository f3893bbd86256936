//! Free-surface geometry (C6): VOF and temperature gradients, and the
//! height-function curvature used by the surface-tension source term.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::field::{FieldStore, Phase};

/// Central difference of a per-cell scalar field across axis `axis`
/// (0=x, 1=y, 2=z), with periodic wraparound.
#[inline]
fn central_diff(store: &FieldStore, field: &[f64], idx: usize, axis: usize) -> f64 {
    let mut fwd = [0i32; 3];
    let mut back = [0i32; 3];
    fwd[axis] = 1;
    back[axis] = -1;
    let plus = store.offset_index(idx, fwd[0], fwd[1], fwd[2]);
    let minus = store.offset_index(idx, back[0], back[1], back[2]);
    (field[plus] - field[minus]) / 2.0
}

/// `grad(vof)` at every cell, central-differenced per axis.
pub fn grad_vof(store: &FieldStore) -> Vec<[f64; 3]> {
    let n = store.len();
    let compute = |idx: usize| -> [f64; 3] {
        [
            central_diff(store, &store.vof, idx, 0),
            central_diff(store, &store.vof, idx, 1),
            central_diff(store, &store.vof, idx, 2),
        ]
    };

    #[cfg(feature = "parallel")]
    {
        (0..n).into_par_iter().map(compute).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..n).map(compute).collect()
    }
}

/// `grad(T)` at every fluid cell, masked to zero across GAS and WALL
/// neighbors (the temperature field is meaningless there).
pub fn grad_temperature(store: &FieldStore) -> Vec<[f64; 3]> {
    let n = store.len();
    let compute = |idx: usize| -> [f64; 3] {
        if !store.phase[idx].is_fluid() {
            return [0.0; 3];
        }
        let mut g = [0.0; 3];
        for axis in 0..3 {
            let mut fwd = [0i32; 3];
            let mut back = [0i32; 3];
            fwd[axis] = 1;
            back[axis] = -1;
            let plus = store.offset_index(idx, fwd[0], fwd[1], fwd[2]);
            let minus = store.offset_index(idx, back[0], back[1], back[2]);
            let t_plus = if store.phase[plus].is_fluid() { store.temperature[plus] } else { store.temperature[idx] };
            let t_minus = if store.phase[minus].is_fluid() { store.temperature[minus] } else { store.temperature[idx] };
            g[axis] = (t_plus - t_minus) / 2.0;
        }
        g
    };

    #[cfg(feature = "parallel")]
    {
        (0..n).into_par_iter().map(compute).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..n).map(compute).collect()
    }
}

/// Column sum of `vof` over a `(w0, w1, w2)` window centered on `idx`, summed
/// along `axis` and averaged over the transverse `(a1, a2)` window.
fn height_sum(store: &FieldStore, idx: usize, axis: usize, half_along: i32, half_t1: i32, half_t2: i32) -> f64 {
    let axes: [usize; 3] = match axis {
        0 => [0, 1, 2],
        1 => [1, 0, 2],
        _ => [2, 0, 1],
    };
    let mut total = 0.0;
    for da in -half_along..=half_along {
        for d1 in -half_t1..=half_t1 {
            for d2 in -half_t2..=half_t2 {
                let mut offset = [0i32; 3];
                offset[axes[0]] = da;
                offset[axes[1]] = d1;
                offset[axes[2]] = d2;
                let n = store.offset_index(idx, offset[0], offset[1], offset[2]);
                total += store.vof[n];
            }
        }
    }
    total
}

/// Interface curvature via the height-function method, selecting the axis
/// along which `vof` varies most sharply (largest `|d(vof)/d(axis)|`), then
/// forming a column-height field over a `7x3x3` window transverse to that
/// axis and differencing it twice.
pub fn curvature(store: &FieldStore, grad: &[[f64; 3]]) -> Vec<f64> {
    let n = store.len();
    let compute = |idx: usize| -> f64 {
        if !store.phase[idx].is_fluid() {
            return 0.0;
        }
        let g = grad[idx];
        let mut axis = 0usize;
        let mut best = g[0].abs();
        for a in 1..3 {
            if g[a].abs() > best {
                best = g[a].abs();
                axis = a;
            }
        }

        // height at a transverse offset (t1, t2): column sum along `axis`
        // over a window of half-width 3, centered at the shifted cell.
        let height_at = |t1: i32, t2: i32| -> f64 {
            let axes: [usize; 3] = match axis {
                0 => [0, 1, 2],
                1 => [1, 0, 2],
                _ => [2, 0, 1],
            };
            let mut offset = [0i32; 3];
            offset[axes[1]] = t1;
            offset[axes[2]] = t2;
            let center = store.offset_index(idx, offset[0], offset[1], offset[2]);
            height_sum(store, center, axis, 3, 0, 0)
        };

        let h00 = height_at(0, 0);
        let hp10 = height_at(1, 0);
        let hm10 = height_at(-1, 0);
        let h0p1 = height_at(0, 1);
        let h0m1 = height_at(0, -1);
        let hpp = height_at(1, 1);
        let hpm = height_at(1, -1);
        let hmp = height_at(-1, 1);
        let hmm = height_at(-1, -1);

        let h_t1 = (hp10 - hm10) / 2.0;
        let h_t2 = (h0p1 - h0m1) / 2.0;
        let h_t1t1 = hp10 - 2.0 * h00 + hm10;
        let h_t2t2 = h0p1 - 2.0 * h00 + h0m1;
        let h_t1t2 = (hpp - hpm - hmp + hmm) / 4.0;

        let denom = 1.0 + h_t1 * h_t1 + h_t2 * h_t2;
        let numer = h_t1t1 * (1.0 + h_t2 * h_t2) + h_t2t2 * (1.0 + h_t1 * h_t1) - 2.0 * h_t1 * h_t2 * h_t1t2;
        let kappa = -numer / denom.powf(1.5);
        if kappa.is_finite() {
            kappa
        } else {
            0.0
        }
    };

    #[cfg(feature = "parallel")]
    {
        (0..n).into_par_iter().map(compute).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..n).map(compute).collect()
    }
}
