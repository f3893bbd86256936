//! Laser scan path sampling (C12): turns a polyline of waypoints and
//! per-segment power switches into a fixed-timestep sequence of
//! `(x, y, power)` samples.

/// One timestep's worth of laser state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserSample {
    pub t: f64,
    pub x: f64,
    pub y: f64,
    pub power: f64,
}

/// Samples a piecewise-linear scan path at a fixed timestep `dt`.
///
/// Each segment `i -> i+1` has constant power `switch[i]`, travels at
/// `scanning_vel`, and lasts `tau = length / scanning_vel`. It contributes
/// `floor(tau / dt) + 1` samples, including both endpoints exactly (the
/// last sample of one segment and the first of the next therefore coincide
/// in position but may differ in power).
pub fn sample_laser_path(x_pos: &[f64], y_pos: &[f64], switch: &[f64], scanning_vel: f64, dt: f64) -> Vec<LaserSample> {
    assert_eq!(x_pos.len(), y_pos.len());
    assert_eq!(switch.len() + 1, x_pos.len());

    let mut samples = Vec::new();
    let mut t_prev = 0.0;

    for i in 0..switch.len() {
        let dx = x_pos[i + 1] - x_pos[i];
        let dy = y_pos[i + 1] - y_pos[i];
        let length = (dx * dx + dy * dy).sqrt();
        let tau = if scanning_vel > 0.0 { length / scanning_vel } else { 0.0 };
        let steps = (tau / dt).floor() as usize + 1;
        let power = switch[i];

        for s in 0..steps {
            let frac = if tau > 0.0 { (s as f64 * dt / tau).min(1.0) } else { 0.0 };
            samples.push(LaserSample {
                t: t_prev + s as f64 * dt,
                x: x_pos[i] + frac * dx,
                y: y_pos[i] + frac * dy,
                power,
            });
        }
        // Advance by tau exactly, not by the sampled step count, so segment
        // boundaries don't drift when tau isn't an exact multiple of dt.
        t_prev += tau;
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_segment_hits_both_endpoints_exactly() {
        let samples = sample_laser_path(&[0.0, 1.0], &[0.0, 0.0], &[1.0], 1.0, 0.1);
        assert_eq!(samples.first().unwrap().x, 0.0);
        assert!((samples.last().unwrap().x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sample_count_matches_duration_over_dt() {
        let samples = sample_laser_path(&[0.0, 2.0], &[0.0, 0.0], &[1.0], 2.0, 0.25);
        // tau = 2.0 / 2.0 = 1.0s, steps = floor(1.0 / 0.25) + 1 = 5
        assert_eq!(samples.len(), 5);
    }

    #[test]
    fn power_switches_per_segment() {
        let samples = sample_laser_path(&[0.0, 1.0, 2.0], &[0.0, 0.0, 0.0], &[1.0, 0.0], 1.0, 0.5);
        assert!(samples.iter().take_while(|s| s.x < 1.0 - 1e-9).all(|s| s.power == 1.0));
        assert!(samples.last().unwrap().power == 0.0);
    }

    #[test]
    fn zero_length_segment_still_produces_one_sample() {
        let samples = sample_laser_path(&[0.0, 0.0], &[0.0, 0.0], &[1.0], 1.0, 0.1);
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn segment_boundary_advances_by_tau_not_by_sample_count() {
        // Two 10-unit legs at unit speed and unit dt: each leg is tau=10,
        // so it contributes floor(10/1)+1 = 11 samples (t = 0..=10), and
        // the next leg must resume at t=10, not t=11.
        let samples = sample_laser_path(&[0.0, 10.0, 10.0], &[0.0, 0.0, 10.0], &[1.0, 0.5], 1.0, 1.0);
        assert_eq!(samples.len(), 22);
        assert_eq!(samples[10].t, 10.0);
        assert_eq!(samples[10].power, 1.0);
        assert_eq!(samples[11].t, 10.0);
        assert_eq!(samples[11].power, 0.5);
        assert_eq!(samples.last().unwrap().t, 20.0);
    }
}
