//! Property tests for the filter and controller arithmetic.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32 targets.

#![cfg(not(target_os = "espidf"))]

use proptest::prelude::*;
use tanksense::config::RangeSensorConfig;
use tanksense::control::pid::PidController;
use tanksense::sensors::range::{RangeEstimate, RangeFilter};

// ── PID invariants ────────────────────────────────────────────

proptest! {
    /// With P and D zeroed, the output is exactly the integral gain times
    /// the clamped running error sum — and therefore bounded by the
    /// integrator limits for any error sequence (anti-windup).
    #[test]
    fn integrator_tracks_clamped_running_sum(
        i_gain in 0.01f64..10.0,
        bound in 0.1f64..50.0,
        errors in proptest::collection::vec(-100.0f64..100.0, 1..50),
    ) {
        let mut pid = PidController::new();
        pid.set_gains(0.0, i_gain, 0.0);
        pid.set_integrator_limits(-bound, bound);

        let mut acc = 0.0f64;
        for &e in &errors {
            let out = pid.update(e, 0.0);
            acc = (acc + e).clamp(-bound, bound);
            prop_assert!((out - i_gain * acc).abs() < 1e-6);
            prop_assert!(out.abs() <= i_gain * bound + 1e-6);
        }
    }

    /// A pure-proportional controller is linear in the error and ignores
    /// the position input entirely.
    #[test]
    fn proportional_term_is_linear_in_error(
        p_gain in -10.0f64..10.0,
        error in -100.0f64..100.0,
        position in -100.0f64..100.0,
    ) {
        let mut pid = PidController::new();
        pid.set_gains(p_gain, 0.0, 0.0);
        prop_assert!((pid.update(error, position) - p_gain * error).abs() < 1e-9);
    }

    /// The derivative term acts on measured position: identical errors with
    /// different positions must produce different outputs.
    #[test]
    fn derivative_distinguishes_positions_with_equal_error(
        error in -10.0f64..10.0,
        position in -10.0f64..10.0,
        delta in 0.1f64..5.0,
    ) {
        let mut a = PidController::new();
        let mut b = PidController::new();
        a.set_gains(0.0, 0.0, 1.0);
        b.set_gains(0.0, 0.0, 1.0);

        let out_a = a.update(error, position);
        let out_b = b.update(error, position + delta);
        prop_assert!((out_a - out_b).abs() > 1e-9);
    }
}

// ── Filter invariants ─────────────────────────────────────────

proptest! {
    /// Every fold advances the sample counter by exactly one, and the
    /// smoothed estimate never escapes the envelope of the raw inputs.
    #[test]
    fn filter_counts_every_fold_and_stays_in_envelope(
        raws in proptest::collection::vec(0.0f64..10.0, 1..100),
    ) {
        let cfg = RangeSensorConfig::default();
        let mut filter = RangeFilter::new(&cfg);
        let mut est = RangeEstimate::default();

        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for (i, &raw) in raws.iter().enumerate() {
            filter.fold(raw, &mut est);
            lo = lo.min(raw);
            hi = hi.max(raw);
            prop_assert_eq!(est.samples, (i + 1) as u32);
            prop_assert!(est.range_m >= lo - 1e-9);
            prop_assert!(est.range_m <= hi + 1e-9);
        }
    }

    /// The outlier gate never rejects a repeat of the previous accepted
    /// reading, as long as it sits above the noise floor.
    #[test]
    fn repeated_reading_is_never_an_outlier(
        raw in 0.01f64..10.0,
    ) {
        let cfg = RangeSensorConfig::default();
        let mut filter = RangeFilter::new(&cfg);
        let mut est = RangeEstimate::default();
        filter.fold(raw, &mut est);
        prop_assert!(!filter.is_outlier(raw));
    }
}
