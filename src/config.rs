//! System configuration parameters
//!
//! All tunable parameters for the TankSense control core.
//! Values can be overridden via NVS (non-volatile storage) at provisioning
//! time; the defaults below match the reference reservoir geometry.

use serde::{Deserialize, Serialize};

/// Tuning for the ultrasonic range sensor acquisition loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RangeSensorConfig {
    /// Minimum interval between trigger pulses (seconds).  Keeps a new
    /// pulse from being emitted while echoes of the previous one may
    /// still be arriving.
    pub min_trigger_interval_s: f64,
    /// Timeout waiting for each echo edge (milliseconds).
    pub echo_timeout_ms: u32,
    /// Width of the trigger pulse (microseconds).
    pub trigger_pulse_us: u32,
    /// Single-pole smoothing factor k in `new = old + k*(raw - old)`.
    pub filter_gain: f64,
    /// Raw-to-raw jump (meters) above which a reading is suspect.
    pub max_step_m: f64,
    /// Readings below this floor (meters) are treated as "no real return".
    pub min_range_m: f64,
}

impl Default for RangeSensorConfig {
    fn default() -> Self {
        Self {
            min_trigger_interval_s: 0.2,
            echo_timeout_ms: 60,
            trigger_pulse_us: 10,
            filter_gain: 0.5,
            max_step_m: 0.01,
            min_range_m: 0.001,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Reservoir geometry ---
    /// Distance from the ranger face to the tank floor (meters).
    pub tank_depth_m: f64,
    /// Target water level above the tank floor (meters).
    pub level_setpoint_m: f64,

    // --- Dosing PID ---
    /// Proportional gain.
    pub pid_p_gain: f64,
    /// Integral gain.
    pub pid_i_gain: f64,
    /// Derivative gain (applied to measured level).
    pub pid_d_gain: f64,
    /// Lower clamp for the accumulated integral term.
    pub integrator_min: f64,
    /// Upper clamp for the accumulated integral term.
    pub integrator_max: f64,

    // --- Timing ---
    /// Control loop interval (milliseconds).
    pub control_loop_interval_ms: u32,

    // --- Range sensor ---
    pub range: RangeSensorConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Reservoir
            tank_depth_m: 0.35,
            level_setpoint_m: 0.25,

            // PID
            pid_p_gain: 1.2,
            pid_i_gain: 0.4,
            pid_d_gain: 0.1,
            integrator_min: -0.5,
            integrator_max: 0.5,

            // Timing
            control_loop_interval_ms: 1000, // 1 Hz

            range: RangeSensorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.level_setpoint_m < c.tank_depth_m);
        assert!(c.level_setpoint_m > 0.0);
        assert!(c.integrator_min < c.integrator_max);
        assert!(c.control_loop_interval_ms > 0);
    }

    #[test]
    fn default_range_tuning_is_sane() {
        let r = RangeSensorConfig::default();
        assert!(r.min_trigger_interval_s > 0.0);
        assert!(r.echo_timeout_ms > 0);
        assert!(r.trigger_pulse_us > 0);
        assert!(r.filter_gain > 0.0 && r.filter_gain <= 1.0);
        assert!(
            r.min_range_m < r.max_step_m,
            "noise floor must sit below the jump threshold"
        );
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert!((c.tank_depth_m - c2.tank_depth_m).abs() < 1e-9);
        assert!((c.pid_p_gain - c2.pid_p_gain).abs() < 1e-9);
        assert_eq!(c.control_loop_interval_ms, c2.control_loop_interval_ms);
        assert_eq!(c.range.echo_timeout_ms, c2.range.echo_timeout_ms);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = SystemConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: SystemConfig = postcard::from_bytes(&bytes).unwrap();
        assert!((c.level_setpoint_m - c2.level_setpoint_m).abs() < 1e-9);
        assert!((c.range.max_step_m - c2.range.max_step_m).abs() < 1e-9);
    }
}
