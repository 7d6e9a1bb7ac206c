//! TankSense Firmware — Main Entry Point
//!
//! Bring-up order: logger → configuration → range sensor (background
//! acquisition thread) → dosing PID → supervisory loop.  The loop derives
//! the water level from the filtered air gap, feeds the level error into
//! the PID, and publishes the control output; actuation policy lives in
//! the supervisory firmware, not here.

#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod control;
mod drivers;
mod hal;
mod pins;
mod sensors;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use config::SystemConfig;
use control::pid::PidController;
use hal::Clock;
use hal::esp::{EspClock, EspPin};
use sensors::range::RangeSensor;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("TankSense v{}", env!("CARGO_PKG_VERSION"));

    let cfg = SystemConfig::default();

    // ── 2. Range sensor ───────────────────────────────────────
    let trigger = EspPin::new(pins::RANGE_TRIGGER_GPIO);
    let echo = EspPin::new(pins::RANGE_ECHO_GPIO);
    let clock = EspClock::new();

    let ranger = RangeSensor::new(trigger, echo, clock, cfg.range);
    if ranger.initialise() {
        info!("ranger: ready (range {:.3} m)", ranger.range_m());
    } else {
        // Not fatal: the filter converges once echoes start arriving.
        warn!("ranger: no measurement within the startup budget");
    }

    // ── 3. Dosing PID ─────────────────────────────────────────
    let mut pid = PidController::new();
    pid.set_gains(cfg.pid_p_gain, cfg.pid_i_gain, cfg.pid_d_gain);
    pid.set_integrator_limits(cfg.integrator_min, cfg.integrator_max);

    // ── 4. Supervisory loop ───────────────────────────────────
    loop {
        // The ranger measures the air gap above the surface; level is the
        // remainder of the tank depth.
        let level_m = (cfg.tank_depth_m - ranger.range_m()).max(0.0);
        let error_m = cfg.level_setpoint_m - level_m;
        let output = pid.update(error_m, level_m);

        info!(
            "level={:.3} m (setpoint {:.3}) error={:+.3} control={:+.3}",
            level_m, cfg.level_setpoint_m, error_m, output
        );

        clock.delay_ms(f64::from(cfg.control_loop_interval_ms));
    }
}
