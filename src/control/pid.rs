//! PID controller for the dosing control loop.
//!
//! Stateful proportional-integral-derivative controller fed each tick with
//! the level error and the measured level. The derivative term acts on the
//! *measurement* rather than the error, so setpoint changes do not produce
//! derivative kick.

/// PID controller
///
/// Constructed with zeroed gains, limits, and state; configure with
/// [`set_gains`](Self::set_gains) and
/// [`set_integrator_limits`](Self::set_integrator_limits) before use.
/// Purely arithmetic — no failure modes.
#[derive(Debug, Default, Clone, Copy)]
pub struct PidController {
    /// Last measured position (for the derivative term).
    d_state: f64,
    /// Accumulated integral term.
    i_state: f64,
    i_min: f64,
    i_max: f64,
    p_gain: f64,
    i_gain: f64,
    d_gain: f64,
}

impl PidController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the proportional, integral, and derivative gains.
    /// Takes effect on the next [`update`](Self::update); no validation.
    pub fn set_gains(&mut self, p_gain: f64, i_gain: f64, d_gain: f64) {
        self.p_gain = p_gain;
        self.i_gain = i_gain;
        self.d_gain = d_gain;
    }

    /// Set the clamp bounds for the accumulated integral term.
    /// The caller must ensure `i_min <= i_max` (unchecked).
    pub fn set_integrator_limits(&mut self, i_min: f64, i_max: f64) {
        self.i_min = i_min;
        self.i_max = i_max;
    }

    /// One control tick: fold `error` into the integrator (clamped) and
    /// return the summed P/I/D contributions.
    pub fn update(&mut self, error: f64, position: f64) -> f64 {
        let p_term = self.p_gain * error;

        self.i_state += error;
        if self.i_state > self.i_max {
            self.i_state = self.i_max;
        } else if self.i_state < self.i_min {
            self.i_state = self.i_min;
        }
        let i_term = self.i_gain * self.i_state;

        // Derivative on measurement, not error.
        let d_input = position - self.d_state;
        self.d_state = position;

        p_term + i_term - self.d_gain * d_input
    }

    /// Clear the accumulated integral and derivative history, e.g. when the
    /// control loop re-arms after a fault.  Gains and limits are kept.
    pub fn reset(&mut self) {
        self.i_state = 0.0;
        self.d_state = 0.0;
    }
}
