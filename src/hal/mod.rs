//! Hardware capability traits — the boundary between the sensing/control
//! core and the platform.
//!
//! ```text
//!   EspPin / EspClock ──▶ capability trait ──▶ RangeSensor (domain)
//! ```
//!
//! Platform adapters (ESP-IDF on target, fakes on host) implement these
//! traits.  The [`RangeSensor`](crate::sensors::range::RangeSensor) consumes
//! them via generics, so the acquisition state machine never touches
//! hardware directly and runs unmodified under test.

#[cfg(target_os = "espidf")]
pub mod esp;

/// Which signal transition(s) arm the edge detector on an input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
    Both,
}

/// A single GPIO line.
///
/// All operations are infallible by contract: a failed hardware access shows
/// up as a missing edge (`poll` returning `false`), never as an error value.
/// The acquisition loop absorbs those as zero-distance samples.
pub trait GpioPin {
    /// Configure direction: `true` = output, `false` = input.
    fn set_output(&mut self, output: bool);

    /// Drive an output pin HIGH (`true`) or LOW (`false`).
    fn set_state(&mut self, high: bool);

    /// Arm interrupt-style edge detection on an input pin.
    fn set_edge_trigger(&mut self, edge: Edge);

    /// Block until the next armed edge occurs or `timeout_ms` elapses.
    /// Returns whether an edge was observed within the window.
    fn poll(&mut self, timeout_ms: u32) -> bool;

    /// Drive the pin to `level` for `duration_us` microseconds, then return
    /// it to the prior state.  Used for the ranger trigger pulse.
    fn us_pulse(&mut self, level: bool, duration_us: u32);
}

/// Monotonic time source and blocking sleep.
///
/// `Clone` so the driver facade and its acquisition thread can share one
/// source — on ESP-IDF both read the same hardware timer, on host both
/// reference the same simulated clock.
pub trait Clock: Clone {
    /// Monotonic seconds since some fixed origin (boot on target).
    fn now(&self) -> f64;

    /// Blocking sleep for (fractional) milliseconds.
    fn delay_ms(&self, ms: f64);
}
