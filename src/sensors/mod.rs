//! Sensor subsystem — hardware-facing acquisition drivers.
//!
//! Each driver owns whatever background machinery it needs and exposes
//! synchronized, non-blocking accessors to the rest of the firmware.

pub mod range;

pub use range::RangeSensor;
