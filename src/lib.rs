//! TankSense firmware library.
//!
//! Exposes the sensing and control modules for integration testing and
//! external inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod config;
pub mod control;
pub mod drivers;
pub mod hal;
pub mod pins;
pub mod sensors;
