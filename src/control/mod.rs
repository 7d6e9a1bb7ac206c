//! Control-loop components consumed by the supervisory firmware.

pub mod pid;
