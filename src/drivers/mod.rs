//! Platform helpers shared by the sensor drivers.

pub mod task_pin;
