//! GPIO / peripheral pin assignments for the TankSense main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Ultrasonic ranger (HC-SR04 class, 5 V via level shifter)
// ---------------------------------------------------------------------------

/// Digital output: 10 µs trigger pulse starts a ranging cycle.
pub const RANGE_TRIGGER_GPIO: i32 = 4;
/// Digital input: echo line goes HIGH for the pulse round-trip duration.
/// Edge-interrupt capable; shifted down to 3.3 V on the board.
pub const RANGE_ECHO_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Dosing pump driver (DRV8871 H-bridge) — actuation handled by the
// supervisory firmware, pins reserved on this board revision.
// ---------------------------------------------------------------------------

pub const PUMP_PWM_GPIO: i32 = 1;
pub const PUMP_DIR_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// UART debug
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 17;
pub const UART_RX_GPIO: i32 = 18;
