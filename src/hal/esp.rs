//! ESP-IDF implementations of the hardware capability traits.
//!
//! Uses raw `esp_idf_svc::sys` calls in the same style as the rest of the
//! peripheral bring-up: `gpio_config` for direction, `gpio_set_level` for
//! drive, and the per-pin GPIO ISR service feeding a FreeRTOS queue so that
//! [`GpioPin::poll`] is a true blocking wait rather than a busy loop.
//!
//! Only compiled for `target_os = "espidf"`; host builds and tests inject
//! fake pins and clocks instead.

use core::ffi::c_void;

use esp_idf_svc::sys::*;
use log::info;

use super::{Clock, Edge, GpioPin};

// ── Error type ────────────────────────────────────────────────

/// Errors during GPIO bring-up.  Runtime pin operations are infallible by
/// trait contract; only configuration can fail, and only at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    ConfigFailed(i32),
    IsrInstallFailed(i32),
    QueueCreateFailed,
}

impl core::fmt::Display for GpioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::QueueCreateFailed => write!(f, "edge event queue creation failed"),
        }
    }
}

impl std::error::Error for GpioError {}

// ── Edge event ISR ────────────────────────────────────────────

/// Depth of the per-pin edge event queue.  A ranging cycle produces at most
/// two edges (rise + fall); a little headroom absorbs late echoes that
/// arrive after a timeout window closed.
const EDGE_QUEUE_DEPTH: u32 = 4;

/// ISR handler registered per echo pin.  `arg` is the FreeRTOS queue handle
/// for that pin, so the handler itself holds no global state.
unsafe extern "C" fn edge_isr(arg: *mut c_void) {
    let queue = arg as QueueHandle_t;
    let evt: u8 = 1;
    let mut higher_prio_woken: BaseType_t = 0;
    // SAFETY: xQueueGenericSendFromISR is ISR-safe by definition; the queue
    // handle outlives the ISR registration (both owned by the same EspPin).
    unsafe {
        xQueueGenericSendFromISR(
            queue,
            (&raw const evt).cast::<c_void>(),
            &mut higher_prio_woken,
            queueSEND_TO_BACK as BaseType_t,
        );
    }
}

// ── GPIO pin ──────────────────────────────────────────────────

/// One GPIO line, configured at runtime through the [`GpioPin`] trait.
pub struct EspPin {
    pin: i32,
    /// Edge event queue, created lazily by `set_edge_trigger`.
    queue: QueueHandle_t,
}

// SAFETY: the queue handle is only used from the owning thread after
// construction; FreeRTOS queue operations are themselves thread-safe.
unsafe impl Send for EspPin {}

impl EspPin {
    pub fn new(pin: i32) -> Self {
        Self {
            pin,
            queue: core::ptr::null_mut(),
        }
    }

    /// Install the shared GPIO ISR service.  Idempotent —
    /// `ESP_ERR_INVALID_STATE` means it was already installed.
    fn ensure_isr_service() -> Result<(), GpioError> {
        // SAFETY: gpio_install_isr_service is safe to call repeatedly; the
        // duplicate-install return code is accepted below.
        let ret = unsafe { gpio_install_isr_service(0) };
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(GpioError::IsrInstallFailed(ret));
        }
        Ok(())
    }
}

impl GpioPin for EspPin {
    fn set_output(&mut self, output: bool) {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << self.pin,
            mode: if output {
                gpio_mode_t_GPIO_MODE_OUTPUT
            } else {
                gpio_mode_t_GPIO_MODE_INPUT
            },
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: gpio_config validates the pin mask; called during bring-up
        // or from the single acquisition thread that owns this pin.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK {
            log::warn!("gpio{}: config failed (rc={})", self.pin, ret);
        }
    }

    fn set_state(&mut self, high: bool) {
        // SAFETY: register write to an already-configured output pin.
        unsafe {
            gpio_set_level(self.pin, u32::from(high));
        }
    }

    fn set_edge_trigger(&mut self, edge: Edge) {
        if let Err(e) = Self::ensure_isr_service() {
            log::warn!("gpio{}: {}", self.pin, e);
            return;
        }

        if self.queue.is_null() {
            // SAFETY: creates a queue of small POD items; checked for null.
            self.queue = unsafe {
                xQueueGenericCreate(EDGE_QUEUE_DEPTH, 1, queueQUEUE_TYPE_BASE as u8)
            };
            if self.queue.is_null() {
                log::warn!("gpio{}: {}", self.pin, GpioError::QueueCreateFailed);
                return;
            }
        }

        let intr = match edge {
            Edge::Rising => gpio_int_type_t_GPIO_INTR_POSEDGE,
            Edge::Falling => gpio_int_type_t_GPIO_INTR_NEGEDGE,
            Edge::Both => gpio_int_type_t_GPIO_INTR_ANYEDGE,
        };

        // SAFETY: the ISR arg is the queue handle owned by this pin; the
        // handler is a static function that only performs an ISR-safe send.
        unsafe {
            gpio_set_intr_type(self.pin, intr);
            gpio_isr_handler_add(self.pin, Some(edge_isr), self.queue.cast::<c_void>());
            gpio_intr_enable(self.pin);
        }
        info!("gpio{}: edge trigger armed ({:?})", self.pin, edge);
    }

    fn poll(&mut self, timeout_ms: u32) -> bool {
        if self.queue.is_null() {
            return false;
        }
        let mut evt: u8 = 0;
        let ticks = (timeout_ms * configTICK_RATE_HZ) / 1_000;
        // SAFETY: blocking receive on a valid queue handle; the item is a
        // single byte written by the ISR.
        let ret = unsafe {
            xQueueReceive(self.queue, (&raw mut evt).cast::<c_void>(), ticks)
        };
        ret == 1
    }

    fn us_pulse(&mut self, level: bool, duration_us: u32) {
        // SAFETY: register writes plus a ROM busy-wait; the microsecond
        // delay must not yield, or the pulse width would jitter.
        unsafe {
            gpio_set_level(self.pin, u32::from(level));
            esp_rom_delay_us(duration_us);
            gpio_set_level(self.pin, u32::from(!level));
        }
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// Monotonic clock backed by `esp_timer_get_time()` (microsecond precision).
#[derive(Debug, Clone, Copy, Default)]
pub struct EspClock;

impl EspClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for EspClock {
    fn now(&self) -> f64 {
        // SAFETY: esp_timer_get_time is a monotonic counter read.
        (unsafe { esp_timer_get_time() }) as f64 / 1_000_000.0
    }

    fn delay_ms(&self, ms: f64) {
        if ms <= 0.0 {
            return;
        }
        // std::thread::sleep maps to vTaskDelay on ESP-IDF.
        std::thread::sleep(std::time::Duration::from_secs_f64(ms / 1_000.0));
    }
}
