//! Ultrasonic range sensor driver (HC-SR04 class).
//!
//! Owns a dedicated acquisition thread that runs the trigger/echo timing
//! protocol, rejects suspect readings, folds the result through a
//! single-pole filter, and publishes the estimate behind a mutex.  Callers
//! read [`range_m`](RangeSensor::range_m) / [`sample_count`](RangeSensor::sample_count)
//! without ever blocking on hardware.
//!
//! ## Dual-target design
//!
//! The driver is generic over the [`GpioPin`] and [`Clock`] capabilities:
//! on ESP-IDF it runs against [`EspPin`](crate::hal::esp::EspPin) and
//! [`EspClock`](crate::hal::esp::EspClock); on host it runs unmodified
//! against scripted fakes, which is how the acquisition state machine is
//! tested without real hardware.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::RangeSensorConfig;
use crate::drivers::task_pin::{self, Core};
use crate::hal::{Clock, Edge, GpioPin};

/// Speed of sound in air (m/s) used for the round-trip conversion.
const SPEED_OF_SOUND_M_PER_S: f64 = 340.27;

/// Acquisition thread priority — above the control loop, below the ISRs.
const ACQ_TASK_PRIORITY: u8 = 10;
/// Acquisition thread stack (KB).
const ACQ_TASK_STACK_KB: usize = 8;

/// Default startup-wait budget for [`RangeSensor::initialise`].
const INIT_TIMEOUT: Duration = Duration::from_millis(500);
/// Readiness poll interval during [`RangeSensor::initialise`].
const INIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

// ── Shared estimate ───────────────────────────────────────────

/// The published estimate.  `range_m` and `samples` form one logical unit:
/// both are updated under the same lock, so a reader never sees a count
/// bump without the corresponding range update.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeEstimate {
    /// Exponentially smoothed distance to the water surface (meters).
    pub range_m: f64,
    /// Completed filter updates.  Non-zero means at least one measurement
    /// (successful or timed-out) has been folded in.
    pub samples: u32,
}

fn lock_estimate(shared: &Mutex<RangeEstimate>) -> MutexGuard<'_, RangeEstimate> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Outlier gate + filter ─────────────────────────────────────

/// Outlier gate and single-pole smoothing state, separated from the
/// acquisition thread so it can be exercised directly by tests and fuzzing.
#[derive(Debug, Clone, Copy)]
pub struct RangeFilter {
    gain: f64,
    max_step_m: f64,
    min_range_m: f64,
    /// Raw value folded on the previous cycle (post-retry).
    last_raw: f64,
    /// False until the first sample has seeded the filter.
    primed: bool,
}

impl RangeFilter {
    pub fn new(cfg: &RangeSensorConfig) -> Self {
        Self {
            gain: cfg.filter_gain,
            max_step_m: cfg.max_step_m,
            min_range_m: cfg.min_range_m,
            last_raw: 0.0,
            primed: false,
        }
    }

    /// A measurement is suspect if it jumps more than `max_step_m` from the
    /// previous raw value (never on the very first measurement), or if it
    /// sits below the sensor noise floor.  The gate compares *raw* deltas so
    /// a slowly drifting filtered value cannot mask a genuine sudden jump.
    pub fn is_outlier(&self, raw_m: f64) -> bool {
        (self.primed && (raw_m - self.last_raw).abs() > self.max_step_m)
            || raw_m < self.min_range_m
    }

    /// Fold an accepted raw measurement into the estimate.  The first
    /// sample seeds the filter exactly; later samples are smoothed.  The
    /// sample counter advances unconditionally — a timed-out (zero) reading
    /// still counts and perturbs the filter toward zero.
    pub fn fold(&mut self, raw_m: f64, est: &mut RangeEstimate) {
        if self.primed {
            est.range_m += self.gain * (raw_m - est.range_m);
        } else {
            est.range_m = raw_m;
            self.primed = true;
        }
        est.samples = est.samples.saturating_add(1);
        self.last_raw = raw_m;
    }
}

// ── Acquisition worker ────────────────────────────────────────

struct Worker<P: GpioPin, C: Clock> {
    trigger: P,
    echo: P,
    clock: C,
    cfg: RangeSensorConfig,
    filter: RangeFilter,
    shared: Arc<Mutex<RangeEstimate>>,
    running: Arc<AtomicBool>,
    /// Time of the most recent trigger pulse, for retrigger throttling.
    last_trigger: f64,
}

impl<P: GpioPin, C: Clock> Worker<P, C> {
    fn run(mut self) {
        while self.running.load(Ordering::Relaxed) {
            self.cycle();
        }
        log::info!("ranger: acquisition thread stopped");
    }

    /// One acquisition cycle: measure, re-measure once if the reading looks
    /// dubious, then fold whatever came back.  The lock is held only for
    /// the fold — never across a hardware wait.
    fn cycle(&mut self) {
        let mut raw_m = self.measure();
        if self.filter.is_outlier(raw_m) {
            raw_m = self.measure();
        }
        let mut est = lock_estimate(&self.shared);
        self.filter.fold(raw_m, &mut est);
    }

    /// Raw measurement protocol: throttle, 10 µs trigger pulse, then wait
    /// for the echo rise and fall edges.  Any timeout yields exactly 0.0 —
    /// indistinguishable from a true zero-distance return, as in the
    /// sensor's native behaviour.
    fn measure(&mut self) -> f64 {
        let since_last = self.clock.now() - self.last_trigger;
        if since_last < self.cfg.min_trigger_interval_s {
            // Wait out the remainder so late echoes from the previous
            // pulse cannot corrupt this cycle's edge timing.
            self.clock
                .delay_ms(1_000.0 * (self.cfg.min_trigger_interval_s - since_last));
        }

        self.last_trigger = self.clock.now();
        self.trigger.us_pulse(true, self.cfg.trigger_pulse_us);

        if self.echo.poll(self.cfg.echo_timeout_ms) {
            let rise = self.clock.now();
            if self.echo.poll(self.cfg.echo_timeout_ms) {
                let fall = self.clock.now();
                // Round trip: out to the surface and back.
                return (fall - rise) * SPEED_OF_SOUND_M_PER_S / 2.0;
            }
        }

        0.0
    }
}

// ── Driver facade ─────────────────────────────────────────────

/// Handle to the running range sensor.  Construction configures the pins
/// and starts the acquisition thread; dropping the handle stops and joins
/// it, guaranteeing no further hardware access or shared-state writes.
pub struct RangeSensor<C: Clock> {
    shared: Arc<Mutex<RangeEstimate>>,
    running: Arc<AtomicBool>,
    clock: C,
    worker: Option<JoinHandle<()>>,
}

impl<C: Clock + Send + 'static> RangeSensor<C> {
    /// Configure the trigger/echo pins and start the acquisition thread.
    pub fn new<P>(mut trigger: P, mut echo: P, clock: C, cfg: RangeSensorConfig) -> Self
    where
        P: GpioPin + Send + 'static,
    {
        trigger.set_output(true);
        trigger.set_state(false);
        echo.set_output(false);
        echo.set_edge_trigger(Edge::Both);

        // Pin configuration itself can glitch the trigger line; treating
        // "now" as the last trigger makes the first cycle wait out the
        // full retrigger interval.
        let last_trigger = clock.now();

        let shared = Arc::new(Mutex::new(RangeEstimate::default()));
        let running = Arc::new(AtomicBool::new(true));

        let worker = Worker {
            trigger,
            echo,
            clock: clock.clone(),
            filter: RangeFilter::new(&cfg),
            cfg,
            shared: Arc::clone(&shared),
            running: Arc::clone(&running),
            last_trigger,
        };

        let handle = task_pin::spawn_on_core(
            Core::App,
            ACQ_TASK_PRIORITY,
            ACQ_TASK_STACK_KB,
            "ranger\0",
            move || worker.run(),
        );

        Self {
            shared,
            running,
            clock,
            worker: Some(handle),
        }
    }

    /// Current filtered distance to the water surface (meters).
    /// Safe to call from any thread; takes the estimate lock briefly.
    pub fn range_m(&self) -> f64 {
        lock_estimate(&self.shared).range_m
    }

    /// Number of completed filter updates.
    pub fn sample_count(&self) -> u32 {
        lock_estimate(&self.shared).samples
    }

    /// True once at least one measurement has been folded in.
    pub fn ready(&self) -> bool {
        self.sample_count() > 0
    }

    /// Block briefly at startup until the first measurement lands.
    /// Returns whether readiness was achieved within the default budget
    /// (0.5 s, polled every 50 ms).
    pub fn initialise(&self) -> bool {
        self.wait_ready(INIT_TIMEOUT, INIT_POLL_INTERVAL)
    }

    /// Parametrised form of [`initialise`](Self::initialise).
    pub fn wait_ready(&self, budget: Duration, poll_interval: Duration) -> bool {
        let deadline = self.clock.now() + budget.as_secs_f64();
        while !self.ready() {
            if self.clock.now() >= deadline {
                return false;
            }
            self.clock.delay_ms(poll_interval.as_secs_f64() * 1_000.0);
        }
        true
    }
}

impl<C: Clock> Drop for RangeSensor<C> {
    fn drop(&mut self) {
        // Plain flag, observed at the top of each cycle; shutdown latency
        // is bounded by one in-flight measurement.
        self.running.store(false, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────
