//! Fuzz target: `RangeFilter` outlier gate + fold
//!
//! Drives arbitrary raw-measurement sequences (including NaN/Inf bit
//! patterns) through the gate and the filter and verifies:
//! - No panics under any input sequence
//! - The sample counter advances by exactly one per fold
//! - Well-behaved (finite, bounded) input prefixes keep the estimate finite
//!
//! cargo fuzz run fuzz_range_filter

#![no_main]

use libfuzzer_sys::fuzz_target;
use tanksense::config::RangeSensorConfig;
use tanksense::sensors::range::{RangeEstimate, RangeFilter};

fuzz_target!(|data: &[u8]| {
    let cfg = RangeSensorConfig::default();
    let mut filter = RangeFilter::new(&cfg);
    let mut est = RangeEstimate::default();

    let mut folded: u32 = 0;
    let mut well_behaved = true;

    for chunk in data.chunks_exact(8) {
        let raw = f64::from_le_bytes(chunk.try_into().unwrap());

        // The gate is a pure predicate — must never panic, whatever the bits.
        let _ = filter.is_outlier(raw);

        filter.fold(raw, &mut est);
        folded += 1;
        assert_eq!(est.samples, folded, "every fold advances the counter");

        well_behaved &= raw.is_finite() && raw.abs() < 1e100;
        if well_behaved {
            assert!(
                est.range_m.is_finite(),
                "finite bounded inputs must keep the estimate finite"
            );
        }
    }
});
