//! Zero-market-share replacement.
use crate::market::VehicleRecord;

/// Replace exact-zero counts with `zms` and return how many were replaced.
///
/// `zms` is validated as finite and positive by
/// [`PrepareOptions::with_zms`](crate::prepare::PrepareOptions::with_zms), so
/// a second pass finds nothing to replace.
pub fn replace_zero_counts(records: &mut [VehicleRecord], zms: f64) -> usize {
    let mut replaced = 0;
    for rec in records.iter_mut().filter(|r| r.count == 0.0) {
        rec.count = zms;
        replaced += 1;
    }
    replaced
}
