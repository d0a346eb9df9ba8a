//! Stub floating-point unit.
//!
//! Scalar FP accuracy is out of scope for this model: FP data-processing
//! instructions occupy the FP pipes for timing purposes and produce a zero
//! result. The machine counts every stubbed result in
//! `SimStats::fp_stub_results`, and the façade exposes `fp_stubbed()` so a
//! benchmark harness can reject runs whose output depended on FP values.
//!
//! FP loads discard their data and FP stores write zeros; both are counted
//! under the same signal.

/// The value every stubbed FP computation produces.
pub const STUB_RESULT: u64 = 0;
