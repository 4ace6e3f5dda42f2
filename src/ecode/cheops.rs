//! Cheops: three symmetric triangles of peak `amp` over the holding current.
//!
//! ```text
//!                  .                     .                     .
//!                 / \                   / \                   / \
//!                /   \                 /   \                 /   \
//!      _________/     \_______________/     \_______________/     \_______
//!      ^        ^      ^              ^      ^              ^      ^      ^
//!     t=0      ton     t1             t2     t3             t4    toff   tend
//! ```
//!
//! Each triangle peaks at the time midpoint of its window. `PosCheops` points
//! up; `NegCheops` uses the same timings with a negative `amp`.
use ndarray::Array1;
use crate::ecode::interpretation::Interpretation;
use crate::ecode::stats;
use crate::ecode::waveform::{add_linear, Geometry};
use crate::ecode::EcodeError;
pub(crate) const TIMING_KEYS: [&str; 6] = ["ton", "t1", "t2", "t3", "t4", "toff"];
pub(crate) const AMPLITUDE_KEYS: [&str; 2] = ["hypamp", "amp"];
pub(crate) const DEFAULT_TIMING_MS: [(&str, f64); 6] = [
    ("ton", 250.0),
    ("t1", 8250.0),
    ("t2", 10250.0),
    ("t3", 14250.0),
    ("t4", 16250.0),
    ("toff", 18916.0),
];
pub(crate) const EXPORT_ATTR: [&str; 12] = [
    "ton", "t1", "t2", "t3", "t4", "toff", "tend", "amp", "hypamp", "dt", "amp_rel",
    "hypamp_rel",
];
const PEAKS: [(&str, &str); 3] = [("ton", "t1"), ("t2", "t3"), ("t4", "toff")];
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Polarity {
    Positive,
    Negative,
}
pub(crate) fn interpret(ctx: &mut Interpretation, polarity: Polarity) -> Result<(), EcodeError> {
    let ton = ctx.index("ton")?;
    let hypamp = ctx.smooth_median("hypamp", &[(0, ton)])?;
    let hypamp = ctx.resolve("hypamp", hypamp)?;
    let smooth = ctx.smooth.iter().copied();
    let extreme = match polarity {
        Polarity::Positive => stats::max(smooth),
        Polarity::Negative => stats::min(smooth),
    }
    .ok_or_else(|| ctx.empty_segment("amp"))?;
    ctx.resolve("amp", extreme - hypamp)?;
    Ok(())
}
pub(crate) fn draw(geometry: &Geometry, signal: &mut Array1<f64>) -> Result<(), EcodeError> {
    let amp = geometry.amp("amp")?;
    for (start_key, end_key) in PEAKS {
        let start = geometry.index(start_key)?;
        let end = geometry.index(end_key)?;
        let mid = geometry.index_at(0.5 * (geometry.timing(start_key)? + geometry.timing(end_key)?))?;
        add_linear(signal, start, mid, 0.0, amp);
        add_linear(signal, mid, end, amp, 0.0);
    }
    Ok(())
}
