//! Linear ramp from the holding current up to `hypamp + amp`.
//!
//! ```text
//!                                 hypamp+amp
//!                                   /|
//!                                 /  |
//!                               /    |
//!      hypamp                 /      |            hypamp
//!      ____________________ /        |_____________
//!      ^                   ^         ^             ^
//!     t=0                 ton       toff          tend
//! ```
use ndarray::{s, Array1};
use crate::ecode::interpretation::Interpretation;
use crate::ecode::stats;
use crate::ecode::waveform::{add_linear, Geometry};
use crate::ecode::EcodeError;
pub(crate) const TIMING_KEYS: [&str; 2] = ["ton", "toff"];
pub(crate) const AMPLITUDE_KEYS: [&str; 2] = ["hypamp", "amp"];
pub(crate) const DEFAULT_TIMING_MS: [(&str, f64); 2] = [("ton", 250.0), ("toff", 1600.0)];
pub(crate) const EXPORT_ATTR: [&str; 8] = [
    "ton", "toff", "tend", "amp", "hypamp", "dt", "amp_rel", "hypamp_rel",
];
pub(crate) fn interpret(ctx: &mut Interpretation) -> Result<(), EcodeError> {
    let ton = ctx.index("ton")?;
    let toff = ctx.index("toff")?;
    let hypamp = ctx.smooth_median("hypamp", &[(0, ton), (toff, usize::MAX)])?;
    let hypamp = ctx.resolve("hypamp", hypamp)?;
    // The median filter shaves the top of the ramp, so fit the raw segment.
    let segment = ctx.raw.slice(s![ton..toff.min(ctx.raw.len())]).to_vec();
    let (intercept, slope) = stats::line_fit(&segment).ok_or_else(|| ctx.empty_segment("amp"))?;
    let top = intercept + slope * (segment.len() - 1) as f64;
    ctx.resolve("amp", top - hypamp)?;
    Ok(())
}
pub(crate) fn draw(geometry: &Geometry, signal: &mut Array1<f64>) -> Result<(), EcodeError> {
    add_linear(
        signal,
        geometry.index("ton")?,
        geometry.index("toff")?,
        0.0,
        geometry.amp("amp")?,
    );
    Ok(())
}
