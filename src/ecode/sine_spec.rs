//! SineSpec: a 5 s chirp of amplitude `amp` centred on the holding current.
use std::f64::consts::PI;
use ndarray::Array1;
use crate::ecode::interpretation::Interpretation;
use crate::ecode::stats;
use crate::ecode::waveform::{add_profile, Geometry};
use crate::ecode::EcodeError;
pub(crate) const TIMING_KEYS: [&str; 2] = ["ton", "toff"];
pub(crate) const AMPLITUDE_KEYS: [&str; 2] = ["hypamp", "amp"];
pub(crate) const DEFAULT_TIMING_MS: [(&str, f64); 2] = [("ton", 250.0), ("toff", 5250.0)];
pub(crate) const EXPORT_ATTR: [&str; 8] = [
    "ton", "toff", "tend", "amp", "hypamp", "dt", "amp_rel", "hypamp_rel",
];
/// Unit chirp at `x` seconds after onset.
pub(crate) fn chirp(x: f64) -> f64 {
    let shifted = x - 0.1;
    (2.0 * PI * (1.0 + 1.0 / (5.15 - shifted)) * shifted).sin()
}
pub(crate) fn interpret(ctx: &mut Interpretation) -> Result<(), EcodeError> {
    let ton = ctx.index("ton")?;
    let toff = ctx.index("toff")?;
    let hypamp = ctx.smooth_median("hypamp", &[(0, ton), (toff, usize::MAX)])?;
    let hypamp = ctx.resolve("hypamp", hypamp)?;
    let peak = stats::max(ctx.smooth_values(&[(ton, toff)])).ok_or_else(|| ctx.empty_segment("amp"))?;
    ctx.resolve("amp", peak - hypamp)?;
    Ok(())
}
pub(crate) fn draw(geometry: &Geometry, signal: &mut Array1<f64>) -> Result<(), EcodeError> {
    let ton = geometry.index("ton")?;
    let toff = geometry.index("toff")?;
    let amp = geometry.amp("amp")?;
    let dt_s = geometry.dt() / 1000.0;
    let profile = Array1::from_iter((0..toff.saturating_sub(ton)).map(|k| amp * chirp(k as f64 * dt_s)));
    add_profile(signal, ton, &profile);
    Ok(())
}
