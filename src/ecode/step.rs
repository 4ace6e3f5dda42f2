//! Single rectangular pulse on top of the holding current.
//!
//! ```text
//!        hypamp        hypamp+amp          hypamp
//!          :               :                 :
//!          :        _________________        :
//!          :       |                 |       :
//!      |___________|                 |___________
//!      ^           ^                 ^           ^
//!     t=0         ton               toff        tend
//! ```
//!
//! `General` recordings (arbitrary continuous stimulus between `ton` and
//! `toff`) share this geometry: they are summarised by the median level of the
//! active window.
use ndarray::Array1;
use crate::ecode::interpretation::Interpretation;
use crate::ecode::waveform::{add_constant, Geometry};
use crate::ecode::EcodeError;
pub(crate) const TIMING_KEYS: [&str; 2] = ["ton", "toff"];
pub(crate) const AMPLITUDE_KEYS: [&str; 2] = ["hypamp", "amp"];
pub(crate) const DEFAULT_TIMING_MS: [(&str, f64); 2] = [("ton", 700.0), ("toff", 2700.0)];
pub(crate) const EXPORT_ATTR: [&str; 8] = [
    "ton", "toff", "tend", "amp", "hypamp", "dt", "amp_rel", "hypamp_rel",
];
pub(crate) fn interpret(ctx: &mut Interpretation) -> Result<(), EcodeError> {
    interpret_step(ctx, "hypamp", "amp")
}
/// Baseline from outside `[ton, toff)`, step level from inside it.
pub(crate) fn interpret_step(
    ctx: &mut Interpretation,
    baseline_key: &'static str,
    amplitude_key: &'static str,
) -> Result<(), EcodeError> {
    let ton = ctx.index("ton")?;
    let toff = ctx.index("toff")?;
    let baseline = ctx.smooth_median(baseline_key, &[(0, ton), (toff, usize::MAX)])?;
    let baseline = ctx.resolve(baseline_key, baseline)?;
    let level = ctx.smooth_median(amplitude_key, &[(ton, toff)])?;
    ctx.resolve(amplitude_key, level - baseline)?;
    Ok(())
}
pub(crate) fn draw(geometry: &Geometry, signal: &mut Array1<f64>) -> Result<(), EcodeError> {
    draw_step(geometry, signal, "amp")
}
pub(crate) fn draw_step(
    geometry: &Geometry,
    signal: &mut Array1<f64>,
    amplitude_key: &str,
) -> Result<(), EcodeError> {
    add_constant(
        signal,
        geometry.index("ton")?,
        geometry.index("toff")?,
        geometry.amp(amplitude_key)?,
    );
    Ok(())
}
