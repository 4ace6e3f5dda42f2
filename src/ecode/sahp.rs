//! sAHP: a long step (`amp2`) interrupted by a stronger central step (`amp`).
//!
//! ```text
//!                                  hypamp+amp
//!                              ________________
//!                             |                |
//!      hypamp   hypamp+amp2   |                |  hypamp+amp2   hypamp
//!                _____________|                |______________
//!      _________|                                             |_________
//!      ^        ^             ^                ^              ^         ^
//!     t=0      ton           tmid            tmid2           toff      tend
//! ```
use ndarray::Array1;
use crate::ecode::interpretation::Interpretation;
use crate::ecode::waveform::{add_constant, Geometry};
use crate::ecode::EcodeError;
pub(crate) const TIMING_KEYS: [&str; 4] = ["ton", "tmid", "tmid2", "toff"];
pub(crate) const AMPLITUDE_KEYS: [&str; 3] = ["hypamp", "amp", "amp2"];
pub(crate) const DEFAULT_TIMING_MS: [(&str, f64); 4] =
    [("ton", 250.0), ("tmid", 500.0), ("tmid2", 725.0), ("toff", 2175.0)];
pub(crate) const EXPORT_ATTR: [&str; 12] = [
    "ton", "tmid", "tmid2", "toff", "tend", "amp", "amp2", "hypamp", "dt", "amp_rel",
    "amp2_rel", "hypamp_rel",
];
pub(crate) fn interpret(ctx: &mut Interpretation) -> Result<(), EcodeError> {
    let ton = ctx.index("ton")?;
    let tmid = ctx.index("tmid")?;
    let tmid2 = ctx.index("tmid2")?;
    let toff = ctx.index("toff")?;
    let hypamp = ctx.smooth_median("hypamp", &[(0, ton), (toff, usize::MAX)])?;
    let hypamp = ctx.resolve("hypamp", hypamp)?;
    let long_step = ctx.smooth_median("amp2", &[(ton, tmid), (tmid2, toff)])?;
    ctx.resolve("amp2", long_step - hypamp)?;
    let central = ctx.smooth_median("amp", &[(tmid, tmid2)])?;
    ctx.resolve("amp", central - hypamp)?;
    Ok(())
}
pub(crate) fn draw(geometry: &Geometry, signal: &mut Array1<f64>) -> Result<(), EcodeError> {
    let ton = geometry.index("ton")?;
    let tmid = geometry.index("tmid")?;
    let tmid2 = geometry.index("tmid2")?;
    let toff = geometry.index("toff")?;
    let amp2 = geometry.amp("amp2")?;
    add_constant(signal, ton, tmid, amp2);
    add_constant(signal, tmid, tmid2, geometry.amp("amp")?);
    add_constant(signal, tmid2, toff, amp2);
    Ok(())
}
