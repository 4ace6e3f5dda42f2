//! Two back-to-back rectangular segments: `HyperDePol` and `DeHyperPol`.
//!
//! ```text
//!      hypamp      hypamp+amp       hypamp+amp2       hypamp
//!                                ________________
//!                               |                |
//!      |_________               |                |_________
//!                |______________|
//!      ^         ^              ^                ^         ^
//!     t=0       ton            tmid             toff      tend
//! ```
//!
//! HyperDePol hyperpolarises first (`amp < 0`, usually -40% to -160% of
//! rheobase) then depolarises (`amp2`, usually 100% of rheobase); DeHyperPol
//! runs the same geometry the other way round.
use ndarray::Array1;
use crate::ecode::interpretation::Interpretation;
use crate::ecode::waveform::{add_constant, Geometry};
use crate::ecode::EcodeError;
pub(crate) const TIMING_KEYS: [&str; 3] = ["ton", "tmid", "toff"];
pub(crate) const AMPLITUDE_KEYS: [&str; 3] = ["hypamp", "amp", "amp2"];
pub(crate) const HYPERDEPOL_TIMING_MS: [(&str, f64); 3] =
    [("ton", 250.0), ("tmid", 700.0), ("toff", 970.0)];
pub(crate) const DEHYPERPOL_TIMING_MS: [(&str, f64); 3] =
    [("ton", 250.0), ("tmid", 520.0), ("toff", 970.0)];
pub(crate) const EXPORT_ATTR: [&str; 11] = [
    "ton", "tmid", "toff", "tend", "amp", "amp2", "hypamp", "dt", "amp_rel", "amp2_rel",
    "hypamp_rel",
];
pub(crate) fn interpret(ctx: &mut Interpretation) -> Result<(), EcodeError> {
    let ton = ctx.index("ton")?;
    let tmid = ctx.index("tmid")?;
    let toff = ctx.index("toff")?;
    let hypamp = ctx.smooth_median("hypamp", &[(0, ton), (toff, usize::MAX)])?;
    let hypamp = ctx.resolve("hypamp", hypamp)?;
    let first = ctx.smooth_median("amp", &[(ton, tmid)])?;
    ctx.resolve("amp", first - hypamp)?;
    let second = ctx.smooth_median("amp2", &[(tmid, toff)])?;
    ctx.resolve("amp2", second - hypamp)?;
    Ok(())
}
pub(crate) fn draw(geometry: &Geometry, signal: &mut Array1<f64>) -> Result<(), EcodeError> {
    let ton = geometry.index("ton")?;
    let tmid = geometry.index("tmid")?;
    let toff = geometry.index("toff")?;
    add_constant(signal, ton, tmid, geometry.amp("amp")?);
    add_constant(signal, tmid, toff, geometry.amp("amp2")?);
    Ok(())
}
