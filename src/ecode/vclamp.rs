//! VClampStep: a voltage command step from `hold_v` by `step_v` (a delta).
//!
//! The geometry is read from the voltage command; the current response is
//! summarised by [`VClampFeatures`](crate::ecode::VClampFeatures).
use ndarray::Array1;
use crate::ecode::interpretation::Interpretation;
use crate::ecode::step::{draw_step, interpret_step};
use crate::ecode::waveform::Geometry;
use crate::ecode::EcodeError;
pub(crate) const TIMING_KEYS: [&str; 2] = ["ton", "toff"];
pub(crate) const AMPLITUDE_KEYS: [&str; 2] = ["hold_v", "step_v"];
pub(crate) const DEFAULT_TIMING_MS: [(&str, f64); 2] = [("ton", 100.0), ("toff", 600.0)];
pub(crate) const EXPORT_ATTR: [&str; 8] = [
    "ton", "toff", "tend", "dt", "hold_v", "step_v", "clamp_mode", "vclamp_features",
];
pub const CLAMP_MODE: &str = "V";
pub(crate) fn interpret(ctx: &mut Interpretation) -> Result<(), EcodeError> {
    interpret_step(ctx, "hold_v", "step_v")
}
pub(crate) fn draw(geometry: &Geometry, signal: &mut Array1<f64>) -> Result<(), EcodeError> {
    draw_step(geometry, signal, "step_v")
}
