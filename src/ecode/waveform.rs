use ndarray::{s, Array1};
use crate::ecode::timing::ms_to_index;
use crate::ecode::{AmplitudeSet, EcodeError, TimingSet};
/// Fully populated parameters an eCode is regenerated from.
pub(crate) struct Geometry<'a> {
    pub(crate) protocol: &'a str,
    pub(crate) dt: f64,
    pub(crate) timings: &'a TimingSet,
    pub(crate) amplitudes: &'a AmplitudeSet,
    pub(crate) pulse_onsets: &'a [f64],
}
impl Geometry<'_> {
    fn missing(&self, name: &str) -> EcodeError {
        EcodeError::MissingParameters {
            protocol: self.protocol.to_owned(),
            names: vec![name.to_owned()],
        }
    }
    pub(crate) fn dt(&self) -> f64 {
        self.dt
    }
    pub(crate) fn timing(&self, key: &str) -> Result<f64, EcodeError> {
        self.timings.get(key).ok_or_else(|| self.missing(key))
    }
    pub(crate) fn amp(&self, key: &str) -> Result<f64, EcodeError> {
        self.amplitudes.get(key).ok_or_else(|| self.missing(key))
    }
    pub(crate) fn index(&self, key: &str) -> Result<usize, EcodeError> {
        ms_to_index(self.protocol, key, self.timing(key)?, self.dt)
    }
    pub(crate) fn index_at(&self, value_ms: f64) -> Result<usize, EcodeError> {
        ms_to_index(self.protocol, "t", value_ms, self.dt)
    }
    pub(crate) fn pulse_onsets(&self) -> &[f64] {
        self.pulse_onsets
    }
}
fn clamp(len: usize, from: usize, to: usize) -> (usize, usize) {
    let to = to.min(len);
    (from.min(to), to)
}
/// Adds `amp` over `[from, to)`; bounds past the end are clamped.
pub(crate) fn add_constant(signal: &mut Array1<f64>, from: usize, to: usize, amp: f64) {
    let (from, to) = clamp(signal.len(), from, to);
    let mut segment = signal.slice_mut(s![from..to]);
    segment += amp;
}
/// Adds `profile` starting at `from`, truncated to the end of the signal.
pub(crate) fn add_profile(signal: &mut Array1<f64>, from: usize, profile: &Array1<f64>) {
    let (from, to) = clamp(signal.len(), from, from.saturating_add(profile.len()));
    let mut segment = signal.slice_mut(s![from..to]);
    segment += &profile.slice(s![..to - from]);
}
/// Adds a straight line from `start` to `end` (both included) over `[from, to)`.
pub(crate) fn add_linear(signal: &mut Array1<f64>, from: usize, to: usize, start: f64, end: f64) {
    if to <= from {
        return;
    }
    add_profile(signal, from, &Array1::linspace(start, end, to - from));
}
