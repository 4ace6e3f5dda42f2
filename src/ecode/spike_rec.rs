//! SpikeRec: a train of short rectangular pulses, each meant to elicit one spike.
//!
//! ```text
//!      hypamp     hypamp+amp                 hypamp+amp
//!                  ______                      ______
//!                 |      |                    |      |
//!      ___________|      |_______  . . .  ____|      |__________
//!      ^          ^      ^                    ^      ^          ^
//!     t=0     tspike[0]  +spike_duration   tspike[n]  toff     tend
//! ```
//!
//! Pulses are too short to survive the median filter, so they are detected on
//! the raw current.
use log::debug;
use ndarray::Array1;
use crate::ecode::interpretation::Interpretation;
use crate::ecode::stats;
use crate::ecode::waveform::{add_constant, Geometry};
use crate::ecode::EcodeError;
pub(crate) const TIMING_KEYS: [&str; 2] = ["ton", "toff"];
pub(crate) const AMPLITUDE_KEYS: [&str; 2] = ["hypamp", "amp"];
pub(crate) const EXPORT_ATTR: [&str; 11] = [
    "ton", "toff", "tend", "tspike", "spike_duration", "delta", "amp", "hypamp", "dt",
    "amp_rel", "hypamp_rel",
];
/// Samples at each end of the sweep used to measure the noise level.
const NOISE_EDGE_SAMPLES: usize = 50;
const NOISE_FACTOR: f64 = 4.5;
const MIN_STEP_THRESHOLD: f64 = 1e-5;
/// `[start, end)` sample ranges where the current leaves the holding level.
pub(crate) fn detect_pulses(current: &Array1<f64>, holding: f64) -> Vec<(usize, usize)> {
    let n = current.len();
    let edges: Vec<f64> = current
        .iter()
        .take(NOISE_EDGE_SAMPLES)
        .chain(current.iter().skip(n.saturating_sub(NOISE_EDGE_SAMPLES)))
        .copied()
        .collect();
    let threshold = (NOISE_FACTOR * stats::std_dev(&edges)).max(MIN_STEP_THRESHOLD);
    let mut pulses = Vec::new();
    let mut start = None;
    for (i, &value) in current.iter().enumerate() {
        let active = (value - holding).abs() > threshold;
        match (active, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                pulses.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        pulses.push((s, n));
    }
    pulses
}
pub(crate) fn interpret(ctx: &mut Interpretation) -> Result<(), EcodeError> {
    let holding = stats::base_current(ctx.raw.iter().copied())
        .ok_or_else(|| ctx.empty_segment("hypamp"))?;
    let hypamp = ctx.resolve("hypamp", holding)?;
    // A configured hypamp is what gets stored; pulses still stand out from the measured holding level.
    let pulses = detect_pulses(ctx.raw, holding);
    let (Some(&(first, _)), Some(&(_, last_end))) = (pulses.first(), pulses.last()) else {
        return Err(EcodeError::NoPulseDetected {
            protocol: ctx.protocol.to_owned(),
        });
    };
    debug!("{}: detected {} pulse(s)", ctx.protocol, pulses.len());
    let level = stats::median(ctx.raw_values(&pulses)).ok_or_else(|| ctx.empty_segment("amp"))?;
    ctx.resolve("amp", level - hypamp)?;
    let widths = pulses.iter().map(|(s, e)| (e - s) as f64 * ctx.dt);
    let measured = stats::mean(widths).ok_or_else(|| ctx.empty_segment("spike_duration"))?;
    let spike_duration = ctx.config.get("spike_duration").unwrap_or(measured);
    ctx.durations.insert("spike_duration", spike_duration);
    ctx.pulse_onsets = pulses.iter().map(|&(s, _)| ctx.t[s]).collect();
    let intervals = ctx.pulse_onsets.windows(2).map(|w| w[1] - w[0]);
    if let Some(delta) = stats::mean(intervals) {
        ctx.durations.insert("delta", delta);
    }
    ctx.indices.set("ton", first);
    ctx.indices.set("toff", last_end.min(ctx.raw.len() - 1));
    Ok(())
}
pub(crate) fn draw(geometry: &Geometry, signal: &mut Array1<f64>) -> Result<(), EcodeError> {
    let amp = geometry.amp("amp")?;
    let spike_duration = geometry.timing("spike_duration")?;
    for &onset in geometry.pulse_onsets() {
        let start = geometry.index_at(onset)?;
        let end = geometry.index_at(onset + spike_duration)?;
        add_constant(signal, start, end, amp);
    }
    Ok(())
}
/// Evenly spaced pulse onsets, as a SpikeRec configuration describes them.
pub(crate) fn onsets_from_config(ton: f64, delta: f64, count: usize) -> Vec<f64> {
    (0..count).map(|k| ton + k as f64 * delta).collect()
}
