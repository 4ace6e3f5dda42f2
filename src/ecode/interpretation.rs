use ndarray::{s, Array1};
use crate::ecode::amplitude::resolve_amplitude;
use crate::ecode::smoothing::{median_filter, SMOOTHING_WINDOW};
use crate::ecode::timing::{check_order, resolve_timings, TimingIndices};
use crate::ecode::{stats, AmplitudeSet, ConfigData, EcodeError, EcodeKind, ReaderData, TimingSet};
/// Working state of a single `interpret` pass.
///
/// Variant code reads segments of the raw and smoothed signal through it and
/// records resolved timings and amplitudes; nothing escapes until the whole
/// pass succeeded.
pub(crate) struct Interpretation<'a> {
    pub(crate) protocol: &'a str,
    pub(crate) t: &'a Array1<f64>,
    pub(crate) raw: &'a Array1<f64>,
    pub(crate) smooth: Array1<f64>,
    pub(crate) config: &'a ConfigData,
    pub(crate) reader: &'a ReaderData,
    pub(crate) dt: f64,
    pub(crate) indices: TimingIndices,
    pub(crate) amplitudes: AmplitudeSet,
    /// Durations in ms that are not positions on the time axis.
    pub(crate) durations: TimingSet,
    pub(crate) pulse_onsets: Vec<f64>,
    relative: bool,
}
impl<'a> Interpretation<'a> {
    pub(crate) fn new(
        kind: EcodeKind,
        protocol: &'a str,
        t: &'a Array1<f64>,
        raw: &'a Array1<f64>,
        config: &'a ConfigData,
        reader: &'a ReaderData,
    ) -> Result<Self, EcodeError> {
        let dt = t[1] - t[0];
        let smooth = median_filter(raw.view(), SMOOTHING_WINDOW);
        let indices = if kind.default_timing().is_empty() {
            TimingIndices::default()
        } else {
            let indices = resolve_timings(protocol, kind.timing_keys(), kind.default_timing(), config, dt)?;
            check_order(protocol, indices.iter().map(|(key, idx)| (key, idx as f64 * dt)))?;
            for (key, idx) in indices.iter() {
                if idx >= raw.len() {
                    return Err(EcodeError::TimingOutOfRange {
                        protocol: protocol.to_owned(),
                        key: key.to_owned(),
                        value_ms: idx as f64 * dt,
                        tend_ms: raw.len() as f64 * dt,
                    });
                }
            }
            indices
        };
        Ok(Self {
            protocol,
            t,
            raw,
            smooth,
            config,
            reader,
            dt,
            indices,
            amplitudes: AmplitudeSet::default(),
            durations: TimingSet::default(),
            pulse_onsets: Vec::new(),
            relative: !kind.relative_keys().is_empty(),
        })
    }
    pub(crate) fn index(&self, key: &str) -> Result<usize, EcodeError> {
        self.indices
            .get(key)
            .ok_or_else(|| EcodeError::MissingParameters {
                protocol: self.protocol.to_owned(),
                names: vec![key.to_owned()],
            })
    }
    pub(crate) fn empty_segment(&self, name: &str) -> EcodeError {
        EcodeError::EmptySegment {
            protocol: self.protocol.to_owned(),
            name: name.to_owned(),
        }
    }
    /// Samples of the smoothed signal over the `[from, to)` ranges, clamped to its length.
    pub(crate) fn smooth_values<'s>(&'s self, ranges: &'s [(usize, usize)]) -> impl Iterator<Item = f64> + 's {
        segments(&self.smooth, ranges)
    }
    pub(crate) fn raw_values<'s>(&'s self, ranges: &'s [(usize, usize)]) -> impl Iterator<Item = f64> + 's {
        segments(self.raw, ranges)
    }
    /// Median of the smoothed signal over `ranges`, used as the estimate of `name`.
    pub(crate) fn smooth_median(&self, name: &str, ranges: &[(usize, usize)]) -> Result<f64, EcodeError> {
        stats::median(self.smooth_values(ranges)).ok_or_else(|| self.empty_segment(name))
    }
    /// Resolves amplitude `name` against the configuration and stores it.
    pub(crate) fn resolve(&mut self, name: &str, estimated: f64) -> Result<f64, EcodeError> {
        let (value, _) = resolve_amplitude(self.protocol, name, self.config, self.reader, estimated);
        self.amplitudes.set(name, value);
        if self.relative {
            if let Some(threshold) = self.reader.threshold_for(name, self.config) {
                self.amplitudes.apply_threshold([name], threshold)?;
            }
        }
        Ok(value)
    }
}
fn segments<'s>(signal: &'s Array1<f64>, ranges: &'s [(usize, usize)]) -> impl Iterator<Item = f64> + 's {
    ranges.iter().flat_map(move |&(from, to)| {
        let to = to.min(signal.len());
        let from = from.min(to);
        signal.slice(s![from..to]).into_iter().copied()
    })
}
