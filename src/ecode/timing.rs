use std::collections::BTreeMap;
use log::warn;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use crate::ecode::{ConfigData, EcodeError};
/// Named timing offsets of a protocol, in ms.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimingSet(BTreeMap<String, f64>);
impl TimingSet {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }
    pub fn insert(&mut self, key: impl Into<String>, value_ms: f64) {
        self.0.insert(key.into(), value_ms);
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
/// Timing keys resolved to sample indices, kept in protocol order.
#[derive(Clone, Debug, Default)]
pub struct TimingIndices(Vec<(&'static str, usize)>);
impl TimingIndices {
    pub fn get(&self, key: &str) -> Option<usize> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, idx)| *idx)
    }
    pub fn set(&mut self, key: &'static str, index: usize) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = index,
            None => self.0.push((key, index)),
        }
    }
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.0.iter().copied()
    }
}
/// Converts a ms offset to the nearest sample index.
pub fn ms_to_index(protocol: &str, key: &str, value_ms: f64, dt: f64) -> Result<usize, EcodeError> {
    let index = (value_ms / dt).round();
    if !index.is_finite() || index < 0.0 {
        return Err(EcodeError::InvalidTiming {
            protocol: protocol.to_owned(),
            key: key.to_owned(),
            value_ms,
        });
    }
    Ok(index as usize)
}
/// Reads the time stamp at `index`; an index past the end of the sweep is an error.
pub fn index_to_ms(protocol: &str, key: &str, index: usize, t: &Array1<f64>) -> Result<f64, EcodeError> {
    t.get(index).copied().ok_or_else(|| {
        let dt = t[1] - t[0];
        EcodeError::TimingOutOfRange {
            protocol: protocol.to_owned(),
            key: key.to_owned(),
            value_ms: index as f64 * dt,
            tend_ms: t.len() as f64 * dt,
        }
    })
}
/// Timing values of `keys` in ms, taken from `config`.
///
/// All-or-nothing: when any key is missing, every key is taken from `defaults`
/// and a warning names the protocol and the substituted table.
pub fn configured_timings(
    protocol: &str,
    keys: &[&'static str],
    defaults: &[(&'static str, f64)],
    config: &ConfigData,
) -> Result<Vec<(&'static str, f64)>, EcodeError> {
    let provided: Option<Vec<f64>> = keys.iter().map(|key| config.get(key)).collect();
    if let Some(values) = provided {
        return Ok(keys.iter().copied().zip(values).collect());
    }
    let table = defaults
        .iter()
        .map(|(key, ms)| format!("{key}={ms}"))
        .collect::<Vec<_>>()
        .join(", ");
    warn!("Missing timing key(s) for {protocol}, using defaults: {{{table}}}");
    keys.iter()
        .map(|&key| {
            defaults
                .iter()
                .find(|(name, _)| *name == key)
                .map(|&(_, ms)| (key, ms))
                .ok_or_else(|| EcodeError::MissingParameters {
                    protocol: protocol.to_owned(),
                    names: vec![key.to_owned()],
                })
        })
        .collect()
}
/// Maps `keys` to sample indices, see [`configured_timings`].
pub fn resolve_timings(
    protocol: &str,
    keys: &[&'static str],
    defaults: &[(&'static str, f64)],
    config: &ConfigData,
    dt: f64,
) -> Result<TimingIndices, EcodeError> {
    let mut indices = TimingIndices::default();
    for (key, value_ms) in configured_timings(protocol, keys, defaults, config)? {
        indices.set(key, ms_to_index(protocol, key, value_ms, dt)?);
    }
    Ok(indices)
}
/// Fails unless the timings are strictly increasing in the order given.
pub fn check_order<'a>(
    protocol: &str,
    timings: impl IntoIterator<Item = (&'a str, f64)>,
) -> Result<(), EcodeError> {
    let mut previous: Option<(&str, f64)> = None;
    for (key, value_ms) in timings {
        if let Some((prev_key, prev_ms)) = previous {
            if value_ms <= prev_ms {
                return Err(EcodeError::NonMonotonicTiming {
                    protocol: protocol.to_owned(),
                    previous: prev_key.to_owned(),
                    previous_ms: prev_ms,
                    key: key.to_owned(),
                    value_ms,
                });
            }
        }
        previous = Some((key, value_ms));
    }
    Ok(())
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use log::{Level, LevelFilter, Log, Metadata, Record};
    static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());
    struct CapturingLogger;
    impl Log for CapturingLogger {
        fn enabled(&self, _: &Metadata) -> bool {
            true
        }
        fn log(&self, record: &Record) {
            RECORDS.lock().unwrap().push((record.level(), record.args().to_string()));
        }
        fn flush(&self) {}
    }
    static LOGGER: CapturingLogger = CapturingLogger;
    const KEYS: [&str; 2] = ["ton", "toff"];
    const DEFAULTS: [(&str, f64); 2] = [("ton", 700.0), ("toff", 2700.0)];
    #[test]
    fn uses_config_when_complete() {
        let config = ConfigData::new().with("ton", 100.0).with("toff", 700.0);
        let idx = resolve_timings("Step", &KEYS, &DEFAULTS, &config, 0.25).unwrap();
        assert_eq!(idx.get("ton"), Some(400));
        assert_eq!(idx.get("toff"), Some(2800));
    }
    #[test]
    fn partial_config_falls_back_to_full_defaults() {
        let config = ConfigData::new().with("toff", 900.0);
        let idx = resolve_timings("Step", &KEYS, &DEFAULTS, &config, 0.5).unwrap();
        assert_eq!(idx.get("ton"), Some(1400));
        assert_eq!(idx.get("toff"), Some(5400));
    }
    #[test]
    fn default_substitution_is_logged() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Debug);
        let complete = ConfigData::new().with("ton", 100.0).with("toff", 900.0);
        resolve_timings("IDRestComplete", &KEYS, &DEFAULTS, &complete, 0.5).unwrap();
        let config = ConfigData::new().with("toff", 900.0);
        resolve_timings("IDRestPartial", &KEYS, &DEFAULTS, &config, 0.5).unwrap();
        let records = RECORDS.lock().unwrap();
        assert!(records.iter().any(|(level, message)| *level == Level::Warn
            && message.contains("IDRestPartial")
            && message.contains("ton=700, toff=2700")));
        assert!(!records
            .iter()
            .any(|(_, message)| message.contains("IDRestComplete")));
    }
    #[test]
    fn negative_timing_is_rejected() {
        let config = ConfigData::new().with("ton", -5.0).with("toff", 900.0);
        let err = resolve_timings("Step", &KEYS, &DEFAULTS, &config, 0.5).unwrap_err();
        assert!(matches!(err, EcodeError::InvalidTiming { .. }));
        assert_eq!(
            err.to_string(),
            "timing ton of Step must be a finite, non-negative offset, got -5 ms"
        );
    }
    #[test]
    fn order_check_names_offending_key() {
        assert!(check_order("PosCheops", [("ton", 1.0), ("t1", 2.0), ("t2", 3.0)]).is_ok());
        let err = check_order("PosCheops", [("ton", 1.0), ("t1", 4.0), ("t2", 3.0)]).unwrap_err();
        match err {
            EcodeError::NonMonotonicTiming { previous, key, .. } => {
                assert_eq!(previous, "t1");
                assert_eq!(key, "t2");
            }
            other => panic!("unexpected error {other}"),
        }
    }
    #[test]
    fn index_past_the_end_is_out_of_range() {
        let t = Array1::from_iter((0..10).map(|i| i as f64 * 0.5));
        assert_eq!(index_to_ms("Step", "ton", 4, &t).unwrap(), 2.0);
        assert!(index_to_ms("Step", "toff", 10, &t).is_err());
    }
}
