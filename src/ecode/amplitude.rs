use std::collections::BTreeMap;
use log::debug;
use serde::{Deserialize, Serialize};
use crate::ecode::{ConfigData, EcodeError, ReaderData};
/// Where a resolved amplitude came from, highest precedence first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmplitudeSource {
    Configured,
    RelativeToThreshold,
    Estimated,
}
/// Absolute amplitudes plus their `_rel` mirror (percent of the threshold).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AmplitudeSet {
    absolute: BTreeMap<String, f64>,
    relative: BTreeMap<String, f64>,
}
impl AmplitudeSet {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.absolute.get(name).copied()
    }
    /// Percentage of the last threshold applied, `None` until one is known.
    pub fn relative(&self, name: &str) -> Option<f64> {
        self.relative.get(name).copied()
    }
    /// Stores an absolute value; any stale relative value is dropped.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        self.relative.remove(&name);
        self.absolute.insert(name, value);
    }
    /// Recomputes `<name>_rel = 100 * <name> / threshold` for each name present.
    pub fn apply_threshold<'a>(
        &mut self,
        names: impl IntoIterator<Item = &'a str>,
        threshold: f64,
    ) -> Result<(), EcodeError> {
        if !threshold.is_finite() || threshold == 0.0 {
            return Err(EcodeError::InvalidThreshold(threshold));
        }
        for name in names {
            if let Some(value) = self.get(name) {
                self.relative.insert(name.to_owned(), 100.0 * value / threshold);
            }
        }
        Ok(())
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.absolute.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
/// Amplitude `name` as given by configuration alone, if it can be derived from it.
pub fn configured_amplitude(
    name: &str,
    config: &ConfigData,
    reader: &ReaderData,
) -> Option<(f64, AmplitudeSource)> {
    if let Some(value) = config.get(name) {
        return Some((value, AmplitudeSource::Configured));
    }
    let rel = config.get(&format!("{name}_rel"))?;
    let threshold = reader.threshold_for(name, config)?;
    Some((rel * threshold / 100.0, AmplitudeSource::RelativeToThreshold))
}
/// Picks the final value of amplitude `name`.
///
/// An absolute config value wins over a config `<name>_rel` combined with a
/// known threshold, which wins over the estimate read from the trace.
pub fn resolve_amplitude(
    protocol: &str,
    name: &str,
    config: &ConfigData,
    reader: &ReaderData,
    estimated: f64,
) -> (f64, AmplitudeSource) {
    let resolved = configured_amplitude(name, config, reader)
        .unwrap_or((estimated, AmplitudeSource::Estimated));
    debug!("{protocol}: {name} = {} ({:?})", resolved.0, resolved.1);
    resolved
}
