use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
/// Sparse per-protocol configuration: timing keys in ms, amplitudes in pA.
///
/// A `null` value is treated exactly like a missing key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigData(BTreeMap<String, Option<f64>>);
impl ConfigData {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied().flatten()
    }
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
    pub fn insert(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.0.insert(key.into(), Some(value));
        self
    }
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.insert(key, value);
        self
    }
}
impl<K: Into<String>> FromIterator<(K, f64)> for ConfigData {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), Some(v))).collect())
    }
}
/// Values handed over by the file reader alongside the arrays.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReaderData(ConfigData);
impl ReaderData {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key)
    }
    pub fn with(self, key: impl Into<String>, value: f64) -> Self {
        Self(self.0.with(key, value))
    }
    /// Threshold used to express `amplitude` relative to rheobase, if any is known.
    pub fn threshold_for(&self, amplitude: &str, config: &ConfigData) -> Option<f64> {
        self.get(&format!("{amplitude}_threshold"))
            .or_else(|| self.get("amp_threshold"))
            .or_else(|| config.get("amp_threshold"))
    }
}
