use std::collections::BTreeMap;
use log::warn;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::ecode::cheops::{self, Polarity};
use crate::ecode::interpretation::Interpretation;
use crate::ecode::timing::{check_order, configured_timings, index_to_ms};
use crate::ecode::waveform::Geometry;
use crate::ecode::{
    amplitude, ramp, registry, sahp, sine_spec, spike_rec, step, two_step, vclamp, AmplitudeSet,
    ConfigData, EcodeError, EcodeKind, ReaderData, TimingSet, Trace, VClampFeatures,
};
/// One stimulus protocol instance: its shape plus the parameters that
/// describe (and regenerate) it.
///
/// Built either by [`Ecode::interpret`], which returns a fully populated
/// record, or by hand / from configuration, in which case [`Ecode::generate`]
/// refuses to run until every required parameter is set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ecode {
    kind: EcodeKind,
    protocol_name: String,
    dt: Option<f64>,
    tend: Option<f64>,
    timings: TimingSet,
    amplitudes: AmplitudeSet,
    pulse_onsets: Vec<f64>,
    vclamp_features: Option<VClampFeatures>,
}
impl Ecode {
    pub fn new(kind: EcodeKind, protocol_name: impl Into<String>) -> Self {
        Self {
            kind,
            protocol_name: protocol_name.into(),
            dt: None,
            tend: None,
            timings: TimingSet::default(),
            amplitudes: AmplitudeSet::default(),
            pulse_onsets: Vec::new(),
            vclamp_features: None,
        }
    }
    /// Empty instance for a protocol name found in the registry.
    pub fn from_protocol(protocol_name: &str) -> Result<Self, EcodeError> {
        Ok(Self::new(registry::lookup(protocol_name)?, protocol_name))
    }
    /// Parameters taken from configuration alone, for synthetic generation.
    ///
    /// Timings follow the same all-or-nothing default policy as
    /// [`Ecode::interpret`]; amplitudes the configuration cannot provide stay
    /// unset.
    pub fn from_config(
        kind: EcodeKind,
        protocol_name: impl Into<String>,
        config: &ConfigData,
        reader: &ReaderData,
        dt: f64,
        tend: f64,
    ) -> Result<Self, EcodeError> {
        let mut ecode = Self::new(kind, protocol_name).with_sampling(dt, tend);
        if kind == EcodeKind::SpikeRec {
            ecode.spike_train_from_config(config);
        } else {
            let timings = configured_timings(
                &ecode.protocol_name,
                kind.timing_keys(),
                kind.default_timing(),
                config,
            )?;
            for (key, value_ms) in timings {
                ecode.timings.insert(key, value_ms);
            }
        }
        for &name in kind.amplitude_keys() {
            if let Some((value, _)) = amplitude::configured_amplitude(name, config, reader) {
                ecode.amplitudes.set(name, value);
            }
        }
        for &name in kind.relative_keys() {
            if let Some(threshold) = reader.threshold_for(name, config) {
                ecode.amplitudes.apply_threshold([name], threshold)?;
            }
        }
        Ok(ecode)
    }
    fn spike_train_from_config(&mut self, config: &ConfigData) {
        for key in ["spike_duration", "delta"] {
            if let Some(value) = config.get(key) {
                self.timings.insert(key, value);
            }
        }
        let Some(ton) = config.get("ton") else {
            return;
        };
        self.timings.insert("ton", ton);
        let requested = config.get("n_spikes").map_or(1.0, |n| n.max(0.0).round());
        let delta = match config.get("delta") {
            Some(delta) => delta,
            None if requested <= 1.0 => 0.0,
            None => return,
        };
        // Only onsets that start before tend are kept.
        let room = match self.tend {
            Some(tend) if delta > 0.0 => ((tend - ton) / delta).ceil().max(0.0),
            Some(tend) if ton < tend => 1.0,
            _ => 0.0,
        };
        let count = requested.min(room);
        if count < requested {
            warn!(
                "{}: n_spikes = {requested} does not fit before tend, keeping {count}",
                self.protocol_name
            );
        }
        self.pulse_onsets = spike_rec::onsets_from_config(ton, delta, count as usize);
        if let (Some(last), Some(width)) = (self.pulse_onsets.last(), config.get("spike_duration")) {
            self.timings.insert("toff", last + width);
        }
    }
    /// Reads the protocol parameters off a recorded sweep.
    ///
    /// Current-clamp shapes read the current; `VClampStep` reads the voltage
    /// command and, when the current was recorded too, extracts its features.
    pub fn interpret(
        kind: EcodeKind,
        protocol_name: impl Into<String>,
        trace: &Trace,
        config: &ConfigData,
        reader: &ReaderData,
    ) -> Result<Self, EcodeError> {
        let protocol_name = protocol_name.into();
        let (signal, channel) = match kind {
            EcodeKind::VClampStep => (trace.voltage(), "voltage"),
            _ => (trace.current(), "current"),
        };
        let signal = signal.ok_or_else(|| EcodeError::MissingChannel {
            protocol: protocol_name.clone(),
            channel,
        })?;
        let t = trace.time();
        let mut ctx = Interpretation::new(kind, &protocol_name, t, signal, config, reader)?;
        match kind {
            EcodeKind::Step | EcodeKind::General => step::interpret(&mut ctx)?,
            EcodeKind::HyperDePol | EcodeKind::DeHyperPol => two_step::interpret(&mut ctx)?,
            EcodeKind::PosCheops => cheops::interpret(&mut ctx, Polarity::Positive)?,
            EcodeKind::NegCheops => cheops::interpret(&mut ctx, Polarity::Negative)?,
            EcodeKind::Ramp => ramp::interpret(&mut ctx)?,
            EcodeKind::Sahp => sahp::interpret(&mut ctx)?,
            EcodeKind::SpikeRec => spike_rec::interpret(&mut ctx)?,
            EcodeKind::SineSpec => sine_spec::interpret(&mut ctx)?,
            EcodeKind::VClampStep => vclamp::interpret(&mut ctx)?,
        }
        let Interpretation {
            indices,
            amplitudes,
            durations,
            pulse_onsets,
            ..
        } = ctx;
        let mut timings = durations;
        for (key, index) in indices.iter() {
            timings.insert(key, index_to_ms(&protocol_name, key, index, t)?);
        }
        let ecode = Self {
            kind,
            protocol_name,
            dt: Some(trace.dt()),
            tend: Some(trace.duration()),
            timings,
            amplitudes,
            pulse_onsets,
            vclamp_features: None,
        };
        check_order(&ecode.protocol_name, ecode.ordered_timings())?;
        let vclamp_features = match (kind, trace.current()) {
            (EcodeKind::VClampStep, Some(current)) => Some(VClampFeatures::extract(
                t.view(),
                current.view(),
                ecode.timing("ton"),
                ecode.timing("toff"),
            )),
            _ => None,
        };
        Ok(Self {
            vclamp_features,
            ..ecode
        })
    }
    /// Idealised stimulus `(t, signal)` over `[0, tend)` at step `dt`.
    pub fn generate(&self) -> Result<(Array1<f64>, Array1<f64>), EcodeError> {
        let missing = self.missing_parameters();
        let (Some(dt), Some(tend), true) = (self.dt, self.tend, missing.is_empty()) else {
            return Err(EcodeError::MissingParameters {
                protocol: self.protocol_name.clone(),
                names: missing,
            });
        };
        if !dt.is_finite() || dt <= 0.0 {
            return Err(EcodeError::InvalidTrace(format!(
                "sampling step must be positive, got {dt}"
            )));
        }
        check_order(&self.protocol_name, self.ordered_timings())?;
        if let Some((key, value_ms)) = self
            .ordered_timings()
            .find(|(_, value_ms)| !(0.0..=tend).contains(value_ms))
        {
            return Err(EcodeError::TimingOutOfRange {
                protocol: self.protocol_name.clone(),
                key: key.to_owned(),
                value_ms,
                tend_ms: tend,
            });
        }
        let t = Array1::range(0.0, tend, dt);
        let baseline = self
            .amplitudes
            .get(self.kind.baseline_key())
            .unwrap_or_default();
        let mut signal = Array1::from_elem(t.len(), baseline);
        let geometry = Geometry {
            protocol: &self.protocol_name,
            dt,
            timings: &self.timings,
            amplitudes: &self.amplitudes,
            pulse_onsets: &self.pulse_onsets,
        };
        match self.kind {
            EcodeKind::Step | EcodeKind::General => step::draw(&geometry, &mut signal)?,
            EcodeKind::HyperDePol | EcodeKind::DeHyperPol => two_step::draw(&geometry, &mut signal)?,
            EcodeKind::PosCheops | EcodeKind::NegCheops => cheops::draw(&geometry, &mut signal)?,
            EcodeKind::Ramp => ramp::draw(&geometry, &mut signal)?,
            EcodeKind::Sahp => sahp::draw(&geometry, &mut signal)?,
            EcodeKind::SpikeRec => spike_rec::draw(&geometry, &mut signal)?,
            EcodeKind::SineSpec => sine_spec::draw(&geometry, &mut signal)?,
            EcodeKind::VClampStep => vclamp::draw(&geometry, &mut signal)?,
        }
        Ok((t, signal))
    }
    /// Names of the parameters `generate` still lacks, in declaration order.
    pub fn missing_parameters(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.dt.is_none() {
            missing.push("dt".to_owned());
        }
        if self.tend.is_none() {
            missing.push("tend".to_owned());
        }
        for key in self.kind.timing_keys() {
            if self.timings.get(key).is_none() {
                missing.push((*key).to_owned());
            }
        }
        for name in self.kind.amplitude_keys() {
            if self.amplitudes.get(name).is_none() {
                missing.push((*name).to_owned());
            }
        }
        if self.kind == EcodeKind::SpikeRec {
            if self.timings.get("spike_duration").is_none() {
                missing.push("spike_duration".to_owned());
            }
            if self.pulse_onsets.is_empty() {
                missing.push("tspike".to_owned());
            }
        }
        missing
    }
    fn ordered_timings(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.kind
            .timing_keys()
            .iter()
            .filter_map(|&key| self.timings.get(key).map(|value| (key, value)))
    }
    /// Canonical parameters handed to model-fitting consumers.
    pub fn stimulus_parameters(&self) -> Result<BTreeMap<String, Value>, EcodeError> {
        let primary = self.kind.primary_amplitude();
        let required = [
            ("ton", self.timing("ton")),
            ("toff", self.timing("toff")),
            ("tend", self.tend),
            (primary, self.amplitude(primary)),
        ];
        let missing: Vec<String> = required
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| (*name).to_owned())
            .collect();
        let [Some(ton), Some(toff), Some(tend), Some(amp)] = required.map(|(_, value)| value) else {
            return Err(EcodeError::MissingParameters {
                protocol: self.protocol_name.clone(),
                names: missing,
            });
        };
        let mut params = BTreeMap::new();
        params.insert("delay".to_owned(), Value::from(ton));
        params.insert("amp".to_owned(), Value::from(amp));
        params.insert("thresh_perc".to_owned(), Value::from(self.relative_amplitude(primary)));
        params.insert("duration".to_owned(), Value::from(toff - ton));
        params.insert("totduration".to_owned(), Value::from(tend));
        let extras: &[&str] = match self.kind {
            EcodeKind::HyperDePol | EcodeKind::DeHyperPol => &["tmid", "toff", "amp2"],
            EcodeKind::PosCheops | EcodeKind::NegCheops => &["t1", "t2", "t3", "t4", "toff"],
            EcodeKind::Sahp => &["tmid", "tmid2", "toff", "amp2"],
            EcodeKind::SpikeRec => &["spike_duration", "delta", "tspike"],
            EcodeKind::VClampStep => &["hold_v"],
            _ => &[],
        };
        for name in extras {
            params.insert((*name).to_owned(), self.attribute(name));
        }
        Ok(params)
    }
    /// Overwrites every `_rel` amplitude as `100 * amp / threshold`.
    pub fn compute_relative_amp(&mut self, threshold: f64) -> Result<(), EcodeError> {
        self.amplitudes
            .apply_threshold(self.kind.relative_keys().iter().copied(), threshold)
    }
    pub fn export_attr(&self) -> &'static [&'static str] {
        self.kind.export_attr()
    }
    /// The fields listed by [`Ecode::export_attr`] as a JSON object.
    pub fn export(&self) -> Value {
        let fields: Map<String, Value> = self
            .export_attr()
            .iter()
            .map(|name| ((*name).to_owned(), self.attribute(name)))
            .collect();
        Value::Object(fields)
    }
    fn attribute(&self, name: &str) -> Value {
        match name {
            "dt" => self.dt.into(),
            "tend" => self.tend.into(),
            "tspike" => Value::from(self.pulse_onsets.clone()),
            "clamp_mode" => Value::from(vclamp::CLAMP_MODE),
            "vclamp_features" => serde_json::to_value(self.vclamp_features).unwrap_or_default(),
            _ => match name.strip_suffix("_rel") {
                Some(base) => self.relative_amplitude(base).into(),
                None => self.timing(name).or_else(|| self.amplitude(name)).into(),
            },
        }
    }
    /// Plot title fragment such as `" (150.0%)"`, once relative amplitudes exist.
    pub fn amplitude_label(&self) -> Option<String> {
        let amp = self.relative_amplitude("amp")?;
        match self.kind {
            EcodeKind::HyperDePol | EcodeKind::DeHyperPol => {
                let amp2 = self.relative_amplitude("amp2")?;
                Some(format!(" ({amp:.1}%/{amp2:.1}%)"))
            }
            _ => Some(format!(" ({amp:.1}%)")),
        }
    }
    pub fn set_timing(&mut self, key: impl Into<String>, value_ms: f64) -> &mut Self {
        self.timings.insert(key, value_ms);
        self
    }
    pub fn set_amplitude(&mut self, name: impl Into<String>, value: f64) -> &mut Self {
        self.amplitudes.set(name, value);
        self
    }
    pub fn set_pulse_onsets(&mut self, onsets: Vec<f64>) -> &mut Self {
        self.pulse_onsets = onsets;
        self
    }
    pub fn with_sampling(mut self, dt: f64, tend: f64) -> Self {
        self.dt = Some(dt);
        self.tend = Some(tend);
        self
    }
    pub fn kind(&self) -> EcodeKind {
        self.kind
    }
    pub fn protocol_name(&self) -> &str {
        &self.protocol_name
    }
    pub fn dt(&self) -> Option<f64> {
        self.dt
    }
    pub fn tend(&self) -> Option<f64> {
        self.tend
    }
    pub fn timing(&self, key: &str) -> Option<f64> {
        self.timings.get(key)
    }
    pub fn amplitude(&self, name: &str) -> Option<f64> {
        self.amplitudes.get(name)
    }
    pub fn relative_amplitude(&self, name: &str) -> Option<f64> {
        self.amplitudes.relative(name)
    }
    pub fn timings(&self) -> &TimingSet {
        &self.timings
    }
    pub fn amplitudes(&self) -> &AmplitudeSet {
        &self.amplitudes
    }
    pub fn pulse_onsets(&self) -> &[f64] {
        &self.pulse_onsets
    }
    pub fn vclamp_features(&self) -> Option<&VClampFeatures> {
        self.vclamp_features.as_ref()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    const DT: f64 = 0.25;
    fn config(pairs: &[(&str, f64)]) -> ConfigData {
        pairs.iter().map(|&(k, v)| (k, v)).collect()
    }
    fn timings_only(kind: EcodeKind, full: &ConfigData) -> ConfigData {
        kind.timing_keys()
            .iter()
            .filter_map(|&key| full.get(key).map(|value| (key, value)))
            .collect()
    }
    fn max_abs_diff(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
        assert_eq!(a.len(), b.len());
        a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max)
    }
    fn cases() -> Vec<(EcodeKind, ConfigData, f64, f64)> {
        let cheops = [
            ("ton", 100.0),
            ("t1", 1100.0),
            ("t2", 1300.0),
            ("t3", 2300.0),
            ("t4", 2500.0),
            ("toff", 3500.0),
            ("hypamp", 0.0),
        ];
        vec![
            (
                EcodeKind::Step,
                config(&[("ton", 100.0), ("toff", 700.0), ("hypamp", -20.0), ("amp", 300.0)]),
                1000.0,
                1e-9,
            ),
            (
                EcodeKind::General,
                config(&[("ton", 200.0), ("toff", 600.0), ("hypamp", 15.0), ("amp", -80.0)]),
                1000.0,
                1e-9,
            ),
            (
                EcodeKind::HyperDePol,
                config(&[
                    ("ton", 100.0),
                    ("tmid", 400.0),
                    ("toff", 700.0),
                    ("hypamp", 0.0),
                    ("amp", -100.0),
                    ("amp2", 250.0),
                ]),
                1000.0,
                1e-9,
            ),
            (
                EcodeKind::DeHyperPol,
                config(&[
                    ("ton", 100.0),
                    ("tmid", 300.0),
                    ("toff", 700.0),
                    ("hypamp", -5.0),
                    ("amp", 250.0),
                    ("amp2", -100.0),
                ]),
                1000.0,
                1e-9,
            ),
            (
                EcodeKind::Sahp,
                config(&[
                    ("ton", 100.0),
                    ("tmid", 300.0),
                    ("tmid2", 500.0),
                    ("toff", 800.0),
                    ("hypamp", -10.0),
                    ("amp", 400.0),
                    ("amp2", 150.0),
                ]),
                1000.0,
                1e-9,
            ),
            (
                EcodeKind::Ramp,
                config(&[("ton", 100.0), ("toff", 700.0), ("hypamp", 20.0), ("amp", 500.0)]),
                1000.0,
                1e-6,
            ),
            (
                EcodeKind::PosCheops,
                cheops.iter().copied().chain([("amp", 200.0)]).collect(),
                3700.0,
                5.0,
            ),
            (
                EcodeKind::NegCheops,
                cheops.iter().copied().chain([("amp", -200.0)]).collect(),
                3700.0,
                5.0,
            ),
            (
                EcodeKind::SineSpec,
                config(&[("ton", 250.0), ("toff", 5250.0), ("hypamp", 0.0), ("amp", 50.0)]),
                5500.0,
                1.0,
            ),
        ]
    }
    #[test]
    fn round_trip_reproduces_every_shape() {
        for (kind, full, tend, tolerance) in cases() {
            let reader = ReaderData::new();
            let source = Ecode::from_config(kind, kind.default_name(), &full, &reader, DT, tend).unwrap();
            let (t, signal) = source.generate().unwrap();
            let trace = Trace::new(t, Some(signal.clone()), None).unwrap();
            let recovered =
                Ecode::interpret(kind, kind.default_name(), &trace, &timings_only(kind, &full), &reader)
                    .unwrap();
            assert_eq!(recovered.tend(), Some(tend), "{kind:?}");
            let (_, regenerated) = recovered.generate().unwrap();
            let diff = max_abs_diff(&signal, &regenerated);
            assert!(diff <= tolerance, "{kind:?}: max deviation {diff}");
        }
    }
    #[test]
    fn spike_train_round_trip() {
        let full = config(&[
            ("ton", 100.0),
            ("delta", 100.0),
            ("n_spikes", 3.0),
            ("spike_duration", 5.0),
            ("hypamp", -10.0),
            ("amp", 2000.0),
        ]);
        let reader = ReaderData::new();
        let source = Ecode::from_config(EcodeKind::SpikeRec, "SpikeRec", &full, &reader, DT, 600.0).unwrap();
        assert_eq!(source.pulse_onsets(), &[100.0, 200.0, 300.0]);
        assert_eq!(source.timing("toff"), Some(305.0));
        let (t, signal) = source.generate().unwrap();
        let trace = Trace::new(t, Some(signal.clone()), None).unwrap();
        let recovered = Ecode::interpret(EcodeKind::SpikeRec, "SpikeRec", &trace, &ConfigData::new(), &reader).unwrap();
        assert_eq!(recovered.pulse_onsets(), &[100.0, 200.0, 300.0]);
        assert_eq!(recovered.amplitude("hypamp"), Some(-10.0));
        assert_eq!(recovered.amplitude("amp"), Some(2000.0));
        assert_eq!(recovered.timing("spike_duration"), Some(5.0));
        assert_eq!(recovered.timing("delta"), Some(100.0));
        assert_eq!(recovered.timing("ton"), Some(100.0));
        let (_, regenerated) = recovered.generate().unwrap();
        assert_eq!(max_abs_diff(&signal, &regenerated), 0.0);
    }
    #[test]
    fn configured_hypamp_does_not_disturb_pulse_detection() {
        let full = config(&[
            ("ton", 100.0),
            ("delta", 100.0),
            ("n_spikes", 3.0),
            ("spike_duration", 5.0),
            ("hypamp", -10.0),
            ("amp", 2010.0),
        ]);
        let reader = ReaderData::new();
        let source = Ecode::from_config(EcodeKind::SpikeRec, "SpikeRec", &full, &reader, DT, 1000.0).unwrap();
        let (t, signal) = source.generate().unwrap();
        let trace = Trace::new(t, Some(signal), None).unwrap();
        let ecode = Ecode::interpret(
            EcodeKind::SpikeRec,
            "SpikeRec",
            &trace,
            &config(&[("hypamp", 0.0)]),
            &reader,
        )
        .unwrap();
        assert_eq!(ecode.pulse_onsets(), &[100.0, 200.0, 300.0]);
        assert_eq!(ecode.amplitude("hypamp"), Some(0.0));
        assert_eq!(ecode.amplitude("amp"), Some(2000.0));
        assert_eq!(ecode.timing("toff"), Some(305.0));
    }
    #[test]
    fn spike_count_is_limited_to_the_sweep() {
        let full = config(&[
            ("ton", 100.0),
            ("delta", 100.0),
            ("n_spikes", 1e12),
            ("spike_duration", 5.0),
        ]);
        let ecode =
            Ecode::from_config(EcodeKind::SpikeRec, "SpikeRec", &full, &ReaderData::new(), DT, 600.0)
                .unwrap();
        assert_eq!(ecode.pulse_onsets(), &[100.0, 200.0, 300.0, 400.0, 500.0]);
        assert_eq!(ecode.timing("toff"), Some(505.0));
    }
    #[test]
    fn generate_rejects_timings_past_tend() {
        let full = config(&[("ton", 100.0), ("toff", 5000.0), ("hypamp", 0.0), ("amp", 300.0)]);
        let ecode = Ecode::from_config(EcodeKind::Step, "IDRest", &full, &ReaderData::new(), DT, 1000.0).unwrap();
        match ecode.generate().unwrap_err() {
            EcodeError::TimingOutOfRange { key, value_ms, tend_ms, .. } => {
                assert_eq!(key, "toff");
                assert_eq!((value_ms, tend_ms), (5000.0, 1000.0));
            }
            other => panic!("unexpected error {other}"),
        }
    }
    #[test]
    fn step_end_to_end_within_one_sample() {
        let mut current = Array1::zeros(4000);
        current.slice_mut(ndarray::s![400..2800]).fill(300.0);
        let trace = Trace::from_current(DT, current).unwrap();
        let config = config(&[("ton", 100.0), ("toff", 700.0)]);
        let ecode = Ecode::interpret(EcodeKind::Step, "IDRest", &trace, &config, &ReaderData::new()).unwrap();
        assert!((ecode.timing("ton").unwrap() - 100.0).abs() <= DT);
        assert!((ecode.timing("toff").unwrap() - 700.0).abs() <= DT);
        assert!((ecode.amplitude("amp").unwrap() - 300.0).abs() < 1e-9);
        assert_eq!(ecode.amplitude("hypamp"), Some(0.0));
        let (t, regenerated) = ecode.generate().unwrap();
        assert_eq!(t.len(), 4000);
        let on = regenerated.iter().position(|&v| v > 150.0).unwrap();
        let off = regenerated.iter().rposition(|&v| v > 150.0).unwrap() + 1;
        assert!(on.abs_diff(400) <= 1 && off.abs_diff(2800) <= 1);
        let params = ecode.stimulus_parameters().unwrap();
        assert_eq!(params["delay"], Value::from(100.0));
        assert_eq!(params["duration"], Value::from(600.0));
        assert_eq!(params["totduration"], Value::from(1000.0));
        assert_eq!(params["thresh_perc"], Value::Null);
    }
    #[test]
    fn partial_timing_config_uses_all_defaults() {
        let source = Ecode::from_config(
            EcodeKind::Step,
            "IDRest",
            &config(&[("ton", 700.0), ("toff", 2700.0), ("hypamp", 0.0), ("amp", 120.0)]),
            &ReaderData::new(),
            0.5,
            3000.0,
        )
        .unwrap();
        let (t, signal) = source.generate().unwrap();
        let trace = Trace::new(t, Some(signal), None).unwrap();
        let ecode = Ecode::interpret(
            EcodeKind::Step,
            "IDRest",
            &trace,
            &config(&[("toff", 900.0)]),
            &ReaderData::new(),
        )
        .unwrap();
        assert_eq!(ecode.timing("ton"), Some(700.0));
        assert_eq!(ecode.timing("toff"), Some(2700.0));
        assert_eq!(ecode.amplitude("amp"), Some(120.0));
    }
    #[test]
    fn cheops_timings_must_increase() {
        let bad = config(&[
            ("ton", 100.0),
            ("t1", 1100.0),
            ("t2", 1000.0),
            ("t3", 2300.0),
            ("t4", 2500.0),
            ("toff", 3500.0),
            ("hypamp", 0.0),
            ("amp", 200.0),
        ]);
        let reader = ReaderData::new();
        let ecode = Ecode::from_config(EcodeKind::PosCheops, "PosCheops", &bad, &reader, DT, 3700.0).unwrap();
        match ecode.generate().unwrap_err() {
            EcodeError::NonMonotonicTiming { previous, key, .. } => {
                assert_eq!((previous.as_str(), key.as_str()), ("t1", "t2"));
            }
            other => panic!("unexpected error {other}"),
        }
        let trace = Trace::from_current(DT, Array1::zeros(14_800)).unwrap();
        let err = Ecode::interpret(EcodeKind::PosCheops, "PosCheops", &trace, &bad, &reader).unwrap_err();
        assert!(matches!(err, EcodeError::NonMonotonicTiming { .. }));
    }
    #[test]
    fn absolute_amplitude_wins_over_relative() {
        let trace = Trace::from_current(DT, Array1::zeros(4000)).unwrap();
        let config = config(&[
            ("ton", 100.0),
            ("toff", 700.0),
            ("amp", 123.0),
            ("amp_rel", 150.0),
            ("amp_threshold", 100.0),
        ]);
        let ecode = Ecode::interpret(EcodeKind::Step, "IDRest", &trace, &config, &ReaderData::new()).unwrap();
        assert_eq!(ecode.amplitude("amp"), Some(123.0));
        assert_eq!(ecode.relative_amplitude("amp"), Some(123.0));
        assert_eq!(ecode.amplitude_label().as_deref(), Some(" (123.0%)"));
    }
    #[test]
    fn relative_amplitudes_are_idempotent() {
        let mut ecode = Ecode::new(EcodeKind::HyperDePol, "HyperDePol");
        ecode
            .set_amplitude("hypamp", -20.0)
            .set_amplitude("amp", -100.0)
            .set_amplitude("amp2", 200.0);
        assert_eq!(ecode.amplitude_label(), None);
        ecode.compute_relative_amp(200.0).unwrap();
        let first = ecode.amplitudes().clone();
        ecode.compute_relative_amp(200.0).unwrap();
        assert_eq!(ecode.amplitudes(), &first);
        assert_eq!(ecode.amplitude_label().as_deref(), Some(" (-50.0%/100.0%)"));
        ecode.compute_relative_amp(400.0).unwrap();
        assert_eq!(ecode.relative_amplitude("amp2"), Some(50.0));
        assert_eq!(ecode.relative_amplitude("hypamp"), Some(-5.0));
        assert_eq!(ecode.amplitude("amp2"), Some(200.0));
    }
    #[test]
    fn generate_names_missing_parameters() {
        let mut ecode = Ecode::new(EcodeKind::Step, "IDRest");
        ecode.set_timing("ton", 100.0).set_amplitude("hypamp", 0.0);
        match ecode.generate().unwrap_err() {
            EcodeError::MissingParameters { names, .. } => {
                assert_eq!(names, ["dt", "tend", "toff", "amp"]);
            }
            other => panic!("unexpected error {other}"),
        }
        let err = ecode.stimulus_parameters().unwrap_err();
        assert!(err.to_string().contains("toff, tend, amp"));
    }
    #[test]
    fn noisy_step_is_recovered() {
        let mut rng = StdRng::seed_from_u64(7);
        let current = Array1::from_iter((0..4000).map(|i| {
            let level = if (400..2800).contains(&i) { 250.0 } else { -30.0 };
            level + rng.gen_range(-1.0..1.0)
        }));
        let trace = Trace::from_current(DT, current).unwrap();
        let config = config(&[("ton", 100.0), ("toff", 700.0)]);
        let ecode = Ecode::interpret(EcodeKind::Step, "IDRest", &trace, &config, &ReaderData::new()).unwrap();
        assert!((ecode.amplitude("hypamp").unwrap() + 30.0).abs() < 1.0);
        assert!((ecode.amplitude("amp").unwrap() - 280.0).abs() < 1.0);
    }
    #[test]
    fn vclamp_reads_command_and_extracts_features() {
        let full = config(&[("ton", 100.0), ("toff", 600.0), ("hold_v", -70.0), ("step_v", 20.0)]);
        let reader = ReaderData::new().with("amp_threshold", 100.0);
        let source = Ecode::from_config(EcodeKind::VClampStep, "rpip", &full, &reader, DT, 800.0).unwrap();
        let (t, voltage) = source.generate().unwrap();
        let current = t.mapv(|x| if (100.0..600.0).contains(&x) { -50.0 * (-(x - 100.0) / 2.0).exp() - 10.0 } else { 0.0 });
        let current_only = Trace::new(t.clone(), Some(current.clone()), None).unwrap();
        let err = Ecode::interpret(EcodeKind::VClampStep, "rpip", &current_only, &full, &reader).unwrap_err();
        assert!(matches!(err, EcodeError::MissingChannel { channel: "voltage", .. }));
        let trace = Trace::new(t, Some(current), Some(voltage)).unwrap();
        let config = timings_only(EcodeKind::VClampStep, &full);
        let mut ecode = Ecode::interpret(EcodeKind::VClampStep, "rpip", &trace, &config, &reader).unwrap();
        assert_eq!(ecode.amplitude("hold_v"), Some(-70.0));
        assert_eq!(ecode.amplitude("step_v"), Some(20.0));
        ecode.compute_relative_amp(100.0).unwrap();
        assert_eq!(ecode.relative_amplitude("step_v"), None);
        let features = ecode.vclamp_features().unwrap();
        assert!((features.peak.min.unwrap() + 60.0).abs() < 1e-9);
        assert!((features.steady_state.unwrap() + 10.0).abs() < 1e-6);
        assert!((features.decay_tau.unwrap() - 2.0).abs() < 1e-3);
        let params = ecode.stimulus_parameters().unwrap();
        assert_eq!(params["amp"], Value::from(20.0));
        assert_eq!(params["hold_v"], Value::from(-70.0));
        assert_eq!(params["thresh_perc"], Value::Null);
        let exported = ecode.export();
        assert_eq!(exported["clamp_mode"], Value::from("V"));
        assert!(exported["vclamp_features"]["decay_tau"].is_number());
    }
    #[test]
    fn export_covers_declared_attributes() {
        let mut ecode = Ecode::from_config(
            EcodeKind::Sahp,
            "sAHP",
            &config(&[("ton", 100.0), ("tmid", 300.0), ("tmid2", 500.0), ("toff", 800.0), ("amp", 400.0)]),
            &ReaderData::new(),
            DT,
            1000.0,
        )
        .unwrap();
        ecode.compute_relative_amp(200.0).unwrap();
        let exported = ecode.export();
        let object = exported.as_object().unwrap();
        assert_eq!(object.len(), ecode.export_attr().len());
        assert_eq!(exported["tmid2"], Value::from(500.0));
        assert_eq!(exported["amp_rel"], Value::from(200.0));
        assert_eq!(exported["amp2"], Value::Null);
        assert_eq!(exported["hypamp_rel"], Value::Null);
    }
}
