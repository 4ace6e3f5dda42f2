use serde::{Deserialize, Serialize};
use crate::ecode::{cheops, ramp, sahp, sine_spec, spike_rec, step, two_step, vclamp};
/// The closed set of stimulus shapes an eCode can take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EcodeKind {
    Step,
    General,
    HyperDePol,
    DeHyperPol,
    PosCheops,
    NegCheops,
    Ramp,
    Sahp,
    SpikeRec,
    SineSpec,
    VClampStep,
}
impl EcodeKind {
    pub const ALL: [EcodeKind; 11] = [
        EcodeKind::Step,
        EcodeKind::General,
        EcodeKind::HyperDePol,
        EcodeKind::DeHyperPol,
        EcodeKind::PosCheops,
        EcodeKind::NegCheops,
        EcodeKind::Ramp,
        EcodeKind::Sahp,
        EcodeKind::SpikeRec,
        EcodeKind::SineSpec,
        EcodeKind::VClampStep,
    ];
    /// Protocol name used when a recording does not carry its own.
    pub fn default_name(self) -> &'static str {
        match self {
            EcodeKind::Step => "Step",
            EcodeKind::General => "general",
            EcodeKind::HyperDePol => "HyperDePol",
            EcodeKind::DeHyperPol => "DeHyperPol",
            EcodeKind::PosCheops => "PosCheops",
            EcodeKind::NegCheops => "NegCheops",
            EcodeKind::Ramp => "Ramp",
            EcodeKind::Sahp => "sAHP",
            EcodeKind::SpikeRec => "SpikeRec",
            EcodeKind::SineSpec => "SineSpec",
            EcodeKind::VClampStep => "vclamp",
        }
    }
    /// Timing keys in the order they must occur on the time axis.
    pub fn timing_keys(self) -> &'static [&'static str] {
        match self {
            EcodeKind::Step | EcodeKind::General => &step::TIMING_KEYS,
            EcodeKind::HyperDePol | EcodeKind::DeHyperPol => &two_step::TIMING_KEYS,
            EcodeKind::PosCheops | EcodeKind::NegCheops => &cheops::TIMING_KEYS,
            EcodeKind::Ramp => &ramp::TIMING_KEYS,
            EcodeKind::Sahp => &sahp::TIMING_KEYS,
            EcodeKind::SpikeRec => &spike_rec::TIMING_KEYS,
            EcodeKind::SineSpec => &sine_spec::TIMING_KEYS,
            EcodeKind::VClampStep => &vclamp::TIMING_KEYS,
        }
    }
    /// Timings substituted when the configuration is incomplete; empty when
    /// the timings are detected from the trace instead.
    pub fn default_timing(self) -> &'static [(&'static str, f64)] {
        match self {
            EcodeKind::Step | EcodeKind::General => &step::DEFAULT_TIMING_MS,
            EcodeKind::HyperDePol => &two_step::HYPERDEPOL_TIMING_MS,
            EcodeKind::DeHyperPol => &two_step::DEHYPERPOL_TIMING_MS,
            EcodeKind::PosCheops | EcodeKind::NegCheops => &cheops::DEFAULT_TIMING_MS,
            EcodeKind::Ramp => &ramp::DEFAULT_TIMING_MS,
            EcodeKind::Sahp => &sahp::DEFAULT_TIMING_MS,
            EcodeKind::SpikeRec => &[],
            EcodeKind::SineSpec => &sine_spec::DEFAULT_TIMING_MS,
            EcodeKind::VClampStep => &vclamp::DEFAULT_TIMING_MS,
        }
    }
    /// Amplitude keys, the holding level first.
    pub fn amplitude_keys(self) -> &'static [&'static str] {
        match self {
            EcodeKind::Step | EcodeKind::General => &step::AMPLITUDE_KEYS,
            EcodeKind::HyperDePol | EcodeKind::DeHyperPol => &two_step::AMPLITUDE_KEYS,
            EcodeKind::PosCheops | EcodeKind::NegCheops => &cheops::AMPLITUDE_KEYS,
            EcodeKind::Ramp => &ramp::AMPLITUDE_KEYS,
            EcodeKind::Sahp => &sahp::AMPLITUDE_KEYS,
            EcodeKind::SpikeRec => &spike_rec::AMPLITUDE_KEYS,
            EcodeKind::SineSpec => &sine_spec::AMPLITUDE_KEYS,
            EcodeKind::VClampStep => &vclamp::AMPLITUDE_KEYS,
        }
    }
    /// Amplitudes that get a `_rel` mirror once a threshold is known.
    pub fn relative_keys(self) -> &'static [&'static str] {
        match self {
            // Command voltages have no meaning relative to a current threshold.
            EcodeKind::VClampStep => &[],
            other => other.amplitude_keys(),
        }
    }
    pub fn baseline_key(self) -> &'static str {
        self.amplitude_keys()[0]
    }
    /// Amplitude reported as `amp` in the stimulus parameters.
    pub fn primary_amplitude(self) -> &'static str {
        self.amplitude_keys()[1]
    }
    pub fn export_attr(self) -> &'static [&'static str] {
        match self {
            EcodeKind::Step | EcodeKind::General => &step::EXPORT_ATTR,
            EcodeKind::HyperDePol | EcodeKind::DeHyperPol => &two_step::EXPORT_ATTR,
            EcodeKind::PosCheops | EcodeKind::NegCheops => &cheops::EXPORT_ATTR,
            EcodeKind::Ramp => &ramp::EXPORT_ATTR,
            EcodeKind::Sahp => &sahp::EXPORT_ATTR,
            EcodeKind::SpikeRec => &spike_rec::EXPORT_ATTR,
            EcodeKind::SineSpec => &sine_spec::EXPORT_ATTR,
            EcodeKind::VClampStep => &vclamp::EXPORT_ATTR,
        }
    }
}
