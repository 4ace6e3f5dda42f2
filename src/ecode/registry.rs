use std::collections::HashMap;
use once_cell::sync::Lazy;
use crate::ecode::{EcodeError, EcodeKind};
/// Protocol names as found in recordings, lower case, mapped to their shape.
pub static ECODES: Lazy<HashMap<&'static str, EcodeKind>> = Lazy::new(|| {
    use EcodeKind::*;
    HashMap::from([
        ("spontaneous", Step),
        ("idrest", Step),
        ("idthresh", Step),
        ("idthres", Step),
        ("idthreshold", Step),
        ("apwaveform", Step),
        ("iv", Step),
        ("step", Step),
        ("genericstep", Step),
        ("spontaps", Step),
        ("sponaps", Step),
        ("firepattern", Step),
        ("sponnohold30", Step),
        ("sponhold30", Step),
        ("spontnohold30", Step),
        ("sponthold30", Step),
        ("spontaneousnohold", Step),
        ("starthold", Step),
        ("startnohold", Step),
        ("delta", Step),
        ("looffset", Step),
        ("rac", Step),
        ("resetitc", Step),
        ("rin", Step),
        ("s30", Step),
        ("setampl", Step),
        ("setisi", Step),
        ("testampl", Step),
        ("testrheo", Step),
        ("pulser", Step),
        ("sahp", Sahp),
        ("idhyperpol", Sahp),
        ("irdepol", Sahp),
        ("irhyperpol", Sahp),
        ("iddepol", Sahp),
        ("ramp", Ramp),
        ("ap_thresh", Ramp),
        ("apthresh", Ramp),
        ("apthreshold", Ramp),
        ("hyperdepol", HyperDePol),
        ("dehyperpol", DeHyperPol),
        ("negcheops", NegCheops),
        ("poscheops", PosCheops),
        ("spikerec", SpikeRec),
        ("h10s8", SpikeRec),
        ("h20s8", SpikeRec),
        ("spuls", SpikeRec),
        ("sinespec", SineSpec),
        ("calou01", General),
        ("calou04", General),
        ("eleccal", General),
        ("ou10", General),
        ("rpip", VClampStep),
        ("rsealclose", VClampStep),
        ("rsealopen", VClampStep),
        ("s2protocol", VClampStep),
    ])
});
/// Case-insensitive lookup of a protocol name.
pub fn lookup(protocol_name: &str) -> Result<EcodeKind, EcodeError> {
    ECODES
        .get(protocol_name.to_lowercase().as_str())
        .copied()
        .ok_or_else(|| EcodeError::UnknownProtocol(protocol_name.to_owned()))
}
