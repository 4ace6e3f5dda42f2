// src/ecode/mod.rs
// 声明同级目录下的子模块文件
pub mod amplitude;
mod cheops;
pub mod config;
pub mod error;
mod interpretation;
pub mod kind;
pub mod protocol;
mod ramp;
pub mod registry;
pub mod rheobase;
mod sahp;
mod sine_spec;
pub mod smoothing;
mod spike_rec;
pub mod stats;
mod step;
pub mod timing;
pub mod trace;
mod two_step;
pub mod vclamp;
pub mod vclamp_features;
mod waveform;
// 公开导出这些模块里的结构体，方便外部调用
pub use amplitude::{AmplitudeSet, AmplitudeSource};
pub use config::{ConfigData, ReaderData};
pub use error::EcodeError;
pub use kind::EcodeKind;
pub use protocol::Ecode;
pub use registry::{lookup, ECODES};
pub use rheobase::normalize_to_rheobase;
pub use smoothing::{median_filter, SMOOTHING_WINDOW};
pub use timing::TimingSet;
pub use trace::Trace;
pub use vclamp_features::{
    extract_charge, extract_peak_current, extract_steady_state_current, fit_exponential_decay,
    PeakCurrent, VClampFeatures,
};
