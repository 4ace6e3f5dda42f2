use thiserror::Error;
#[derive(Debug, Error)]
pub enum EcodeError {
    #[error("invalid trace: {0}")]
    InvalidTrace(String),
    #[error("{protocol} needs a {channel} trace to be interpreted")]
    MissingChannel {
        protocol: String,
        channel: &'static str,
    },
    #[error("unknown eCode protocol: {0}")]
    UnknownProtocol(String),
    #[error("one or more required attributes ({}) are not set for {protocol}", names.join(", "))]
    MissingParameters {
        protocol: String,
        names: Vec<String>,
    },
    #[error("timings of {protocol} are not strictly increasing: {key} ({value_ms} ms) is not after {previous} ({previous_ms} ms)")]
    NonMonotonicTiming {
        protocol: String,
        previous: String,
        previous_ms: f64,
        key: String,
        value_ms: f64,
    },
    #[error("timing {key} of {protocol} ({value_ms} ms) falls outside the trace ({tend_ms} ms)")]
    TimingOutOfRange {
        protocol: String,
        key: String,
        value_ms: f64,
        tend_ms: f64,
    },
    #[error("timing {key} of {protocol} must be a finite, non-negative offset, got {value_ms} ms")]
    InvalidTiming {
        protocol: String,
        key: String,
        value_ms: f64,
    },
    #[error("cannot estimate {name} for {protocol}: the window is empty")]
    EmptySegment { protocol: String, name: String },
    #[error("no stimulus pulse detected in the {protocol} current")]
    NoPulseDetected { protocol: String },
    #[error("amplitude threshold must be finite and non-zero, got {0}")]
    InvalidThreshold(f64),
}
