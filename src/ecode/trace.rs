use ndarray::Array1;
use crate::ecode::EcodeError;
/// One recorded sweep: time (ms), current and, optionally, voltage.
#[derive(Clone, Debug)]
pub struct Trace {
    t: Array1<f64>,
    current: Option<Array1<f64>>,
    voltage: Option<Array1<f64>>,
}
impl Trace {
    pub fn new(
        t: Array1<f64>,
        current: Option<Array1<f64>>,
        voltage: Option<Array1<f64>>,
    ) -> Result<Self, EcodeError> {
        if t.len() < 2 {
            return Err(EcodeError::InvalidTrace(format!(
                "need at least two samples, got {}",
                t.len()
            )));
        }
        for (label, channel) in [("current", &current), ("voltage", &voltage)] {
            if let Some(values) = channel {
                if values.len() != t.len() {
                    return Err(EcodeError::InvalidTrace(format!(
                        "{label} has {} samples but time has {}",
                        values.len(),
                        t.len()
                    )));
                }
            }
        }
        let dt = t[1] - t[0];
        if !dt.is_finite() || dt <= 0.0 {
            return Err(EcodeError::InvalidTrace(format!(
                "sampling step must be positive, got {dt}"
            )));
        }
        if let Some(pos) = t.iter().zip(t.iter().skip(1)).position(|(a, b)| b <= a) {
            return Err(EcodeError::InvalidTrace(format!(
                "time is not strictly increasing at sample {}",
                pos + 1
            )));
        }
        Ok(Self { t, current, voltage })
    }
    /// Convenience constructor for a current-only trace sampled every `dt` ms from 0.
    pub fn from_current(dt: f64, current: Array1<f64>) -> Result<Self, EcodeError> {
        let t = Array1::from_iter((0..current.len()).map(|i| i as f64 * dt));
        Self::new(t, Some(current), None)
    }
    pub fn time(&self) -> &Array1<f64> {
        &self.t
    }
    pub fn current(&self) -> Option<&Array1<f64>> {
        self.current.as_ref()
    }
    pub fn voltage(&self) -> Option<&Array1<f64>> {
        self.voltage.as_ref()
    }
    pub fn len(&self) -> usize {
        self.t.len()
    }
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
    pub fn dt(&self) -> f64 {
        self.t[1] - self.t[0]
    }
    /// `len * dt`, the `tend` every eCode reports after interpretation.
    pub fn duration(&self) -> f64 {
        self.len() as f64 * self.dt()
    }
}
