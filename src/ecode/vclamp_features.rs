//! Current-response features of voltage-clamp steps.
//!
//! Every function returns `None` when its window is unusable. Only the
//! exponential fit swallows a failure (non-convergence is routine on noisy
//! recordings); it is logged at debug level.
use log::debug;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
/// Window over which the steady-state current is averaged, ending at `toff`.
pub const STEADY_STATE_TAIL_MS: f64 = 5.0;
/// Length of the transient fitted after `ton`.
pub const DECAY_WINDOW_MS: f64 = 10.0;
/// Model evaluations allowed to the decay fit before it gives up.
pub const MAX_FIT_EVALUATIONS: usize = 2000;
const INITIAL_TAU_MS: f64 = 2.0;
const MIN_FIT_SAMPLES: usize = 5;
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakCurrent {
    /// Most inward current.
    pub min: Option<f64>,
    /// Most outward current.
    pub max: Option<f64>,
}
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VClampFeatures {
    pub peak: PeakCurrent,
    pub steady_state: Option<f64>,
    pub charge: Option<f64>,
    pub decay_tau: Option<f64>,
}
impl VClampFeatures {
    pub fn extract(
        t: ArrayView1<f64>,
        current: ArrayView1<f64>,
        ton: Option<f64>,
        toff: Option<f64>,
    ) -> Self {
        Self {
            peak: extract_peak_current(t, current, ton, toff),
            steady_state: extract_steady_state_current(t, current, toff, STEADY_STATE_TAIL_MS),
            charge: extract_charge(t, current, ton, toff),
            decay_tau: ton.and_then(|ton| fit_exponential_decay(t, current, ton, ton + DECAY_WINDOW_MS)),
        }
    }
}
/// `(time, current)` samples with `start <= time <= end`.
fn window(t: ArrayView1<f64>, current: ArrayView1<f64>, start: f64, end: f64) -> Vec<(f64, f64)> {
    t.iter()
        .zip(current.iter())
        .filter(|&(&time, _)| time >= start && time <= end)
        .map(|(&time, &value)| (time, value))
        .collect()
}
/// Min and max of the current within `[ton, toff]`.
pub fn extract_peak_current(
    t: ArrayView1<f64>,
    current: ArrayView1<f64>,
    ton: Option<f64>,
    toff: Option<f64>,
) -> PeakCurrent {
    let (Some(ton), Some(toff)) = (ton, toff) else {
        return PeakCurrent::default();
    };
    window(t, current, ton, toff).into_iter().fold(PeakCurrent::default(), |peak, (_, value)| PeakCurrent {
        min: Some(peak.min.map_or(value, |m| m.min(value))),
        max: Some(peak.max.map_or(value, |m| m.max(value))),
    })
}
/// Mean current over the last `tail_ms` before `toff`.
///
/// `None` when `toff` lies beyond the recorded sweep.
pub fn extract_steady_state_current(
    t: ArrayView1<f64>,
    current: ArrayView1<f64>,
    toff: Option<f64>,
    tail_ms: f64,
) -> Option<f64> {
    let toff = toff?;
    if t.len() < 2 || toff > t[t.len() - 1] {
        return None;
    }
    let dt = t[1] - t[0];
    let n = ((tail_ms / dt) as usize).max(1);
    let end = t.iter().take_while(|&&time| time < toff).count();
    let start = end.saturating_sub(n);
    let segment = current.slice(ndarray::s![start..end]);
    segment.mean()
}
/// Trapezoidal integral of the current over `[ton, toff]` (pA·ms = fC).
pub fn extract_charge(
    t: ArrayView1<f64>,
    current: ArrayView1<f64>,
    ton: Option<f64>,
    toff: Option<f64>,
) -> Option<f64> {
    let samples = window(t, current, ton?, toff?);
    if samples.len() < 2 {
        return None;
    }
    Some(
        samples
            .windows(2)
            .map(|w| 0.5 * (w[0].1 + w[1].1) * (w[1].0 - w[0].0))
            .sum(),
    )
}
/// Time constant of `a * exp(-x / tau) + c` fitted to `[start, end]`, in ms.
pub fn fit_exponential_decay(
    t: ArrayView1<f64>,
    current: ArrayView1<f64>,
    start: f64,
    end: f64,
) -> Option<f64> {
    let samples = window(t, current, start, end);
    if samples.len() < MIN_FIT_SAMPLES {
        return None;
    }
    let t0 = samples[0].0;
    let x: Vec<f64> = samples.iter().map(|(time, _)| time - t0).collect();
    let y: Vec<f64> = samples.iter().map(|(_, value)| *value).collect();
    match levenberg_marquardt(&x, &y) {
        Ok([_, tau, _]) => Some(tau.abs()),
        Err(reason) => {
            debug!("exponential decay fit over [{start}, {end}] ms failed: {reason}");
            None
        }
    }
}
fn model(p: &[f64; 3], x: f64) -> f64 {
    p[0] * (-x / p[1]).exp() + p[2]
}
fn sum_of_squares(p: &[f64; 3], x: &[f64], y: &[f64]) -> f64 {
    x.iter()
        .zip(y)
        .map(|(&xi, &yi)| {
            let r = model(p, xi) - yi;
            r * r
        })
        .sum()
}
fn levenberg_marquardt(x: &[f64], y: &[f64]) -> Result<[f64; 3], &'static str> {
    let first = y[0];
    let last = y[y.len() - 1];
    let mut p = [first - last, INITIAL_TAU_MS, last];
    let mut cost = sum_of_squares(&p, x, y);
    let mut evaluations = 1;
    let mut lambda = 1e-3;
    while evaluations < MAX_FIT_EVALUATIONS {
        if cost == 0.0 {
            return Ok(p);
        }
        let mut jtj = [[0.0; 3]; 3];
        let mut jtr = [0.0; 3];
        for (&xi, &yi) in x.iter().zip(y) {
            let e = (-xi / p[1]).exp();
            let r = p[0] * e + p[2] - yi;
            let jac = [e, p[0] * xi * e / (p[1] * p[1]), 1.0];
            for a in 0..3 {
                jtr[a] += jac[a] * r;
                for b in 0..3 {
                    jtj[a][b] += jac[a] * jac[b];
                }
            }
        }
        let mut damped = jtj;
        for (a, row) in damped.iter_mut().enumerate() {
            row[a] += lambda * jtj[a][a].max(1e-9);
        }
        let step = solve3(damped, [-jtr[0], -jtr[1], -jtr[2]]).ok_or("singular normal equations")?;
        let candidate = [p[0] + step[0], p[1] + step[1], p[2] + step[2]];
        let candidate_cost = sum_of_squares(&candidate, x, y);
        evaluations += 1;
        let small_step = step
            .iter()
            .zip(&p)
            .all(|(d, v)| d.abs() <= 1e-10 * (v.abs() + 1e-10));
        if candidate_cost.is_finite() && candidate_cost < cost && candidate[1] != 0.0 {
            let reduction = (cost - candidate_cost) / cost;
            p = candidate;
            cost = candidate_cost;
            lambda = (lambda * 0.1).max(1e-12);
            if reduction < 1e-12 || small_step {
                return Ok(p);
            }
        } else if small_step {
            return Ok(p);
        } else {
            lambda *= 10.0;
            if !lambda.is_finite() {
                return Err("damping diverged");
            }
        }
    }
    Err("maximum number of evaluations reached")
}
/// Gaussian elimination with partial pivoting.
fn solve3(mut a: [[f64; 3]; 3], mut b: [f64; 3]) -> Option<[f64; 3]> {
    for col in 0..3 {
        let pivot = (col..3).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if !(a[pivot][col].abs() > 1e-300) {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..3 {
            let factor = a[row][col] / a[col][col];
            for k in col..3 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut out = [0.0; 3];
    for row in (0..3).rev() {
        let tail: f64 = (row + 1..3).map(|k| a[row][k] * out[k]).sum();
        out[row] = (b[row] - tail) / a[row][row];
    }
    out.iter().all(|v| v.is_finite()).then_some(out)
}
