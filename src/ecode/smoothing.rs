use ndarray::{Array1, ArrayView1};
/// Window (in samples) used before any segment statistic is taken.
pub const SMOOTHING_WINDOW: usize = 85;
/// Running median of `window` samples, centred on each sample.
///
/// Edges are padded with the nearest valid sample, so the output always has the
/// same length as the input. Even windows are widened by one sample.
pub fn median_filter(signal: ArrayView1<f64>, window: usize) -> Array1<f64> {
    let n = signal.len();
    if window <= 1 || n == 0 {
        return signal.to_owned();
    }
    let half = window / 2;
    let width = 2 * half + 1;
    let mut scratch = Vec::with_capacity(width);
    Array1::from_iter((0..n).map(|i| {
        scratch.clear();
        scratch.extend((0..width).map(|k| signal[(i + k).saturating_sub(half).min(n - 1)]));
        let (_, median, _) = scratch.select_nth_unstable_by(half, f64::total_cmp);
        *median
    }))
}
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    #[test]
    fn keeps_length_and_removes_glitches() {
        let mut signal = Array1::from_elem(200, 1.0);
        signal[50] = 400.0;
        signal[51] = -300.0;
        let smooth = median_filter(signal.view(), SMOOTHING_WINDOW);
        assert_eq!(smooth.len(), 200);
        assert!(smooth.iter().all(|&v| v == 1.0));
    }
    #[test]
    fn preserves_step_edges() {
        let signal = Array1::from_iter((0..400).map(|i| if i < 200 { 0.0 } else { 300.0 }));
        let smooth = median_filter(signal.view(), SMOOTHING_WINDOW);
        assert_eq!(smooth, signal);
    }
    #[test]
    fn short_signals_use_nearest_padding() {
        let smooth = median_filter(array![3.0, 1.0, 2.0].view(), 5);
        assert_eq!(smooth, array![3.0, 2.0, 2.0]);
        let identity = median_filter(array![3.0, 1.0].view(), 1);
        assert_eq!(identity, array![3.0, 1.0]);
    }
}
