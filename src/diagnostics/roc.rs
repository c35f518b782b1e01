use log::warn;
use serde::{Deserialize, Serialize};

use crate::data::sample::{Label, Sample};

/// Number of score cuts scanned, evenly spaced over `(0, 1]`.
pub const CUTS: usize = 10_000;

/// Receiver operating characteristic of a set of scores.
///
/// `points` are `(false positive rate, true positive rate)` pairs, one per
/// cut, with signal as the positive class. `auc` is the trapezoidal area
/// starting from `(1, 1)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocCurve {
    pub auc: f64,
    pub points: Vec<(f64, f64)>,
}

impl RocCurve {
    /// `scores[i]` belongs to `samples[i]`.
    pub fn build(scores: &[f64], samples: &[Sample]) -> RocCurve {
        let mut signal = Vec::new();
        let mut background = Vec::new();
        for (&score, sample) in scores.iter().zip(samples) {
            match sample.label {
                Label::Signal => signal.push(score),
                Label::Background => background.push(score),
            }
        }
        if signal.is_empty() || background.is_empty() {
            warn!(
                "ROC curve over {} signal and {} background scores; missing class reads as rate 0",
                signal.len(),
                background.len()
            );
        }
        signal.sort_by(f64::total_cmp);
        background.sort_by(f64::total_cmp);

        let mut points = Vec::with_capacity(CUTS);
        let mut area = 0.0;
        let mut prev_signal = 1.0;
        let mut prev_background = 1.0;

        for i in 1..=CUTS {
            let cut = i as f64 / CUTS as f64;
            let next_signal = pass_rate(&signal, cut);
            let next_background = pass_rate(&background, cut);

            area += (prev_background - next_background) * (next_signal + prev_signal) / 2.0;

            prev_signal = next_signal;
            prev_background = next_background;
            points.push((next_background, next_signal));
        }

        RocCurve { auc: area, points }
    }
}

/// Fraction of `sorted` not below `cut`.
fn pass_rate(sorted: &[f64], cut: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let below = sorted.partition_point(|&v| v < cut);
    (sorted.len() - below) as f64 / sorted.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn labeled(signal: &[f64], background: &[f64]) -> (Vec<f64>, Vec<Sample>) {
        let mut scores = Vec::new();
        let mut samples = Vec::new();
        for &s in signal {
            scores.push(s);
            samples.push(Sample::new(&[0.0], 0.0, Label::Signal));
        }
        for &b in background {
            scores.push(b);
            samples.push(Sample::new(&[0.0], 0.0, Label::Background));
        }
        (scores, samples)
    }

    #[test]
    fn perfect_separation() {
        let (scores, samples) = labeled(&[0.9, 0.8], &[0.1, 0.2, 0.3]);
        let roc = RocCurve::build(&scores, &samples);
        assert_relative_eq!(roc.auc, 1.0, epsilon = 1e-12);
        assert_eq!(roc.points.len(), CUTS);
        assert_eq!(*roc.points.last().unwrap(), (0.0, 0.0));
    }

    #[test]
    fn no_separation() {
        let (scores, samples) = labeled(&[0.5, 0.5], &[0.5, 0.5]);
        let roc = RocCurve::build(&scores, &samples);
        assert_relative_eq!(roc.auc, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn inverted_separation() {
        let (scores, samples) = labeled(&[0.15], &[0.85]);
        let roc = RocCurve::build(&scores, &samples);
        assert_relative_eq!(roc.auc, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn rates_are_monotone() {
        let (scores, samples) = labeled(&[0.3, 0.7, 0.72, 0.9], &[0.05, 0.4, 0.75]);
        let roc = RocCurve::build(&scores, &samples);
        for pair in roc.points.windows(2) {
            assert!(pair[1].0 <= pair[0].0);
            assert!(pair[1].1 <= pair[0].1);
        }
        assert!(roc.auc > 0.5 && roc.auc < 1.0);
    }
}
