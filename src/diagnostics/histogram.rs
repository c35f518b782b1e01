use crate::data::dataset::background_fraction;
use crate::data::sample::{Label, Sample};

/// Number of equal-width score buckets over `[0, 1)`.
pub const BUCKETS: usize = 1000;

/// Score distribution per label, reweighted so both classes carry the same
/// total mass: signal entries count the background fraction and vice versa.
#[derive(Debug, Clone)]
pub struct ScoreHistogram {
    pub background: Vec<f64>,
    pub signal: Vec<f64>,
}

impl ScoreHistogram {
    /// `scores[i]` belongs to `samples[i]`; NaN scores are skipped.
    pub fn build(scores: &[f64], samples: &[Sample]) -> ScoreHistogram {
        let fraction_background = background_fraction(samples);
        let mut hist = ScoreHistogram {
            background: vec![0.0; BUCKETS],
            signal: vec![0.0; BUCKETS],
        };

        for (&score, sample) in scores.iter().zip(samples) {
            if score.is_nan() {
                continue;
            }
            let bucket = ((score * BUCKETS as f64).max(0.0) as usize).min(BUCKETS - 1);
            match sample.label {
                Label::Signal => hist.signal[bucket] += fraction_background,
                Label::Background => hist.background[bucket] += 1.0 - fraction_background,
            }
        }
        hist
    }

    pub fn buckets(&self, label: Label) -> &[f64] {
        match label {
            Label::Background => &self.background,
            Label::Signal => &self.signal,
        }
    }

    /// `(bucket start, log10(weight))` for every non-empty bucket.
    pub fn log_points(&self, label: Label) -> Vec<(f64, f64)> {
        self.buckets(label)
            .iter()
            .enumerate()
            .filter(|(_, &w)| w > 0.0)
            .map(|(i, &w)| (i as f64 / BUCKETS as f64, w.log10()))
            .collect()
    }
}
