use crate::data::sample::{Label, Sample};

/// Fraction of the post-filter dataset kept for training, as `NUM / DEN`.
const TRAIN_NUM: usize = 9;
const TRAIN_DEN: usize = 10;

/// Filtered, shuffled and normalised samples, split once into a training
/// prefix and an evaluation suffix.
///
/// Immutable after construction.
#[derive(Debug, Clone)]
pub struct Dataset {
    samples: Vec<Sample>,
    cutoff: usize,
    fraction_background: f64,
}

impl Dataset {
    /// Wraps samples in their final order. The cutoff is
    /// `floor(len * 9 / 10)`.
    pub fn new(samples: Vec<Sample>) -> Dataset {
        let cutoff = samples.len() * TRAIN_NUM / TRAIN_DEN;
        let fraction_background = background_fraction(&samples);
        Dataset { samples, cutoff, fraction_background }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Index of the first evaluation sample.
    pub fn cutoff(&self) -> usize {
        self.cutoff
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn training(&self) -> &[Sample] {
        &self.samples[..self.cutoff]
    }

    pub fn evaluation(&self) -> &[Sample] {
        &self.samples[self.cutoff..]
    }

    /// Input width (number of model-input features).
    pub fn width(&self) -> usize {
        self.samples.first().map_or(0, |s| s.inputs().len())
    }

    /// Share of background samples in the whole dataset.
    pub fn fraction_background(&self) -> f64 {
        self.fraction_background
    }

    pub fn fraction_signal(&self) -> f64 {
        1.0 - self.fraction_background
    }

    /// Weight applied to the output error of a sample with `label`:
    /// the prevalence of the other class.
    pub fn class_bias(&self, label: Label) -> f64 {
        match label {
            Label::Signal => self.fraction_background(),
            Label::Background => self.fraction_signal(),
        }
    }
}

/// `background / total`, or 0 for no samples.
pub fn background_fraction(samples: &[Sample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let background = samples.iter().filter(|s| s.label == Label::Background).count();
    background as f64 / samples.len() as f64
}
