use serde::{Deserialize, Serialize};

/// Which population a sample was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// The majority class, target value 0.
    Background,
    /// The minority class, target value 1.
    Signal,
}

impl Label {
    /// Regression target used by the output error.
    pub fn target(self) -> f64 {
        match self {
            Label::Background => 0.0,
            Label::Signal => 1.0,
        }
    }

    pub fn is_signal(self) -> bool {
        self == Label::Signal
    }

    pub fn name(self) -> &'static str {
        match self {
            Label::Background => "background",
            Label::Signal => "signal",
        }
    }
}

/// One labeled row.
///
/// `values` holds every raw column in schema order; the last one is the
/// discriminant, the rest are model inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub values: Vec<f64>,
    pub label: Label,
}

impl Sample {
    /// Builds a sample from model inputs plus the discriminant.
    pub fn new(inputs: &[f64], discriminant: f64, label: Label) -> Sample {
        let mut values = Vec::with_capacity(inputs.len() + 1);
        values.extend_from_slice(inputs);
        values.push(discriminant);
        Sample { values, label }
    }

    pub fn inputs(&self) -> &[f64] {
        &self.values[..self.values.len().saturating_sub(1)]
    }

    pub fn inputs_mut(&mut self) -> &mut [f64] {
        let n = self.values.len().saturating_sub(1);
        &mut self.values[..n]
    }

    pub fn discriminant(&self) -> f64 {
        self.values.last().copied().unwrap_or(f64::NAN)
    }
}
