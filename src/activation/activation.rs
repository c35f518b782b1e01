use std::f64::consts::E;

/// The shifted logistic `1 / (1 + e^-x) - 0.5`, range `(-0.5, 0.5)`.
///
/// Every hidden node uses it, and the network score is
/// `function(sum of last layer) + 0.5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShiftedLogistic;

impl ShiftedLogistic {
    pub fn function(&self, x: f64) -> f64 {
        1.0 / (1.0 + E.powf(-x)) - 0.5
    }

    /// Derivative with respect to the pre-activation, expressed through the
    /// activation's own output `y = function(x)`: `(0.5 + y)(0.5 - y)`.
    pub fn derivative_from_output(&self, y: f64) -> f64 {
        (0.5 + y) * (0.5 - y)
    }
}
