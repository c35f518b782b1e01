use crate::activation::ShiftedLogistic;
use crate::network::NetworkWeights;

/// Per-sample forward and backward computation.
///
/// Holds the `depth x width` node and error grids so a worker can reuse
/// them across samples. Weights are only read; gradients go into a buffer
/// owned by the caller.
#[derive(Debug, Clone)]
pub struct Propagation {
    depth: usize,
    width: usize,
    nodes: Vec<f64>,
    errors: Vec<f64>,
    activator: ShiftedLogistic,
}

impl Propagation {
    pub fn new(depth: usize, width: usize) -> Propagation {
        Propagation {
            depth,
            width,
            nodes: vec![0.0; depth * width],
            errors: vec![0.0; depth * width],
            activator: ShiftedLogistic,
        }
    }

    /// Scratch sized for `weights`.
    pub fn for_weights(weights: &NetworkWeights) -> Propagation {
        Propagation::new(weights.depth(), weights.width())
    }

    /// Activations of `layer` from the last forward pass.
    pub fn layer(&self, layer: usize) -> &[f64] {
        &self.nodes[layer * self.width..(layer + 1) * self.width]
    }

    /// Runs the network on `input` and returns the score in `(0, 1)`.
    ///
    /// Layer 0 is the input itself; every later node is the shifted logistic
    /// of the previous layer dotted with its weight row. The score is the
    /// shifted logistic of the last layer's sum, lifted by 0.5.
    pub fn forward(&mut self, weights: &NetworkWeights, input: &[f64]) -> f64 {
        let w = self.width;
        debug_assert_eq!(input.len(), w);
        debug_assert!(weights.depth() == self.depth && weights.width() == w);

        self.nodes[..w].copy_from_slice(input);

        for i in 1..self.depth {
            let (done, rest) = self.nodes.split_at_mut(i * w);
            let prev = &done[(i - 1) * w..];
            for (j, node) in rest[..w].iter_mut().enumerate() {
                let pre: f64 = prev.iter().zip(weights.row(i - 1, j)).map(|(n, c)| n * c).sum();
                *node = self.activator.function(pre);
            }
        }

        let sum: f64 = self.layer(self.depth - 1).iter().sum();
        self.activator.function(sum) + 0.5
    }

    /// Backpropagates the error of the last forward pass and adds the
    /// resulting gradient into `gradients`.
    ///
    /// `target` is 0 or 1 and `class_bias` the prevalence of the other
    /// class. The output error is shared evenly over the last layer.
    pub fn backward(
        &mut self,
        weights: &NetworkWeights,
        score: f64,
        target: f64,
        class_bias: f64,
        gradients: &mut NetworkWeights,
    ) {
        let w = self.width;
        let last = self.depth - 1;
        let f = self.activator;

        let error = (target - score) * class_bias * f.derivative_from_output(score - 0.5);
        let spread = error / w as f64;

        for j in 0..w {
            self.errors[last * w + j] = spread * f.derivative_from_output(self.nodes[last * w + j]);
        }

        for i in (1..last).rev() {
            for j in 0..w {
                let mut e = 0.0;
                for k in 0..w {
                    e += self.errors[(i + 1) * w + k] * weights[(i, k, j)];
                }
                self.errors[i * w + j] = e * f.derivative_from_output(self.nodes[i * w + j]);
            }
        }

        for i in 0..last {
            for j in 0..w {
                let e = self.errors[(i + 1) * w + j];
                let row = gradients.row_mut(i, j);
                for (g, n) in row.iter_mut().zip(&self.nodes[i * w..(i + 1) * w]) {
                    *g += e * n;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sigma(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp()) - 0.5
    }

    #[test]
    fn hand_computed_score() {
        // depth 3, width 3, every weight 0.1, input [1, 0, 0]
        let weights = NetworkWeights::filled(3, 3, 0.1);
        let mut prop = Propagation::for_weights(&weights);
        let score = prop.forward(&weights, &[1.0, 0.0, 0.0]);

        let h1 = sigma(0.1);
        let h2 = sigma(0.1 * 3.0 * h1);
        let expected = sigma(3.0 * h2) + 0.5;
        assert!((score - expected).abs() < 1e-9);
        assert_relative_eq!(prop.layer(1)[2], h1);
    }

    #[test]
    fn forward_is_deterministic_and_bounded() {
        let mut weights = NetworkWeights::zeros(4, 3);
        for (n, i) in (0..3).flat_map(|l| (0..3).flat_map(move |r| (0..3).map(move |c| (l, r, c)))).enumerate() {
            weights[i] = ((n as f64) * 0.37).sin();
        }
        let mut prop = Propagation::for_weights(&weights);
        let input = [0.3, -1.2, 0.8];
        let first = prop.forward(&weights, &input);
        for _ in 0..5 {
            assert_eq!(prop.forward(&weights, &input).to_bits(), first.to_bits());
        }
        assert!(first > 0.0 && first < 1.0);
    }

    #[test]
    fn gradient_matches_manual_two_layer_case() {
        // depth 2: the only layer is the output layer.
        let weights = NetworkWeights::filled(2, 2, 0.2);
        let mut prop = Propagation::for_weights(&weights);
        let input = [1.0, 0.5];
        let score = prop.forward(&weights, &input);
        let mut grads = NetworkWeights::zeros(2, 2);
        prop.backward(&weights, score, 1.0, 0.7, &mut grads);

        let y = score - 0.5;
        let error = (1.0 - score) * 0.7 * (0.5 + y) * (0.5 - y);
        for j in 0..2 {
            let node = prop.layer(1)[j];
            let e = error / 2.0 * (0.5 + node) * (0.5 - node);
            for k in 0..2 {
                assert_relative_eq!(grads[(0, j, k)], e * input[k], epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn gradients_accumulate() {
        let weights = NetworkWeights::filled(3, 2, 0.3);
        let mut prop = Propagation::for_weights(&weights);
        let mut once = NetworkWeights::zeros(3, 2);
        let mut twice = NetworkWeights::zeros(3, 2);

        let score = prop.forward(&weights, &[0.4, 0.9]);
        prop.backward(&weights, score, 0.0, 0.5, &mut once);
        prop.backward(&weights, score, 0.0, 0.5, &mut twice);
        prop.backward(&weights, score, 0.0, 0.5, &mut twice);

        for (a, b) in once.as_slice().iter().zip(twice.as_slice()) {
            assert_relative_eq!(2.0 * a, *b, epsilon = 1e-15);
        }
        // Background target pushes the score down: positive inputs get
        // negative updates on the last layer.
        assert!(once.layer(1).iter().all(|&g| g < 0.0));
    }

    #[test]
    fn finite_difference_agrees_with_backprop() {
        // With class_bias 1 the update is -d/dw of 0.5 * (target - score)^2,
        // up to the 1/width spreading of the output error.
        let width = 2;
        let mut weights = NetworkWeights::zeros(3, width);
        let vals = [0.3, -0.2, 0.5, 0.1, -0.4, 0.25, 0.15, -0.35];
        for (w, v) in (0..2).flat_map(|l| (0..2).flat_map(move |r| (0..2).map(move |c| (l, r, c)))).zip(vals) {
            weights[w] = v;
        }
        let input = [0.6, -0.3];
        let target = 1.0;

        let mut prop = Propagation::for_weights(&weights);
        let score = prop.forward(&weights, &input);
        let mut grads = NetworkWeights::zeros(3, width);
        prop.backward(&weights, score, target, 1.0, &mut grads);

        let loss = |w: &NetworkWeights| {
            let mut p = Propagation::for_weights(w);
            let s = p.forward(w, &input);
            0.5 * (target - s) * (target - s)
        };
        let h = 1e-6;
        // Every entry carries the 1/width spreading exactly once.
        for idx in [(0, 0, 1), (0, 1, 0), (1, 1, 1), (1, 0, 0)] {
            let mut plus = weights.clone();
            plus[idx] += h;
            let mut minus = weights.clone();
            minus[idx] -= h;
            let numeric = -(loss(&plus) - loss(&minus)) / (2.0 * h);
            assert_relative_eq!(grads[idx] * width as f64, numeric, epsilon = 1e-7);
        }
    }
}
