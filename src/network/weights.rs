use std::ops::{AddAssign, Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

/// Connection weights between `depth` equal-width node layers.
///
/// Stored as `depth - 1` square `width x width` matrices, flattened.
/// `(layer, row, col)` is the weight from node `col` of layer `layer` to
/// node `row` of layer `layer + 1`. The shape never changes after
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkWeights {
    depth: usize,
    width: usize,
    data: Vec<f64>,
}

impl NetworkWeights {
    pub fn zeros(depth: usize, width: usize) -> NetworkWeights {
        NetworkWeights {
            depth,
            width,
            data: vec![0.0; depth.saturating_sub(1) * width * width],
        }
    }

    /// Every weight set to `value`.
    pub fn filled(depth: usize, width: usize, value: f64) -> NetworkWeights {
        let mut res = NetworkWeights::zeros(depth, width);
        res.data.fill(value);
        res
    }

    /// Small random weights: `uniform(-range, range) / width`.
    pub fn random(depth: usize, width: usize, range: f64, rng: &dyn RandomSource) -> NetworkWeights {
        let mut res = NetworkWeights::zeros(depth, width);
        let scale = 1.0 / width as f64;
        for w in res.data.iter_mut() {
            *w = scale * rng.uniform_real(-range, range);
        }
        res
    }

    /// Number of node layers, input layer included.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of weight matrices (`depth - 1`).
    pub fn layer_count(&self) -> usize {
        self.depth.saturating_sub(1)
    }

    /// Row-major `width x width` matrix of one layer.
    pub fn layer(&self, layer: usize) -> &[f64] {
        let n = self.width * self.width;
        &self.data[layer * n..(layer + 1) * n]
    }

    /// Row `row` of layer `layer`: the weights feeding node `row` of layer
    /// `layer + 1`.
    pub fn row(&self, layer: usize, row: usize) -> &[f64] {
        let start = self.offset(layer, row, 0);
        &self.data[start..start + self.width]
    }

    pub fn row_mut(&mut self, layer: usize, row: usize) -> &mut [f64] {
        let start = self.offset(layer, row, 0);
        let width = self.width;
        &mut self.data[start..start + width]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Resets every entry to zero, keeping the shape.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    pub fn same_shape(&self, other: &NetworkWeights) -> bool {
        self.depth == other.depth && self.width == other.width
    }

    /// Largest absolute element-wise difference.
    pub fn max_abs_diff(&self, other: &NetworkWeights) -> f64 {
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    fn offset(&self, layer: usize, row: usize, col: usize) -> usize {
        (layer * self.width + row) * self.width + col
    }
}

impl Index<(usize, usize, usize)> for NetworkWeights {
    type Output = f64;

    fn index(&self, (layer, row, col): (usize, usize, usize)) -> &f64 {
        &self.data[self.offset(layer, row, col)]
    }
}

impl IndexMut<(usize, usize, usize)> for NetworkWeights {
    fn index_mut(&mut self, (layer, row, col): (usize, usize, usize)) -> &mut f64 {
        let i = self.offset(layer, row, col);
        &mut self.data[i]
    }
}

impl AddAssign<&NetworkWeights> for NetworkWeights {
    fn add_assign(&mut self, rhs: &NetworkWeights) {
        if !self.same_shape(rhs) {
            panic!("Weight tensors are of incorrect shapes")
        }

        for (w, d) in self.data.iter_mut().zip(rhs.data.iter()) {
            *w += d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SharedRng;

    #[test]
    fn shape() {
        let w = NetworkWeights::zeros(5, 3);
        assert_eq!(w.layer_count(), 4);
        assert_eq!(w.as_slice().len(), 4 * 9);
        assert_eq!(w.layer(3).len(), 9);
    }

    #[test]
    fn indexing_is_layer_row_col() {
        let mut w = NetworkWeights::zeros(3, 2);
        w[(1, 0, 1)] = 7.0;
        assert_eq!(w.row(1, 0), &[0.0, 7.0]);
        assert_eq!(w.layer(1), &[0.0, 7.0, 0.0, 0.0]);
        w.row_mut(0, 1)[0] = 2.0;
        assert_eq!(w[(0, 1, 0)], 2.0);
    }

    #[test]
    fn random_weights_are_scaled_by_width() {
        let rng = SharedRng::from_seed(3);
        let w = NetworkWeights::random(4, 8, 2.0, &rng);
        assert!(w.as_slice().iter().all(|x| x.abs() <= 2.0 / 8.0));
        assert!(w.as_slice().iter().any(|&x| x != 0.0));
    }

    #[test]
    fn add_assign_and_clear() {
        let mut a = NetworkWeights::filled(3, 2, 1.0);
        let b = NetworkWeights::filled(3, 2, 0.5);
        a += &b;
        assert!(a.as_slice().iter().all(|&x| x == 1.5));
        a.clear();
        assert!(a.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    #[should_panic]
    fn add_assign_rejects_other_shapes() {
        let mut a = NetworkWeights::zeros(3, 2);
        a += &NetworkWeights::zeros(3, 3);
    }
}
