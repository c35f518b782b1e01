use std::io::Write;

use crate::network::weights::NetworkWeights;

/// Receives weight snapshots when the operator asks for them.
pub trait WeightReport: Send {
    fn report(&mut self, weights: &NetworkWeights) -> std::io::Result<()>;
}

/// Prints each layer as a grid of fixed-point numbers.
///
/// ```text
/// connections layer 0:
///  0.012000   -0.250000
/// ```
pub struct TextReport<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> TextReport<W> {
    pub fn new(out: W) -> TextReport<W> {
        TextReport { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TextReport<std::io::Stdout> {
    pub fn stdout() -> TextReport<std::io::Stdout> {
        TextReport::new(std::io::stdout())
    }
}

impl<W: Write + Send> WeightReport for TextReport<W> {
    fn report(&mut self, weights: &NetworkWeights) -> std::io::Result<()> {
        write_connections(&mut self.out, weights)?;
        self.out.flush()
    }
}

/// Writes the per-layer grid to `out`.
pub fn write_connections(out: &mut impl Write, weights: &NetworkWeights) -> std::io::Result<()> {
    for layer in 0..weights.layer_count() {
        writeln!(out, "\nconnections layer {}:", layer)?;

        for row in 0..weights.width() {
            for &weight in weights.row(layer, row) {
                // Positive values get a leading space so columns line up.
                let pad = if weight.is_sign_negative() { "" } else { " " };
                write!(out, "{}{:.6}  ", pad, weight)?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_layout() {
        let mut w = NetworkWeights::zeros(2, 2);
        w[(0, 0, 0)] = 0.5;
        w[(0, 1, 1)] = -0.25;
        let mut report = TextReport::new(Vec::new());
        report.report(&w).unwrap();
        let text = String::from_utf8(report.into_inner()).unwrap();
        assert_eq!(
            text,
            "\nconnections layer 0:\n 0.500000   0.000000  \n 0.000000  -0.250000  \n"
        );
    }
}
