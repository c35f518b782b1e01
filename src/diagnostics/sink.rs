use std::fmt::Display;
use std::ops::Range;
use std::path::{Path, PathBuf};

use log::{info, warn};
use plotters::prelude::*;

use crate::data::sample::{Label, Sample};
use crate::diagnostics::histogram::ScoreHistogram;
use crate::diagnostics::roc::RocCurve;
use crate::error::{Error, Result};

pub const HISTOGRAM_FILE: &str = "log_predictions.png";
pub const ROC_FILE: &str = "ROC_curve.png";
pub const ROC_JSON_FILE: &str = "ROC_curve.json";

const GREY: RGBColor = RGBColor(190, 190, 190);

/// Receives evaluation scores after an evaluation run has finished.
///
/// `scores[i]` is the score of `samples[i]`; callers guarantee equal
/// lengths.
pub trait VisualizationSink: Send {
    fn render(&mut self, scores: &[f64], samples: &[Sample]) -> Result<()>;
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl VisualizationSink for NullSink {
    fn render(&mut self, _scores: &[f64], _samples: &[Sample]) -> Result<()> {
        Ok(())
    }
}

/// Writes `log_predictions.png`, `ROC_curve.png` and `ROC_curve.json`
/// into `output_dir`.
///
/// Axis titles, legends and the AUC label need a system font. Without one
/// the charts are still written, unlabelled, and a warning is logged.
#[derive(Debug, Clone)]
pub struct PngSink {
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl PngSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> PngSink {
        PngSink { output_dir: output_dir.into(), width: 1500, height: 950 }
    }

    fn histogram(&self, scores: &[f64], samples: &[Sample]) -> Result<()> {
        let hist = ScoreHistogram::build(scores, samples);
        let signal = hist.log_points(Label::Signal);
        let background = hist.log_points(Label::Background);
        let y_range = padded_range(&[signal.as_slice(), background.as_slice()]);

        let path = self.output_dir.join(HISTOGRAM_FILE);
        let root = BitMapBackend::new(&path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| failed(&path, e))?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..1.0, y_range)
            .map_err(|e| failed(&path, e))?;
        labels(&path, chart.configure_mesh().x_desc("score").y_desc("log(count)").draw());

        chart
            .draw_series(LineSeries::new(signal, &BLUE))
            .map_err(|e| failed(&path, e))?
            .label(Label::Signal.name())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.filled()));
        chart
            .draw_series(LineSeries::new(background, &RED))
            .map_err(|e| failed(&path, e))?
            .label(Label::Background.name())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.filled()));
        labels(
            &path,
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw(),
        );

        root.present().map_err(|e| failed(&path, e))?;
        info!("saved score histogram to {}", path.display());
        Ok(())
    }

    fn roc(&self, scores: &[f64], samples: &[Sample]) -> Result<()> {
        let roc = RocCurve::build(scores, samples);

        let path = self.output_dir.join(ROC_FILE);
        let root = BitMapBackend::new(&path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| failed(&path, e))?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..1.0, 0.0..1.0)
            .map_err(|e| failed(&path, e))?;
        labels(
            &path,
            chart
                .configure_mesh()
                .x_desc("False positive rate")
                .y_desc("True positive rate")
                .draw(),
        );

        chart
            .draw_series(LineSeries::new(vec![(0.0, 0.0), (1.0, 1.0)], &GREY))
            .map_err(|e| failed(&path, e))?;
        chart
            .draw_series(LineSeries::new(roc.points.iter().copied(), &BLUE))
            .map_err(|e| failed(&path, e))?;
        labels(
            &path,
            chart.draw_series(std::iter::once(Text::new(
                format!("AUC = {:.6}", roc.auc),
                (0.6, 0.2),
                ("sans-serif", 28).into_font(),
            ))),
        );

        root.present().map_err(|e| failed(&path, e))?;

        let json = std::fs::File::create(self.output_dir.join(ROC_JSON_FILE))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(json), &roc)?;

        info!("saved ROC curve to {} (AUC = {:.6})", path.display(), roc.auc);
        Ok(())
    }
}

impl VisualizationSink for PngSink {
    fn render(&mut self, scores: &[f64], samples: &[Sample]) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        self.histogram(scores, samples)?;
        self.roc(scores, samples)
    }
}

/// Y range covering every finite point, padded by 5%.
fn padded_range(series: &[&[(f64, f64)]]) -> Range<f64> {
    let ys = series.iter().flat_map(|s| s.iter().map(|p| p.1)).filter(|y| y.is_finite());
    let (lo, hi) = ys.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));
    if lo > hi {
        return 0.0..1.0;
    }
    let pad = ((hi - lo) * 0.05).max(0.05);
    (lo - pad)..(hi + pad)
}

fn failed(path: &Path, e: impl Display) -> Error {
    Error::Plot { file: path.display().to_string(), reason: e.to_string() }
}

/// Text-only drawing steps; a failure leaves the chart unlabelled.
fn labels<T, E: Display>(path: &Path, drawn: std::result::Result<T, E>) {
    if let Err(e) = drawn {
        warn!("labels missing from {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_sink_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("cache");
        let mut sink = PngSink::new(&out);
        sink.width = 300;
        sink.height = 200;

        let samples = vec![
            Sample::new(&[0.0], 0.0, Label::Signal),
            Sample::new(&[0.0], 0.0, Label::Background),
            Sample::new(&[0.0], 0.0, Label::Background),
        ];
        sink.render(&[0.8, 0.3, 0.1], &samples).unwrap();

        for file in [HISTOGRAM_FILE, ROC_FILE] {
            assert_eq!(image::image_dimensions(out.join(file)).unwrap(), (300, 200));
        }
        let roc: RocCurve =
            serde_json::from_reader(std::fs::File::open(out.join(ROC_JSON_FILE)).unwrap()).unwrap();
        assert!((roc.auc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_scores_still_render() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = PngSink::new(dir.path());
        sink.width = 200;
        sink.height = 150;
        sink.render(&[], &[]).unwrap();
        assert!(dir.path().join(HISTOGRAM_FILE).exists());
    }

    #[test]
    fn range_pads_and_skips_non_finite() {
        let a = [(0.0, -1.0), (0.5, f64::NEG_INFINITY)];
        let b = [(0.1, 1.0)];
        let r = padded_range(&[&a[..], &b[..]]);
        assert!((r.start + 1.1).abs() < 1e-12);
        assert!((r.end - 1.1).abs() < 1e-12);
        assert_eq!(padded_range(&[]), 0.0..1.0);
    }
}
