pub mod histogram;
pub mod roc;
pub mod sink;

pub use histogram::ScoreHistogram;
pub use roc::RocCurve;
pub use sink::{NullSink, PngSink, VisualizationSink};
