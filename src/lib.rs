pub mod activation;
pub mod config;
pub mod data;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod network;
pub mod random;
pub mod train;

// Convenience re-exports
pub use activation::ShiftedLogistic;
pub use config::{RunConfig, SourceSpec, WindowSpec};
pub use data::{DataPipeline, Dataset, Label, PredictionBuffer, Sample};
pub use engine::Propagation;
pub use error::{Error, Result};
pub use network::NetworkWeights;
pub use random::{RandomSource, SharedRng};
pub use train::{InteractiveController, Mode, TrainingScheduler};
