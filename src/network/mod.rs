pub mod report;
pub mod weights;

pub use report::{TextReport, WeightReport};
pub use weights::NetworkWeights;
