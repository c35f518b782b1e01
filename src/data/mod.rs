pub mod dataset;
pub mod pipeline;
pub mod predictions;
pub mod sample;
pub mod source;

pub use dataset::Dataset;
pub use pipeline::DataPipeline;
pub use predictions::PredictionBuffer;
pub use sample::{Label, Sample};
pub use source::{CsvSourceReader, MemorySource, SourceReader};
