pub mod activation;

pub use activation::ShiftedLogistic;
