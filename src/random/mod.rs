pub mod shared_rng;

pub use shared_rng::{RandomSource, SharedRng};
