pub mod propagation;

pub use propagation::Propagation;
