pub mod config;
pub mod features;
pub mod model;
pub mod preprocess;
#[cfg(feature = "torch")]
pub mod torch;
