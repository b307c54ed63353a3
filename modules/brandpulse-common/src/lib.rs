pub mod config;
pub mod error;
pub mod payload;
pub mod types;

pub use config::Config;
pub use error::BrandPulseError;
pub use payload::*;
pub use types::*;
