pub mod settings;

pub use settings::{DatabaseConfig, Settings};
