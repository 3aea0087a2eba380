//! Configuration for querygen

pub mod defaults;
mod settings;

pub use settings::GeneratorConfig;
