//! Configuration system for Vantage.
//! TOML-based, layered resolution: env > project > user > defaults.

pub mod allocator_config;
pub mod defaults;
pub mod evaluator_config;
pub mod storage_config;
pub mod targeting_config;
pub mod vantage_config;

pub use allocator_config::AllocatorConfig;
pub use evaluator_config::EvaluatorConfig;
pub use storage_config::StorageConfig;
pub use targeting_config::TargetingConfig;
pub use vantage_config::VantageConfig;
