pub mod clock;
pub mod config;
pub mod cooldown;
pub mod indicators;
pub mod policy;
pub mod services;

pub use config::{ConfigError, EngineConfig, StampPolicy};
pub use cooldown::CooldownRegistry;
pub use services::signal_engine::{Evaluation, EvaluationError, PassSummary, SignalEngine};
