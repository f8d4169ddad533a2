//! Test harness utilities shared by the behavioural suites.

mod config_loader;
mod reporter;
mod world;

pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use world::{TestWorld, world};
