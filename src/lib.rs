pub mod clock;
pub mod config;
pub mod domain;
pub mod engine;
pub mod persistence;
pub mod ticker;

pub use clock::{Clock, ManualClock, Millis, SystemClock};
pub use config::EngineConfig;
pub use engine::{Engine, EngineEvent, EngineSnapshot, TaskView};
