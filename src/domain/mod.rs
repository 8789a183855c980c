pub mod enums;
pub mod task;
pub mod views;

pub use enums::{SessionState, StopReason, UiMode, Visibility};
pub use task::{CompletedTask, Task, TaskId, TaskKind};
pub use views::{
    completion_bars, format_clock, format_inline, format_short, millis_to_secs, CompletionBar,
};
