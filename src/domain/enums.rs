use serde::{Deserialize, Serialize};

/// Top-level state of a tracking session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    Active,
    Paused,
}

impl SessionState {
    /// Status line label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Active => "Session in Progress",
            Self::Paused => "Session Paused",
        }
    }

    pub fn to_tag(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Active => "ACTIVE",
            Self::Paused => "PAUSED",
        }
    }
}

/// Whether the front-end is currently in front of the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Foreground,
    Background,
}

/// Why a task was stopped outside the normal stop path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Watchdog saw no progress for too many samples
    Stalled,
    /// Running without a start timestamp, nothing to reconcile against
    Unrecoverable,
    /// User held the stop control
    Forced,
}

impl StopReason {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Stalled => "stalled",
            Self::Unrecoverable => "unrecoverable",
            Self::Forced => "force-stopped",
        }
    }
}

/// UI mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Normal,
    AddingTask,
    ConfirmReset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_default_is_idle() {
        assert_eq!(SessionState::default(), SessionState::Idle);
    }

    #[test]
    fn test_session_state_label() {
        assert_eq!(SessionState::Idle.label(), "");
        assert_eq!(SessionState::Active.label(), "Session in Progress");
        assert_eq!(SessionState::Paused.label(), "Session Paused");
    }

    #[test]
    fn test_session_state_to_tag() {
        assert_eq!(SessionState::Active.to_tag(), "ACTIVE");
        assert_eq!(SessionState::Paused.to_tag(), "PAUSED");
    }
}
