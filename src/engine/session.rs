use crate::clock::Millis;
use crate::domain::{SessionState, TaskId};

/// Session-level state and the used/wasted buckets.
///
/// Time is banked from wall-clock gaps: every `settle` credits the time since
/// the previous credit to used (a task is active) or wasted (none is). Ticks
/// only decide how often that happens, never how much is credited.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    active_task_id: Option<TaskId>,
    used_ms: Millis,
    wasted_ms: Millis,
    credited_at: Option<Millis>,
    /// When the current active task took over
    run_started_at: Option<Millis>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn active_task_id(&self) -> Option<TaskId> {
        self.active_task_id
    }

    /// How long the current active task has been active
    pub fn current_run_ms(&self, now: Millis) -> Millis {
        self.run_started_at.map_or(0, |at| (now - at).max(0))
    }

    /// Time since the last credit that hasn't been banked yet
    fn pending_ms(&self, now: Millis) -> Millis {
        match (self.state, self.credited_at) {
            (SessionState::Active, Some(at)) => (now - at).max(0),
            _ => 0,
        }
    }

    pub fn used_ms(&self, now: Millis) -> Millis {
        if self.active_task_id.is_some() {
            self.used_ms + self.pending_ms(now)
        } else {
            self.used_ms
        }
    }

    pub fn wasted_ms(&self, now: Millis) -> Millis {
        if self.active_task_id.is_none() {
            self.wasted_ms + self.pending_ms(now)
        } else {
            self.wasted_ms
        }
    }

    /// Bank the gap since the previous credit
    pub fn settle(&mut self, now: Millis) {
        let gap = self.pending_ms(now);
        if self.active_task_id.is_some() {
            self.used_ms += gap;
        } else {
            self.wasted_ms += gap;
        }
        if self.state == SessionState::Active {
            // Never move the credit mark backwards
            self.credited_at = Some(self.credited_at.map_or(now, |at| at.max(now)));
        }
    }

    /// Idle/Paused -> Active. Returns false if already active.
    pub fn activate(&mut self, now: Millis) -> bool {
        if self.state == SessionState::Active {
            return false;
        }
        self.state = SessionState::Active;
        self.credited_at = Some(now);
        true
    }

    /// Active -> Paused, freezing both buckets. The caller stops the active task first.
    pub fn pause(&mut self, now: Millis) -> bool {
        if self.state != SessionState::Active {
            return false;
        }
        self.settle(now);
        self.state = SessionState::Paused;
        self.credited_at = None;
        true
    }

    /// Point the session at a task (or none), banking the gap under the previous one
    pub fn set_active_task(&mut self, id: Option<TaskId>, now: Millis) {
        self.settle(now);
        if id != self.active_task_id {
            self.run_started_at = id.map(|_| now);
        }
        self.active_task_id = id;
    }

    /// Back to Idle with empty buckets
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
