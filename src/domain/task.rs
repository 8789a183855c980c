use crate::clock::Millis;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Stable task identifier
pub type TaskId = u64;

/// Kind-specific task data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskKind {
    /// Resets every day; remembers whether it was touched today
    Recurring {
        #[serde(default)]
        has_started_today: bool,
    },
    /// Tracked until completed; keeps a lifetime total
    OneTime {
        #[serde(default)]
        time_spent_ms: Millis,
    },
}

impl TaskKind {
    pub fn recurring() -> Self {
        Self::Recurring {
            has_started_today: false,
        }
    }

    pub fn one_time() -> Self {
        Self::OneTime { time_spent_ms: 0 }
    }
}

/// A trackable unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub kind: TaskKind,
    #[serde(default)]
    pub is_running: bool,
    /// When the current run began
    #[serde(default)]
    pub start_ts: Option<Millis>,
    /// Elapsed time of all closed runs
    #[serde(default)]
    pub accumulated_ms: Millis,
    /// Last time the elapsed value was recomputed while running
    #[serde(default)]
    pub last_tick_ts: Option<Millis>,
    /// Closed runs of the current day
    #[serde(default)]
    pub time_today_ms: Millis,
}

impl Task {
    pub fn new(id: TaskId, name: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            is_running: false,
            start_ts: None,
            accumulated_ms: 0,
            last_tick_ts: None,
            time_today_ms: 0,
        }
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self.kind, TaskKind::Recurring { .. })
    }

    /// Length of the open run at `now` (zero when stopped or without a start timestamp)
    pub fn open_run_ms(&self, now: Millis) -> Millis {
        match (self.is_running, self.start_ts) {
            (true, Some(start)) => (now - start).max(0),
            _ => 0,
        }
    }

    /// Authoritative elapsed time: closed runs plus the open run
    pub fn elapsed_ms(&self, now: Millis) -> Millis {
        self.accumulated_ms + self.open_run_ms(now)
    }

    /// Today's total including the open run
    pub fn time_today(&self, now: Millis) -> Millis {
        self.time_today_ms + self.open_run_ms(now)
    }

    /// Lifetime total shown for completed one-time tasks
    pub fn time_spent(&self, now: Millis) -> Millis {
        match self.kind {
            TaskKind::OneTime { time_spent_ms } => time_spent_ms + self.open_run_ms(now),
            TaskKind::Recurring { .. } => self.elapsed_ms(now),
        }
    }

    pub fn has_started_today(&self) -> bool {
        match self.kind {
            TaskKind::Recurring { has_started_today } => has_started_today,
            TaskKind::OneTime { .. } => self.time_today_ms > 0 || self.is_running,
        }
    }

    /// Begin a run at `now`
    pub fn start(&mut self, now: Millis) {
        self.is_running = true;
        self.start_ts = Some(now);
        self.last_tick_ts = Some(now);
        if let TaskKind::Recurring { has_started_today } = &mut self.kind {
            *has_started_today = true;
        }
    }

    /// Close the open run at `now`, crediting it. Returns the credited time.
    pub fn stop(&mut self, now: Millis) -> Millis {
        if !self.is_running {
            return 0;
        }
        let delta = self.open_run_ms(now);
        self.credit(delta);
        self.is_running = false;
        self.start_ts = None;
        self.last_tick_ts = None;
        delta
    }

    /// Clear the running flag without crediting the open run.
    /// Returns false if the task was already stopped.
    pub fn force_stop(&mut self) -> bool {
        if !self.is_running {
            return false;
        }
        self.is_running = false;
        self.start_ts = None;
        self.last_tick_ts = None;
        true
    }

    /// Credit the open run and restart it at `now`; elapsed is unchanged
    pub fn split(&mut self, now: Millis) {
        if self.is_running && self.start_ts.is_some() {
            let delta = self.open_run_ms(now);
            self.credit(delta);
            self.start_ts = Some(now);
            self.last_tick_ts = Some(now);
        }
    }

    /// Record that the elapsed value was recomputed at `now`
    pub fn stamp(&mut self, now: Millis) {
        if self.is_running {
            self.last_tick_ts = Some(now);
        }
    }

    /// Forget today's totals (new day or session reset)
    pub fn reset_today(&mut self) {
        self.time_today_ms = 0;
        let running = self.is_running;
        if let TaskKind::Recurring { has_started_today } = &mut self.kind {
            *has_started_today = running;
        }
    }

    fn credit(&mut self, delta: Millis) {
        self.accumulated_ms += delta;
        self.time_today_ms += delta;
        if let TaskKind::OneTime { time_spent_ms } = &mut self.kind {
            *time_spent_ms += delta;
        }
    }
}

/// A task that left the registry through completion or deletion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTask {
    pub task: Task,
    pub completed_at: DateTime<Local>,
}

impl CompletedTask {
    pub fn new(task: Task, completed_at: DateTime<Local>) -> Self {
        Self { task, completed_at }
    }

    /// Time credited to the task: today's value, else its lifetime total
    pub fn total_ms(&self) -> Millis {
        if self.task.time_today_ms > 0 {
            self.task.time_today_ms
        } else {
            self.task.time_spent(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_is_accumulated_plus_open_run() {
        let mut task = Task::new(1, "Read", TaskKind::one_time());
        task.accumulated_ms = 5_000;
        assert_eq!(task.elapsed_ms(100_000), 5_000);

        task.start(100_000);
        assert_eq!(task.elapsed_ms(100_000), 5_000);
        assert_eq!(task.elapsed_ms(103_500), 8_500);
    }

    #[test]
    fn test_elapsed_never_negative_when_clock_lags_start() {
        let mut task = Task::new(1, "Read", TaskKind::one_time());
        task.start(10_000);
        assert_eq!(task.elapsed_ms(9_000), 0);
    }

    #[test]
    fn test_running_without_start_ts_has_no_open_run() {
        let mut task = Task::new(1, "Legacy", TaskKind::recurring());
        task.is_running = true;
        task.accumulated_ms = 3_000;
        assert_eq!(task.elapsed_ms(1_000_000), 3_000);
    }

    #[test]
    fn test_stop_credits_run_to_every_total() {
        let mut task = Task::new(1, "Finish Project", TaskKind::one_time());
        task.start(1_000);
        let credited = task.stop(4_000);

        assert_eq!(credited, 3_000);
        assert_eq!(task.accumulated_ms, 3_000);
        assert_eq!(task.time_today_ms, 3_000);
        assert_eq!(task.kind, TaskKind::OneTime { time_spent_ms: 3_000 });
        assert!(!task.is_running);
        assert!(task.start_ts.is_none());
    }

    #[test]
    fn test_stop_on_stopped_task_credits_nothing() {
        let mut task = Task::new(1, "Cleaning", TaskKind::recurring());
        assert_eq!(task.stop(50_000), 0);
        assert_eq!(task.accumulated_ms, 0);
    }

    #[test]
    fn test_start_marks_recurring_started_today() {
        let mut task = Task::new(1, "Cleaning", TaskKind::recurring());
        assert!(!task.has_started_today());
        task.start(0);
        assert!(task.has_started_today());
        assert_eq!(task.last_tick_ts, Some(0));
    }

    #[test]
    fn test_force_stop_forfeits_open_run() {
        let mut task = Task::new(1, "Cleaning", TaskKind::recurring());
        task.accumulated_ms = 2_000;
        task.start(10_000);

        assert!(task.force_stop());
        assert_eq!(task.elapsed_ms(99_000), 2_000);
        assert!(!task.force_stop());
    }

    #[test]
    fn test_split_keeps_elapsed_continuous() {
        let mut task = Task::new(1, "Guitar", TaskKind::recurring());
        task.start(0);
        let before = task.elapsed_ms(7_000);
        task.split(7_000);

        assert_eq!(task.elapsed_ms(7_000), before);
        assert_eq!(task.accumulated_ms, 7_000);
        assert_eq!(task.start_ts, Some(7_000));
        assert_eq!(task.elapsed_ms(8_000), 8_000);
    }

    #[test]
    fn test_reset_today_keeps_lifetime_totals() {
        let mut task = Task::new(1, "Guitar", TaskKind::recurring());
        task.start(0);
        task.stop(60_000);
        task.reset_today();

        assert_eq!(task.time_today_ms, 0);
        assert_eq!(task.accumulated_ms, 60_000);
        assert!(!task.has_started_today());
    }

    #[test]
    fn test_task_kind_serializes_with_type_tag() {
        let json = serde_json::to_string(&TaskKind::recurring()).unwrap();
        assert_eq!(json, r#"{"type":"recurring","has_started_today":false}"#);

        let kind: TaskKind = serde_json::from_str(r#"{"type":"one_time"}"#).unwrap();
        assert_eq!(kind, TaskKind::OneTime { time_spent_ms: 0 });
    }

    #[test]
    fn test_completed_total_prefers_today() {
        let mut task = Task::new(1, "Read Book", TaskKind::one_time());
        task.start(0);
        task.stop(90_000);
        let done = CompletedTask::new(task.clone(), Local::now());
        assert_eq!(done.total_ms(), 90_000);

        task.reset_today();
        let done = CompletedTask::new(task, Local::now());
        assert_eq!(done.total_ms(), 90_000);
    }
}
