use super::registry::TaskRegistry;
use crate::clock::Millis;
use crate::domain::{TaskId, Visibility};

/// Result of reconciling one running task on return to the foreground
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Elapsed recomputed from timestamps; `gap_ms` is how long it went unobserved
    Reconciled {
        id: TaskId,
        gap_ms: Millis,
        elapsed_ms: Millis,
    },
    /// No start timestamp to recompute from, so the task was stopped
    ForceStopped { id: TaskId },
}

/// Handles foreground/background transitions
#[derive(Debug, Clone, Default)]
pub struct VisibilityReconciler {
    visibility: Visibility,
}

impl VisibilityReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Snapshot running tasks so the gap can be measured later. Nothing is stopped.
    pub fn on_hidden(&mut self, registry: &mut TaskRegistry, now: Millis) {
        for task in registry.tasks_mut().filter(|t| t.is_running) {
            task.stamp(now);
        }
        self.visibility = Visibility::Background;
    }

    /// Recompute running tasks from their timestamps
    pub fn on_visible(&mut self, registry: &mut TaskRegistry, now: Millis) -> Vec<ReconcileOutcome> {
        let mut outcomes = Vec::new();

        for task in registry.tasks_mut().filter(|t| t.is_running) {
            match task.start_ts {
                Some(start) => {
                    let seen = task.last_tick_ts.unwrap_or(start);
                    task.stamp(now);
                    outcomes.push(ReconcileOutcome::Reconciled {
                        id: task.id,
                        gap_ms: (now - seen).max(0),
                        elapsed_ms: task.elapsed_ms(now),
                    });
                }
                None => {
                    task.force_stop();
                    outcomes.push(ReconcileOutcome::ForceStopped { id: task.id });
                }
            }
        }

        self.visibility = Visibility::Foreground;
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Task, TaskKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hidden_stamps_running_tasks_only() {
        let mut running = Task::new(1, "Cleaning", TaskKind::recurring());
        running.start(1_000);
        let idle = Task::new(2, "Read", TaskKind::one_time());
        let mut registry = TaskRegistry::new(vec![running, idle], Vec::new());
        let mut reconciler = VisibilityReconciler::new();

        reconciler.on_hidden(&mut registry, 5_000);

        assert_eq!(reconciler.visibility(), Visibility::Background);
        assert_eq!(registry.get(1).unwrap().last_tick_ts, Some(5_000));
        assert_eq!(registry.get(2).unwrap().last_tick_ts, None);
        assert!(registry.is_running(1));
    }

    #[test]
    fn test_visible_reports_backgrounded_gap() {
        let mut task = Task::new(1, "Cleaning", TaskKind::recurring());
        task.accumulated_ms = 1_000;
        task.start(0);
        let mut registry = TaskRegistry::new(vec![task], Vec::new());
        let mut reconciler = VisibilityReconciler::new();

        reconciler.on_hidden(&mut registry, 5_000);
        let outcomes = reconciler.on_visible(&mut registry, 25_000);

        assert_eq!(
            outcomes,
            vec![ReconcileOutcome::Reconciled {
                id: 1,
                gap_ms: 20_000,
                elapsed_ms: 26_000,
            }]
        );
        assert_eq!(registry.get(1).unwrap().last_tick_ts, Some(25_000));
        assert_eq!(reconciler.visibility(), Visibility::Foreground);
    }

    #[test]
    fn test_visible_stops_task_without_start_ts() {
        let mut task = Task::new(1, "Legacy", TaskKind::one_time());
        task.is_running = true;
        task.accumulated_ms = 7_000;
        let mut registry = TaskRegistry::new(vec![task], Vec::new());
        let mut reconciler = VisibilityReconciler::new();

        let outcomes = reconciler.on_visible(&mut registry, 30_000);

        assert_eq!(outcomes, vec![ReconcileOutcome::ForceStopped { id: 1 }]);
        let task = registry.get(1).unwrap();
        assert!(!task.is_running);
        assert_eq!(task.accumulated_ms, 7_000);
    }
}
