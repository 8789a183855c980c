use super::registry::TaskRegistry;
use crate::clock::Millis;
use crate::domain::TaskId;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StallSample {
    prev_elapsed: Millis,
    count: u32,
}

/// Samples running tasks and force-stops the ones that stop making progress.
///
/// The first sample of a task is its baseline. Every later sample that reports
/// the same elapsed value bumps the stall counter; any change resets it. A task
/// reaching `threshold` unchanged samples is stopped without crediting its open
/// run, since a frozen timer says nothing about how long it really ran.
#[derive(Debug, Clone)]
pub struct StallWatchdog {
    threshold: u32,
    samples: HashMap<TaskId, StallSample>,
}

impl StallWatchdog {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            samples: HashMap::new(),
        }
    }

    /// Take one sample of every running task. Returns the tasks it stopped.
    pub fn sample(&mut self, registry: &mut TaskRegistry, now: Millis) -> Vec<TaskId> {
        self.samples.retain(|id, _| registry.is_running(*id));

        let mut stopped = Vec::new();
        for task in registry.tasks_mut().filter(|t| t.is_running) {
            let elapsed = task.elapsed_ms(now);

            let Some(sample) = self.samples.get_mut(&task.id) else {
                self.samples.insert(
                    task.id,
                    StallSample {
                        prev_elapsed: elapsed,
                        count: 0,
                    },
                );
                continue;
            };

            if sample.prev_elapsed == elapsed {
                sample.count += 1;
                if sample.count >= self.threshold {
                    task.force_stop();
                    self.samples.remove(&task.id);
                    stopped.push(task.id);
                }
            } else {
                sample.prev_elapsed = elapsed;
                sample.count = 0;
            }
        }

        stopped
    }

    /// Drop every baseline, e.g. after the elapsed values were reconciled
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    pub fn forget(&mut self, id: TaskId) {
        self.samples.remove(&id);
    }

    /// Current stall counter for a task (None if not tracked)
    #[cfg(test)]
    fn stall_count(&self, id: TaskId) -> Option<u32> {
        self.samples.get(&id).map(|s| s.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Task, TaskKind};

    fn registry_with_running(start_ts: Option<Millis>) -> TaskRegistry {
        let mut task = Task::new(1, "Cleaning", TaskKind::recurring());
        task.is_running = true;
        task.start_ts = start_ts;
        task.accumulated_ms = 4_000;
        TaskRegistry::new(vec![task, Task::new(2, "Read", TaskKind::one_time())], Vec::new())
    }

    #[test]
    fn test_progressing_task_is_left_alone() {
        let mut registry = registry_with_running(Some(0));
        let mut watchdog = StallWatchdog::new(2);

        for tick in 1..=10 {
            assert!(watchdog.sample(&mut registry, tick * 2_000).is_empty());
        }
        assert!(registry.is_running(1));
        assert_eq!(watchdog.stall_count(1), Some(0));
    }

    #[test]
    fn test_frozen_task_stopped_after_two_unchanged_samples() {
        let mut registry = registry_with_running(None);
        let mut watchdog = StallWatchdog::new(2);

        assert!(watchdog.sample(&mut registry, 2_000).is_empty());
        assert!(watchdog.sample(&mut registry, 4_000).is_empty());
        assert_eq!(watchdog.stall_count(1), Some(1));

        assert_eq!(watchdog.sample(&mut registry, 6_000), vec![1]);
        let task = registry.get(1).unwrap();
        assert!(!task.is_running);
        assert_eq!(task.elapsed_ms(6_000), 4_000);
        assert_eq!(watchdog.stall_count(1), None);
    }

    #[test]
    fn test_progress_resets_stall_counter() {
        let mut registry = registry_with_running(Some(10_000));
        let mut watchdog = StallWatchdog::new(2);

        // Clock behind start_ts: elapsed frozen at the accumulated value
        watchdog.sample(&mut registry, 2_000);
        watchdog.sample(&mut registry, 4_000);
        assert_eq!(watchdog.stall_count(1), Some(1));

        watchdog.sample(&mut registry, 12_000);
        assert_eq!(watchdog.stall_count(1), Some(0));
        assert!(registry.is_running(1));
    }

    #[test]
    fn test_stopped_tasks_lose_their_entry() {
        let mut registry = registry_with_running(Some(0));
        let mut watchdog = StallWatchdog::new(2);

        watchdog.sample(&mut registry, 2_000);
        assert!(watchdog.stall_count(1).is_some());

        registry.get_mut(1).unwrap().stop(3_000);
        watchdog.sample(&mut registry, 4_000);
        assert_eq!(watchdog.stall_count(1), None);
    }

    #[test]
    fn test_reset_restarts_from_baseline() {
        let mut registry = registry_with_running(None);
        let mut watchdog = StallWatchdog::new(2);

        watchdog.sample(&mut registry, 2_000);
        watchdog.sample(&mut registry, 4_000);
        watchdog.reset();

        assert!(watchdog.sample(&mut registry, 6_000).is_empty());
        assert!(watchdog.sample(&mut registry, 8_000).is_empty());
        assert!(registry.is_running(1));
    }
}
