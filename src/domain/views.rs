use super::task::{CompletedTask, TaskId};
use crate::clock::Millis;

/// Widest bar drawn for a completed task
pub const MAX_SQUARES: usize = 7;

/// Format whole seconds as "HH:MM:SS"
pub fn format_clock(secs: i64) -> String {
    let secs = secs.max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Compact task-row format: "H:MM" above an hour, "M:SS" below
pub fn format_short(secs: i64) -> String {
    let secs = secs.max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;

    if hours > 0 {
        format!("{}:{:02}", hours, minutes)
    } else {
        format!("{}:{:02}", minutes, secs % 60)
    }
}

/// Format as "Xhr Ymin Zsec"
pub fn format_inline(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{}hr {}min {}sec", secs / 3600, (secs % 3600) / 60, secs % 60)
}

pub fn millis_to_secs(ms: Millis) -> i64 {
    ms.max(0) / 1000
}

/// One bar in the completed-tasks visualizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionBar {
    pub task_id: TaskId,
    pub squares: usize,
    pub total_ms: Millis,
}

/// Scale completed tasks against the longest one (1..=MAX_SQUARES squares each)
pub fn completion_bars(completed: &[CompletedTask]) -> Vec<CompletionBar> {
    let max = completed.iter().map(|c| c.total_ms()).max().unwrap_or(0);

    completed
        .iter()
        .map(|c| {
            let total_ms = c.total_ms();
            let ratio = if max > 0 {
                total_ms as f64 / max as f64
            } else {
                0.0
            };
            let squares = ((ratio * MAX_SQUARES as f64).round() as usize).max(1);
            CompletionBar {
                task_id: c.task.id,
                squares,
                total_ms,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::{Task, TaskKind};
    use chrono::Local;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(59), "00:00:59");
        assert_eq!(format_clock(3_725), "01:02:05");
        assert_eq!(format_clock(-5), "00:00:00");
    }

    #[test]
    fn test_format_short() {
        assert_eq!(format_short(65), "1:05");
        assert_eq!(format_short(3_725), "1:02");
    }

    #[test]
    fn test_format_inline() {
        assert_eq!(format_inline(3_725), "1hr 2min 5sec");
    }

    #[test]
    fn test_completion_bars_scale_to_longest() {
        let mut long = Task::new(1, "Long", TaskKind::one_time());
        long.time_today_ms = 70_000;
        let mut short = Task::new(2, "Short", TaskKind::one_time());
        short.time_today_ms = 10_000;
        let empty = Task::new(3, "Empty", TaskKind::recurring());

        let bars = completion_bars(&[
            CompletedTask::new(long, Local::now()),
            CompletedTask::new(short, Local::now()),
            CompletedTask::new(empty, Local::now()),
        ]);

        let squares: Vec<usize> = bars.iter().map(|b| b.squares).collect();
        assert_eq!(squares, vec![7, 1, 1]);
        assert_eq!(bars[0].total_ms, 70_000);
    }

    #[test]
    fn test_completion_bars_empty() {
        assert!(completion_bars(&[]).is_empty());
    }
}
