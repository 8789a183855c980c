use crate::app::AppState;
use crate::ui::styles::{
    border_style, default_style, done_style, idle_style, running_style, selected_style,
    tag_style, title_style, warning_style,
};
use allcounts::domain::{format_short, millis_to_secs, TaskKind};
use allcounts::TaskView;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Width of the force-stop hold meter
const HOLD_METER_WIDTH: usize = 6;

fn hold_meter(progress: f64) -> String {
    let filled = ((progress * HOLD_METER_WIDTH as f64).round() as usize).min(HOLD_METER_WIDTH);
    format!("[{}{}]", "■".repeat(filled), " ".repeat(HOLD_METER_WIDTH - filled))
}

/// Render the task list pane
pub fn render_list_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let items: Vec<ListItem> = app
        .snapshot
        .tasks
        .iter()
        .enumerate()
        .map(|(idx, task)| {
            let style = if idx == app.selected_index {
                selected_style()
            } else {
                default_style()
            };
            ListItem::new(create_task_line(task)).style(style)
        })
        .collect();

    let running = app.snapshot.tasks.iter().filter(|t| t.is_running).count();
    let title = format!(" Tasks ({}) · {} running ", app.snapshot.tasks.len(), running);

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(title, title_style())),
    );

    f.render_widget(list, area);
}

/// Format: ▶ Practicing Guitar [daily] ✓  12:04  (today 12:04)  deleting in 3s
fn create_task_line(task: &TaskView) -> Line<'static> {
    let mut spans = Vec::new();

    if task.is_running {
        spans.push(Span::styled("▶ ".to_string(), running_style()));
    } else {
        spans.push(Span::styled("· ".to_string(), idle_style()));
    }

    spans.push(Span::raw(task.name.clone()));

    let badge = match task.kind {
        TaskKind::Recurring { .. } => " [daily]",
        TaskKind::OneTime { .. } => " [once]",
    };
    spans.push(Span::styled(badge.to_string(), tag_style()));

    if task.has_started_today {
        spans.push(Span::styled(" ✓".to_string(), done_style()));
    }

    let elapsed_style = if task.is_running {
        running_style()
    } else {
        default_style()
    };
    spans.push(Span::styled(
        format!("  {}", format_short(millis_to_secs(task.elapsed_ms))),
        elapsed_style,
    ));
    spans.push(Span::styled(
        format!("  (today {})", format_short(millis_to_secs(task.time_today_ms))),
        idle_style(),
    ));

    if task.hold_progress > 0.0 {
        spans.push(Span::styled(
            format!("  {}", hold_meter(task.hold_progress)),
            warning_style(),
        ));
    }

    if let Some(secs) = task.pending_delete_secs {
        spans.push(Span::styled(
            format!("  deleting in {}s (u to undo)", secs),
            warning_style(),
        ));
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(is_running: bool) -> TaskView {
        TaskView {
            id: 1,
            name: "Practicing Guitar".to_string(),
            kind: TaskKind::recurring(),
            is_running,
            is_active: is_running,
            elapsed_ms: 65_000,
            time_today_ms: 5_000,
            has_started_today: true,
            pending_delete_secs: None,
            hold_progress: 0.0,
        }
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_create_task_line() {
        let text = line_text(&create_task_line(&view(true)));
        assert!(text.starts_with("▶ Practicing Guitar [daily] ✓"));
        assert!(text.contains("1:05"));
        assert!(text.contains("(today 0:05)"));
    }

    #[test]
    fn test_pending_delete_and_hold_shown() {
        let mut task = view(true);
        task.pending_delete_secs = Some(3);
        task.hold_progress = 0.5;

        let text = line_text(&create_task_line(&task));
        assert!(text.contains("[■■■   ]"));
        assert!(text.contains("deleting in 3s"));
    }

    #[test]
    fn test_hold_meter_bounds() {
        assert_eq!(hold_meter(0.0), "[      ]");
        assert_eq!(hold_meter(1.0), "[■■■■■■]");
    }
}
