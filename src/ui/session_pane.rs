use crate::app::AppState;
use crate::ui::styles::{
    border_style, done_style, gauge_style, idle_style, paused_style, running_style, title_style,
    warning_style,
};
use allcounts::domain::{format_clock, format_inline, SessionState, Visibility};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

fn state_style(state: SessionState) -> Style {
    match state {
        SessionState::Active => running_style(),
        SessionState::Paused => paused_style(),
        SessionState::Idle => idle_style(),
    }
}

/// Share of the session spent on tasks, in percent
fn used_percent(used: i64, wasted: i64) -> u16 {
    let total = used + wasted;
    if total <= 0 {
        return 0;
    }
    ((used as f64 / total as f64) * 100.0).round() as u16
}

/// Render the session header: state, current run clock, used vs wasted
pub fn render_session_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let snapshot = &app.snapshot;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(" allcounts ", title_style()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(inner);

    let label = match snapshot.state {
        SessionState::Idle => "Press s to start a session",
        state => state.label(),
    };
    let mut status = vec![
        Span::styled(format!("[{}] ", snapshot.state.to_tag()), state_style(snapshot.state)),
        Span::raw(label),
    ];
    if snapshot.visibility == Visibility::Background {
        status.push(Span::styled("  (in background)", idle_style()));
    }

    let active_name = snapshot
        .active_task_id
        .and_then(|id| snapshot.task(id))
        .map(|t| t.name.as_str())
        .unwrap_or("no task");

    let lines = vec![
        Line::from(status),
        Line::from(vec![
            Span::styled(format_clock(snapshot.current_session_time), running_style()),
            Span::raw(format!("  {}", active_name)),
        ]),
        Line::from(vec![
            Span::styled("Used: ", title_style()),
            Span::styled(format_inline(snapshot.used_time), done_style()),
            Span::raw("   "),
            Span::styled("Wasted: ", title_style()),
            Span::styled(format_inline(snapshot.wasted_time), warning_style()),
        ]),
    ];
    f.render_widget(Paragraph::new(lines), rows[0]);

    let gauge = Gauge::default()
        .gauge_style(gauge_style())
        .percent(used_percent(snapshot.used_time, snapshot.wasted_time))
        .label("");
    f.render_widget(gauge, rows[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_used_percent() {
        assert_eq!(used_percent(0, 0), 0);
        assert_eq!(used_percent(30, 10), 75);
        assert_eq!(used_percent(10, 0), 100);
    }
}
