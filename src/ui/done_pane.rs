use crate::app::AppState;
use crate::ui::styles::{border_style, default_style, done_style, title_style};
use allcounts::domain::{completion_bars, format_inline, millis_to_secs, CompletedTask};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Create a line for a completed task, with a bar scaled against the longest one
fn create_done_line(done: &CompletedTask, squares: usize, total_ms: i64) -> Line<'static> {
    Line::from(vec![
        Span::styled("✓ ".to_string(), done_style()),
        Span::styled(done.task.name.clone(), default_style()),
        Span::raw("  ".to_string()),
        Span::styled("■".repeat(squares), done_style()),
        Span::raw(format!("  {}", format_inline(millis_to_secs(total_ms)))),
    ])
}

/// Render the completed tasks pane
pub fn render_done_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let completed = &app.snapshot.completed;
    let bars = completion_bars(completed);

    let items: Vec<ListItem> = completed
        .iter()
        .zip(bars.iter())
        .map(|(done, bar)| ListItem::new(create_done_line(done, bar.squares, bar.total_ms)))
        .collect();

    let title = format!(" Completed ({}) ", completed.len());

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(title, title_style())),
    );

    f.render_widget(list, area);
}
