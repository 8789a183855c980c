use crate::app::AppState;
use crate::ui::styles::{hint_style, modal_title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, area: Rect, hold_supported: bool) {
    let force_stop = if hold_supported {
        "hold x / X force-stop   "
    } else {
        "x force-stop   "
    };

    let hints = Line::from(vec![
        Span::raw(" ↑/↓ select   "),
        Span::raw("Enter start/stop   "),
        Span::raw("s session   "),
        Span::raw("a/A add   "),
        Span::raw("c complete   "),
        Span::raw("d delete   "),
        Span::raw("u undo   "),
        Span::raw(force_stop),
        Span::raw("r reset   "),
        Span::raw("q quit"),
    ]);

    let paragraph = Paragraph::new(hints).style(hint_style());
    f.render_widget(paragraph, area);
}

/// Render the last status message
pub fn render_status_bar(f: &mut Frame, app: &AppState, area: Rect) {
    let line = match &app.status_message {
        Some(message) => Line::from(Span::styled(format!(" {}", message), modal_title_style())),
        None => Line::raw(""),
    };
    f.render_widget(Paragraph::new(line), area);
}
