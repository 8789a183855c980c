pub mod done_pane;
pub mod input_form;
pub mod keybindings;
pub mod layout;
pub mod list_pane;
pub mod modal;
pub mod session_pane;
pub mod styles;

use crate::app::AppState;
use allcounts::domain::UiMode;
use done_pane::render_done_pane;
use input_form::render_input_form;
use keybindings::{render_keybindings, render_status_bar};
use layout::create_layout;
use list_pane::render_list_pane;
use modal::render_reset_modal;
use ratatui::Frame;
use session_pane::render_session_pane;

/// Main render function - draws the entire UI
pub fn render(f: &mut Frame, app: &AppState) {
    let size = f.size();
    let layout = create_layout(size);

    render_keybindings(f, layout.keybindings_area, app.hold_supported);
    render_session_pane(f, app, layout.session_area);
    render_list_pane(f, app, layout.list_area);
    render_done_pane(f, app, layout.done_area);
    render_status_bar(f, app, layout.status_area);

    match app.ui_mode {
        UiMode::ConfirmReset => render_reset_modal(f, size),
        UiMode::AddingTask => render_input_form(f, app, size),
        UiMode::Normal => {}
    }
}
