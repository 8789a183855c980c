use crate::app::AppState;
use allcounts::domain::{TaskKind, UiMode};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Handle a keyboard event. Returns true when the app should quit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    // Releases only matter for the force-stop hold
    if key.kind == KeyEventKind::Release {
        if key.code == KeyCode::Char('x') {
            app.release_hold();
        }
        return false;
    }

    match app.ui_mode {
        UiMode::Normal => handle_normal_mode(app, key),
        UiMode::AddingTask => {
            if key.kind == KeyEventKind::Press {
                handle_input_form_mode(app, key);
            }
            false
        }
        UiMode::ConfirmReset => {
            if key.kind == KeyEventKind::Press {
                handle_confirm_reset_mode(app, key);
            }
            false
        }
    }
}

/// Handle keys in normal mode
fn handle_normal_mode(app: &mut AppState, key: KeyEvent) -> bool {
    // Auto-repeat keeps a hold alive; every other key acts on the press only
    if key.kind == KeyEventKind::Repeat {
        if key.code == KeyCode::Char('x') {
            app.press_hold_selected();
        }
        return false;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match key.code {
        KeyCode::Up => app.move_selection_up(),
        KeyCode::Down => app.move_selection_down(),

        // Start/stop the selected task
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected(),

        // Session
        KeyCode::Char('s') => app.toggle_session(),
        KeyCode::Char('r') => app.request_reset(),

        // Add
        KeyCode::Char('a') => app.start_add_task(TaskKind::one_time()),
        KeyCode::Char('A') => app.start_add_task(TaskKind::recurring()),

        // Complete / delete
        KeyCode::Char('c') => app.complete_selected(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete_selected(),
        KeyCode::Char('D') => app.confirm_delete_selected(),
        KeyCode::Char('u') => app.undo_delete_selected(),

        // Force stop: hold x, or X at once
        KeyCode::Char('x') => app.press_hold_selected(),
        KeyCode::Char('X') => app.force_stop_selected(),

        KeyCode::Char('q') | KeyCode::Esc => return true,
        _ => {}
    }
    false
}

fn handle_input_form_mode(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_input_form(),
        KeyCode::Esc => app.cancel_input_form(),
        KeyCode::Backspace => app.input_form_backspace(),
        KeyCode::Tab => {
            if let Some(form) = &mut app.input_form {
                form.kind = match form.kind {
                    TaskKind::Recurring { .. } => TaskKind::one_time(),
                    TaskKind::OneTime { .. } => TaskKind::recurring(),
                };
            }
        }
        KeyCode::Char(c) => app.input_form_add_char(c),
        _ => {}
    }
}

fn handle_confirm_reset_mode(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_reset(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_reset(),
        _ => {}
    }
}
