use allcounts::domain::{TaskId, TaskKind, UiMode, Visibility};
use allcounts::{Engine, EngineEvent, EngineSnapshot};

/// Input form state for adding tasks
#[derive(Debug, Clone)]
pub struct InputFormState {
    pub name: String,
    pub kind: TaskKind,
}

/// Main application state
pub struct AppState {
    pub engine: Engine,
    pub snapshot: EngineSnapshot,
    pub selected_index: usize,
    pub ui_mode: UiMode,
    pub input_form: Option<InputFormState>,
    pub status_message: Option<String>,
    /// Terminal reports key releases, so 'x' can be held
    pub hold_supported: bool,
    held_task: Option<TaskId>,
}

impl AppState {
    pub fn new(engine: Engine, hold_supported: bool) -> Self {
        let snapshot = engine.snapshot();
        Self {
            engine,
            snapshot,
            selected_index: 0,
            ui_mode: UiMode::Normal,
            input_form: None,
            status_message: None,
            hold_supported,
            held_task: None,
        }
    }

    /// Re-read the engine after a command
    pub fn refresh(&mut self) {
        self.snapshot = self.engine.snapshot();
        let len = self.snapshot.tasks.len();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.snapshot.tasks.get(self.selected_index).map(|t| t.id)
    }

    pub fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.snapshot.tasks.len() {
            self.selected_index += 1;
        }
    }

    /// Enter/space on a task row: start it, or stop it if it is the active one
    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        if self.snapshot.active_task_id == Some(id) {
            self.engine.stop_task(id);
        } else {
            self.engine.start_task(id);
        }
        self.refresh();
    }

    pub fn toggle_session(&mut self) {
        self.engine.toggle_session();
        self.refresh();
    }

    pub fn request_reset(&mut self) {
        self.ui_mode = UiMode::ConfirmReset;
    }

    pub fn confirm_reset(&mut self) {
        self.engine.reset_session();
        self.ui_mode = UiMode::Normal;
        self.status_message = Some("Session reset".to_string());
        self.refresh();
    }

    pub fn cancel_reset(&mut self) {
        self.ui_mode = UiMode::Normal;
    }

    pub fn start_add_task(&mut self, kind: TaskKind) {
        self.ui_mode = UiMode::AddingTask;
        self.input_form = Some(InputFormState {
            name: String::new(),
            kind,
        });
    }

    pub fn input_form_add_char(&mut self, c: char) {
        if let Some(form) = &mut self.input_form {
            form.name.push(c);
        }
    }

    pub fn input_form_backspace(&mut self) {
        if let Some(form) = &mut self.input_form {
            form.name.pop();
        }
    }

    pub fn submit_input_form(&mut self) {
        if let Some(form) = self.input_form.take() {
            if let Some(id) = self.engine.add_task(&form.name, form.kind) {
                self.refresh();
                if let Some(index) = self.snapshot.tasks.iter().position(|t| t.id == id) {
                    self.selected_index = index;
                }
            }
        }
        self.ui_mode = UiMode::Normal;
    }

    pub fn cancel_input_form(&mut self) {
        self.input_form = None;
        self.ui_mode = UiMode::Normal;
    }

    pub fn request_delete_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            if self.engine.request_delete(id) {
                self.status_message = Some("Deleting... press u to undo".to_string());
            }
            self.refresh();
        }
    }

    pub fn undo_delete_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            if self.engine.undo_delete(id) {
                self.status_message = Some("Delete undone".to_string());
            }
            self.refresh();
        }
    }

    pub fn confirm_delete_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            self.engine.confirm_delete(id);
            self.refresh();
        }
    }

    pub fn complete_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            if self.engine.complete_task(id) {
                self.status_message = Some("Task completed".to_string());
            }
            self.refresh();
        }
    }

    /// Start holding the stop control on the selected task
    pub fn press_hold_selected(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        if !self.hold_supported {
            self.force_stop(id);
            return;
        }
        self.engine.press_hold(id);
        self.held_task = Some(id);
        self.refresh();
    }

    pub fn release_hold(&mut self) {
        if let Some(id) = self.held_task.take() {
            self.engine.release_hold(id);
            self.refresh();
        }
    }

    pub fn force_stop_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            self.force_stop(id);
        }
    }

    fn force_stop(&mut self, id: TaskId) {
        if self.engine.force_stop_task(id) {
            self.status_message = Some("Task force-stopped".to_string());
        }
        self.refresh();
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        if visibility == Visibility::Background {
            self.held_task = None;
        }
        let events = self.engine.set_visibility(visibility);
        self.apply_events(&events);
        self.refresh();
    }

    /// Drive the engine's timers
    pub fn tick(&mut self) {
        let events = self.engine.poll();
        self.apply_events(&events);
        self.refresh();
    }

    pub fn shutdown(&mut self) {
        self.engine.shutdown();
        self.refresh();
    }

    fn apply_events(&mut self, events: &[EngineEvent]) {
        for event in events {
            self.status_message = Some(self.describe_event(event));
            if matches!(event, EngineEvent::TaskForceStopped { id, .. } if self.held_task == Some(*id)) {
                self.held_task = None;
            }
        }
    }

    fn task_name(&self, id: TaskId) -> String {
        self.snapshot
            .task(id)
            .map(|t| t.name.clone())
            .or_else(|| {
                self.snapshot
                    .completed
                    .iter()
                    .find(|c| c.task.id == id)
                    .map(|c| c.task.name.clone())
            })
            .unwrap_or_else(|| format!("#{}", id))
    }

    fn describe_event(&self, event: &EngineEvent) -> String {
        match event {
            EngineEvent::TaskForceStopped { id, reason } => {
                format!("{} {}", self.task_name(*id), reason.describe())
            }
            EngineEvent::TaskReconciled { id, gap_ms } => {
                format!("{} caught up {}s", self.task_name(*id), gap_ms / 1000)
            }
            EngineEvent::TaskCompleted { id } => format!("{} deleted", self.task_name(*id)),
            EngineEvent::DayRolledOver { day } => format!("New day: {}", day.format("%a %b %d")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allcounts::persistence::MemoryStore;
    use allcounts::{EngineConfig, ManualClock};

    const T0: i64 = 1_700_028_000_000;

    fn create_test_app(hold_supported: bool) -> (AppState, ManualClock) {
        let clock = ManualClock::new(T0);
        let engine = Engine::open(MemoryStore::new(), clock.clone(), EngineConfig::default());
        (AppState::new(engine, hold_supported), clock)
    }

    #[test]
    fn test_app_state_new() {
        let (app, _clock) = create_test_app(true);
        assert_eq!(app.snapshot.tasks.len(), 4);
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.ui_mode, UiMode::Normal);
    }

    #[test]
    fn test_move_selection() {
        let (mut app, _clock) = create_test_app(true);
        app.move_selection_up();
        assert_eq!(app.selected_index, 0);

        for _ in 0..10 {
            app.move_selection_down();
        }
        assert_eq!(app.selected_index, 3);
        assert_eq!(app.selected_task_id(), Some(4));
    }

    #[test]
    fn test_toggle_selected_starts_and_stops() {
        let (mut app, clock) = create_test_app(true);
        app.toggle_selected();
        assert_eq!(app.snapshot.active_task_id, Some(1));

        clock.advance(2_000);
        app.toggle_selected();
        assert_eq!(app.snapshot.active_task_id, None);
        assert_eq!(app.snapshot.tasks[0].elapsed_ms, 2_000);
    }

    #[test]
    fn test_add_task_selects_new_row() {
        let (mut app, _clock) = create_test_app(true);
        app.start_add_task(TaskKind::one_time());
        for c in "Email".chars() {
            app.input_form_add_char(c);
        }
        app.submit_input_form();

        assert_eq!(app.ui_mode, UiMode::Normal);
        assert!(app.input_form.is_none());
        assert_eq!(app.snapshot.tasks.len(), 5);
        assert_eq!(app.selected_task_id(), Some(5));
    }

    #[test]
    fn test_selection_clamped_after_complete() {
        let (mut app, _clock) = create_test_app(true);
        app.selected_index = 3;
        app.complete_selected();
        assert_eq!(app.snapshot.tasks.len(), 3);
        assert_eq!(app.selected_index, 2);
    }

    #[test]
    fn test_hold_without_release_support_stops_at_once() {
        let (mut app, _clock) = create_test_app(false);
        app.toggle_selected();
        app.press_hold_selected();
        assert_eq!(app.snapshot.active_task_id, None);
        assert!(!app.snapshot.tasks[0].is_running);
    }

    #[test]
    fn test_held_stop_reports_event() {
        let (mut app, clock) = create_test_app(true);
        app.toggle_selected();
        app.press_hold_selected();
        clock.advance(600);
        app.tick();

        assert!(!app.snapshot.tasks[0].is_running);
        assert_eq!(app.status_message.as_deref(), Some("Cleaning force-stopped"));
    }

    #[test]
    fn test_reset_needs_confirmation() {
        let (mut app, _clock) = create_test_app(true);
        app.toggle_session();
        app.request_reset();
        assert_eq!(app.ui_mode, UiMode::ConfirmReset);
        app.cancel_reset();
        assert_eq!(app.snapshot.state, allcounts::domain::SessionState::Active);

        app.request_reset();
        app.confirm_reset();
        assert_eq!(app.snapshot.state, allcounts::domain::SessionState::Idle);
    }
}
