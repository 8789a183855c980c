//! Session & task timing engine.
//!
//! [`Engine`] owns every piece of mutable timing state: the task registry, the
//! session state machine, the stall watchdog, the visibility reconciler, the
//! force-stop hold tracker and the pending deletes. It is driven by a single
//! loop that sends commands and calls [`Engine::poll`] regularly.
//!
//! Only the session command path ever sets a task running. The watchdog, the
//! reconciler and force-stop may only stop a task or refresh its timestamps.

pub mod deletion;
pub mod force_stop;
pub mod reconciler;
pub mod registry;
pub mod session;
pub mod watchdog;

use crate::clock::{Clock, Millis};
use crate::config::EngineConfig;
use crate::domain::{
    millis_to_secs, CompletedTask, SessionState, StopReason, TaskId, TaskKind, Visibility,
};
use crate::persistence::{TodoStore, TodosState};
use crate::ticker::Interval;
use chrono::NaiveDate;
use deletion::PendingDeletes;
use force_stop::HoldGesture;
use reconciler::{ReconcileOutcome, VisibilityReconciler};
use registry::TaskRegistry;
use session::Session;
use tracing::{debug, info, warn};
use watchdog::StallWatchdog;

/// Something the engine did on its own that a front-end may want to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    TaskForceStopped { id: TaskId, reason: StopReason },
    TaskReconciled { id: TaskId, gap_ms: Millis },
    TaskCompleted { id: TaskId },
    DayRolledOver { day: NaiveDate },
}

/// Read-only view of one task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskView {
    pub id: TaskId,
    pub name: String,
    pub kind: TaskKind,
    pub is_running: bool,
    pub is_active: bool,
    pub elapsed_ms: Millis,
    pub time_today_ms: Millis,
    pub has_started_today: bool,
    /// Seconds left before a pending delete goes through
    pub pending_delete_secs: Option<i64>,
    /// Force-stop hold progress (0.0..=1.0)
    pub hold_progress: f64,
}

/// Read-only view of the whole engine at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub state: SessionState,
    pub visibility: Visibility,
    pub active_task_id: Option<TaskId>,
    /// Whole seconds
    pub used_time: i64,
    pub wasted_time: i64,
    pub current_session_time: i64,
    pub tasks: Vec<TaskView>,
    pub completed: Vec<CompletedTask>,
}

impl EngineSnapshot {
    pub fn task(&self, id: TaskId) -> Option<&TaskView> {
        self.tasks.iter().find(|t| t.id == id)
    }
}

pub struct Engine {
    clock: Box<dyn Clock>,
    store: Box<dyn TodoStore>,
    registry: TaskRegistry,
    session: Session,
    watchdog: StallWatchdog,
    reconciler: VisibilityReconciler,
    holds: HoldGesture,
    deletes: PendingDeletes,
    session_tick: Interval,
    watchdog_tick: Interval,
    day: NaiveDate,
    shut_down: bool,
}

impl Engine {
    /// Load tasks from `store` and build an idle engine.
    ///
    /// Tasks saved as running are settled first: credited up to their last
    /// recorded tick when one exists, otherwise stopped with no credit.
    pub fn open(
        store: impl TodoStore + 'static,
        clock: impl Clock + 'static,
        config: EngineConfig,
    ) -> Self {
        let now = clock.now_ms();
        let today = clock.local_date(now);

        let state = store.load_todos().unwrap_or_else(|err| {
            warn!(adapter = store.adapter_name(), error = %err, "Failed to load tasks, starting from defaults");
            TodosState::seeded()
        });
        let (tasks, completed, day) = state.into_tasks();
        info!(
            adapter = store.adapter_name(),
            tasks = tasks.len(),
            completed = completed.len(),
            "Loaded tasks"
        );

        let mut engine = Self {
            clock: Box::new(clock),
            store: Box::new(store),
            registry: TaskRegistry::new(tasks, completed),
            session: Session::new(),
            watchdog: StallWatchdog::new(config.stall_samples),
            reconciler: VisibilityReconciler::new(),
            holds: HoldGesture::new(config.force_stop_hold_ms),
            deletes: PendingDeletes::new(config.delete_countdown_secs),
            session_tick: Interval::new(config.session_tick_ms),
            watchdog_tick: Interval::new(config.watchdog_period_ms),
            day: day.unwrap_or(today),
            shut_down: false,
        };

        let restored = engine.restore_running();
        let rolled = engine.check_day(now).is_some();
        if restored || rolled {
            engine.save();
        }
        engine.sync_schedules(now);
        engine
    }

    pub fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn visibility(&self) -> Visibility {
        self.reconciler.visibility()
    }

    pub fn active_task_id(&self) -> Option<TaskId> {
        self.session.active_task_id()
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Authoritative elapsed time of a task right now
    pub fn elapsed_ms(&self, id: TaskId) -> Option<Millis> {
        let now = self.now();
        self.registry.get(id).map(|t| t.elapsed_ms(now))
    }

    pub fn is_session_tick_armed(&self) -> bool {
        self.session_tick.is_armed()
    }

    pub fn is_watchdog_armed(&self) -> bool {
        self.watchdog_tick.is_armed()
    }

    /// Idle/Paused -> Active
    pub fn start_session(&mut self) {
        let now = self.now();
        if self.session.activate(now) {
            info!("Session started");
        }
        self.sync_schedules(now);
    }

    /// Active -> Paused, stopping the active task as if its stop control was pressed
    pub fn pause_session(&mut self) {
        let now = self.now();
        if !self.session.is_active() {
            return;
        }
        let stopped = self.stop_active(now);
        self.session.pause(now);
        info!("Session paused");
        if stopped {
            self.save();
        }
        self.sync_schedules(now);
    }

    /// The start button: start, pause or resume depending on the state
    pub fn toggle_session(&mut self) {
        match self.session.state() {
            SessionState::Idle | SessionState::Paused => self.start_session(),
            SessionState::Active => self.pause_session(),
        }
    }

    /// Back to Idle: zero both buckets and every task's daily values, clear the completed list
    pub fn reset_session(&mut self) {
        let now = self.now();
        self.stop_active(now);
        for task in self.registry.tasks_mut() {
            task.force_stop();
            task.reset_today();
        }
        self.registry.clear_completed();
        self.deletes.clear();
        self.holds.clear();
        self.watchdog.reset();
        self.session.reset();
        info!("Session reset");
        self.save();
        self.sync_schedules(now);
    }

    /// Make `id` the active task, stopping whatever else runs. Starting work
    /// also starts (or resumes) the session.
    pub fn start_task(&mut self, id: TaskId) {
        let now = self.now();
        self.release_orphaned_active(now);

        if !self.registry.contains(id) || self.session.active_task_id() == Some(id) {
            return;
        }

        self.stop_active(now);
        for other in self.registry.running_ids() {
            if let Some(task) = self.registry.get_mut(other) {
                let credited = task.stop(now);
                debug!(task = other, credited_ms = credited, "Stopped stray running task");
            }
        }

        if self.session.activate(now) {
            info!("Session started by task");
        }
        self.session.set_active_task(Some(id), now);
        if let Some(task) = self.registry.get_mut(id) {
            task.start(now);
            info!(task = id, name = %task.name, "Task started");
        }
        self.watchdog.forget(id);
        self.save();
        self.sync_schedules(now);
    }

    /// Stop the active task. Anything else is a no-op.
    pub fn stop_task(&mut self, id: TaskId) {
        let now = self.now();
        if self.session.active_task_id() != Some(id) {
            return;
        }
        if self.stop_active(now) {
            self.save();
        }
        self.sync_schedules(now);
    }

    /// Stop a task no matter what state the engine thinks it is in.
    /// The open run is not credited. Returns false if it was already stopped.
    pub fn force_stop_task(&mut self, id: TaskId) -> bool {
        let now = self.now();
        self.holds.release(id);

        let stopped = self
            .registry
            .get_mut(id)
            .map(|task| task.force_stop())
            .unwrap_or(false);
        if !stopped {
            return false;
        }

        warn!(task = id, "Task force-stopped");
        self.watchdog.forget(id);
        self.release_orphaned_active(now);
        self.save();
        self.sync_schedules(now);
        true
    }

    /// Add a task; blank names are ignored
    pub fn add_task(&mut self, name: &str, kind: TaskKind) -> Option<TaskId> {
        let id = self.registry.add(name, kind)?;
        debug!(task = id, "Task added");
        self.save();
        Some(id)
    }

    /// Stop the task if needed and move it to the completed list
    pub fn complete_task(&mut self, id: TaskId) -> bool {
        let now = self.now();
        if !self.finish_task(id, now) {
            return false;
        }
        self.save();
        self.sync_schedules(now);
        true
    }

    /// Start the undo countdown for a task
    pub fn request_delete(&mut self, id: TaskId) -> bool {
        let now = self.now();
        self.registry.contains(id) && self.deletes.request(id, now)
    }

    pub fn undo_delete(&mut self, id: TaskId) -> bool {
        self.deletes.cancel(id)
    }

    /// Skip the rest of the countdown
    pub fn confirm_delete(&mut self, id: TaskId) -> bool {
        self.deletes.cancel(id);
        self.complete_task(id)
    }

    /// Begin holding the stop control of a running task
    pub fn press_hold(&mut self, id: TaskId) {
        let now = self.now();
        if self.registry.is_running(id) {
            self.holds.press(id, now);
        }
    }

    pub fn release_hold(&mut self, id: TaskId) {
        self.holds.release(id);
    }

    /// Foreground/background transition. Returning to the foreground
    /// reconciles running tasks before the watchdog samples again.
    pub fn set_visibility(&mut self, visibility: Visibility) -> Vec<EngineEvent> {
        let now = self.now();
        if self.shut_down || visibility == self.reconciler.visibility() {
            return Vec::new();
        }

        let mut events = Vec::new();
        match visibility {
            Visibility::Background => {
                self.session.settle(now);
                self.reconciler.on_hidden(&mut self.registry, now);
                self.holds.clear();
                debug!("Moved to background");
            }
            Visibility::Foreground => {
                for outcome in self.reconciler.on_visible(&mut self.registry, now) {
                    match outcome {
                        ReconcileOutcome::Reconciled { id, gap_ms, elapsed_ms } => {
                            info!(task = id, gap_ms, elapsed_ms, "Reconciled task after background");
                            events.push(EngineEvent::TaskReconciled { id, gap_ms });
                        }
                        ReconcileOutcome::ForceStopped { id } => {
                            warn!(task = id, "Running task has no start timestamp, stopped");
                            events.push(EngineEvent::TaskForceStopped {
                                id,
                                reason: StopReason::Unrecoverable,
                            });
                        }
                    }
                }
                self.session.settle(now);
                self.release_orphaned_active(now);
                self.watchdog.reset();
                self.watchdog_tick.rearm(now);
                debug!("Moved to foreground");
            }
        }

        self.save();
        self.sync_schedules(now);
        events
    }

    /// Run whatever is due: held force-stops, expired deletes, the day
    /// rollover, the session tick and the watchdog, in that order.
    pub fn poll(&mut self) -> Vec<EngineEvent> {
        if self.shut_down {
            return Vec::new();
        }
        let now = self.now();
        let mut events = Vec::new();
        let mut dirty = false;

        for id in self.holds.due(now) {
            if self.registry.get_mut(id).is_some_and(|t| t.force_stop()) {
                warn!(task = id, "Task force-stopped by hold");
                self.watchdog.forget(id);
                events.push(EngineEvent::TaskForceStopped {
                    id,
                    reason: StopReason::Forced,
                });
                dirty = true;
            }
        }

        for id in self.deletes.expired(now) {
            if self.finish_task(id, now) {
                events.push(EngineEvent::TaskCompleted { id });
                dirty = true;
            }
        }

        if let Some(day) = self.check_day(now) {
            events.push(EngineEvent::DayRolledOver { day });
            dirty = true;
        }

        if self.session_tick.fire(now) {
            self.session.settle(now);
            for task in self.registry.tasks_mut() {
                task.stamp(now);
            }
        }

        if self.watchdog_tick.fire(now) {
            for id in self.watchdog.sample(&mut self.registry, now) {
                warn!(task = id, "Task made no progress, stopped");
                events.push(EngineEvent::TaskForceStopped {
                    id,
                    reason: StopReason::Stalled,
                });
                dirty = true;
            }
        }

        self.release_orphaned_active(now);
        if dirty {
            self.save();
        }
        self.sync_schedules(now);
        events
    }

    /// Teardown: record where running tasks got to, persist and cancel every interval
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        let now = self.now();
        self.session.settle(now);
        for task in self.registry.tasks_mut() {
            task.stamp(now);
        }
        self.save();
        self.shut_down = true;
        self.holds.clear();
        self.sync_schedules(now);
        info!("Engine shut down");
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let now = self.now();
        let active = self.session.active_task_id();

        let tasks = self
            .registry
            .tasks()
            .iter()
            .map(|task| TaskView {
                id: task.id,
                name: task.name.clone(),
                kind: task.kind,
                is_running: task.is_running,
                is_active: active == Some(task.id),
                elapsed_ms: task.elapsed_ms(now),
                time_today_ms: task.time_today(now),
                has_started_today: task.has_started_today(),
                pending_delete_secs: self.deletes.remaining_secs(task.id, now),
                hold_progress: self.holds.progress(task.id, now),
            })
            .collect();

        EngineSnapshot {
            state: self.session.state(),
            visibility: self.reconciler.visibility(),
            active_task_id: active,
            used_time: millis_to_secs(self.session.used_ms(now)),
            wasted_time: millis_to_secs(self.session.wasted_ms(now)),
            current_session_time: millis_to_secs(self.session.current_run_ms(now)),
            tasks,
            completed: self.registry.completed().to_vec(),
        }
    }

    /// Stop the session's active task, crediting it. Returns false if there was none.
    fn stop_active(&mut self, now: Millis) -> bool {
        let Some(id) = self.session.active_task_id() else {
            return false;
        };
        self.session.set_active_task(None, now);
        self.holds.release(id);
        self.watchdog.forget(id);
        if let Some(task) = self.registry.get_mut(id) {
            let credited = task.stop(now);
            info!(task = id, credited_ms = credited, "Task stopped");
        }
        true
    }

    /// Stop (crediting) and move a task to the completed list
    fn finish_task(&mut self, id: TaskId, now: Millis) -> bool {
        if !self.registry.contains(id) {
            return false;
        }
        if self.session.active_task_id() == Some(id) {
            self.stop_active(now);
        } else if let Some(task) = self.registry.get_mut(id) {
            task.stop(now);
        }
        self.deletes.cancel(id);
        self.holds.release(id);
        self.watchdog.forget(id);
        let done = self.registry.complete(id, self.clock.local_time(now));
        if done {
            info!(task = id, "Task completed");
        }
        done
    }

    /// Clear the active task if a corrector stopped it behind the session's back
    fn release_orphaned_active(&mut self, now: Millis) -> bool {
        match self.session.active_task_id() {
            Some(id) if !self.registry.is_running(id) => {
                self.session.set_active_task(None, now);
                debug!(task = id, "Released active task that is no longer running");
                true
            }
            _ => false,
        }
    }

    /// Settle tasks persisted as running
    fn restore_running(&mut self) -> bool {
        let mut changed = false;
        for task in self.registry.tasks_mut().filter(|t| t.is_running) {
            match (task.start_ts, task.last_tick_ts) {
                (Some(_), Some(last_seen)) => {
                    let credited = task.stop(last_seen);
                    info!(task = task.id, credited_ms = credited, "Restored running task up to its last tick");
                }
                _ => {
                    task.force_stop();
                    warn!(task = task.id, "Restored running task without timestamps, stopped");
                }
            }
            changed = true;
        }
        changed
    }

    /// Reset daily values when the local date changes. Running tasks are
    /// split at `now` so their elapsed value stays continuous.
    fn check_day(&mut self, now: Millis) -> Option<NaiveDate> {
        let today = self.clock.local_date(now);
        if today == self.day {
            return None;
        }
        for task in self.registry.tasks_mut() {
            task.split(now);
            task.reset_today();
        }
        info!(from = %self.day, to = %today, "Day rolled over");
        self.day = today;
        Some(today)
    }

    /// Arm or cancel the periodic callbacks to match their governing conditions
    fn sync_schedules(&mut self, now: Millis) {
        let live = !self.shut_down;
        self.session_tick
            .set_armed(live && self.session.is_active(), now);
        self.watchdog_tick
            .set_armed(live && self.reconciler.visibility() == Visibility::Foreground, now);
    }

    fn save(&mut self) {
        let state = TodosState::from_parts(
            self.registry.tasks(),
            self.registry.completed(),
            Some(self.day),
        );
        if let Err(err) = self.store.save_todos(&state) {
            warn!(adapter = self.store.adapter_name(), error = %err, "Failed to save tasks");
        }
    }
}
