use crate::clock::Millis;
use crate::domain::TaskId;
use std::collections::HashMap;

/// Press-and-hold tracker for the force-stop escape hatch
#[derive(Debug, Clone)]
pub struct HoldGesture {
    threshold_ms: Millis,
    pressed_at: HashMap<TaskId, Millis>,
}

impl HoldGesture {
    pub fn new(threshold_ms: Millis) -> Self {
        Self {
            threshold_ms,
            pressed_at: HashMap::new(),
        }
    }

    /// Start holding; repeated presses keep the original start
    pub fn press(&mut self, id: TaskId, now: Millis) {
        self.pressed_at.entry(id).or_insert(now);
    }

    /// Let go before the threshold. Returns false if nothing was held.
    pub fn release(&mut self, id: TaskId) -> bool {
        self.pressed_at.remove(&id).is_some()
    }

    /// Fraction of the threshold held so far (0.0..=1.0)
    pub fn progress(&self, id: TaskId, now: Millis) -> f64 {
        match self.pressed_at.get(&id) {
            Some(&at) if self.threshold_ms > 0 => {
                ((now - at).max(0) as f64 / self.threshold_ms as f64).min(1.0)
            }
            Some(_) => 1.0,
            None => 0.0,
        }
    }

    /// Holds that crossed the threshold; they are consumed
    pub fn due(&mut self, now: Millis) -> Vec<TaskId> {
        let threshold = self.threshold_ms;
        let mut fired: Vec<TaskId> = self
            .pressed_at
            .iter()
            .filter(|(_, &at)| now.saturating_sub(at) >= threshold)
            .map(|(&id, _)| id)
            .collect();
        fired.sort_unstable();
        for id in &fired {
            self.pressed_at.remove(id);
        }
        fired
    }

    pub fn clear(&mut self) {
        self.pressed_at.clear();
    }
}
