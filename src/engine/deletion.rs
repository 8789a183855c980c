use crate::clock::Millis;
use crate::domain::TaskId;
use std::collections::BTreeMap;

/// Tasks waiting out their undo window before being moved to the completed list
#[derive(Debug, Clone)]
pub struct PendingDeletes {
    countdown_ms: Millis,
    deadlines: BTreeMap<TaskId, Millis>,
}

impl PendingDeletes {
    pub fn new(countdown_secs: i64) -> Self {
        Self {
            countdown_ms: countdown_secs.max(0).saturating_mul(1000),
            deadlines: BTreeMap::new(),
        }
    }

    /// Start the countdown. Returns false if the task is already pending.
    pub fn request(&mut self, id: TaskId, now: Millis) -> bool {
        if self.deadlines.contains_key(&id) {
            return false;
        }
        self.deadlines.insert(id, now.saturating_add(self.countdown_ms));
        true
    }

    /// Undo
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.deadlines.remove(&id).is_some()
    }

    /// Whole seconds left, rounded up (what the countdown shows)
    pub fn remaining_secs(&self, id: TaskId, now: Millis) -> Option<i64> {
        self.deadlines
            .get(&id)
            .map(|&deadline| (deadline - now).max(0).saturating_add(999) / 1000)
    }

    /// Pending tasks whose countdown ran out; they are consumed
    pub fn expired(&mut self, now: Millis) -> Vec<TaskId> {
        let expired: Vec<TaskId> = self
            .deadlines
            .iter()
            .filter(|(_, &deadline)| now >= deadline)
            .map(|(&id, _)| id)
            .collect();
        for id in &expired {
            self.deadlines.remove(id);
        }
        expired
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_rounds_up() {
        let mut deletes = PendingDeletes::new(5);
        assert!(deletes.request(3, 0));

        assert_eq!(deletes.remaining_secs(3, 0), Some(5));
        assert_eq!(deletes.remaining_secs(3, 1), Some(5));
        assert_eq!(deletes.remaining_secs(3, 4_001), Some(1));
        assert_eq!(deletes.remaining_secs(3, 6_000), Some(0));
        assert_eq!(deletes.remaining_secs(4, 0), None);
    }

    #[test]
    fn test_request_twice_keeps_first_deadline() {
        let mut deletes = PendingDeletes::new(5);
        deletes.request(3, 0);
        assert!(!deletes.request(3, 4_000));
        assert_eq!(deletes.expired(5_000), vec![3]);
    }

    #[test]
    fn test_expired_consumes_entries() {
        let mut deletes = PendingDeletes::new(5);
        deletes.request(1, 0);
        deletes.request(2, 2_000);

        assert!(deletes.expired(4_999).is_empty());
        assert_eq!(deletes.expired(5_000), vec![1]);
        assert_eq!(deletes.remaining_secs(2, 5_000), Some(2));
        assert_eq!(deletes.expired(7_000), vec![2]);
        assert_eq!(deletes.remaining_secs(2, 7_000), None);
    }

    #[test]
    fn test_huge_countdown_saturates() {
        let mut deletes = PendingDeletes::new(i64::MAX);
        assert!(deletes.request(1, 1_000));
        assert!(deletes.expired(1_000_000).is_empty());
        assert!(deletes.remaining_secs(1, 1_000).is_some());
    }

    #[test]
    fn test_cancel() {
        let mut deletes = PendingDeletes::new(5);
        deletes.request(1, 0);
        assert!(deletes.cancel(1));
        assert!(!deletes.cancel(1));
        assert!(deletes.expired(60_000).is_empty());
    }
}
