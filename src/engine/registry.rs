use crate::domain::{CompletedTask, Task, TaskId, TaskKind};
use chrono::{DateTime, Local};

/// Owns the live tasks and the completed list
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    completed: Vec<CompletedTask>,
}

impl TaskRegistry {
    pub fn new(tasks: Vec<Task>, completed: Vec<CompletedTask>) -> Self {
        Self { tasks, completed }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> impl Iterator<Item = &mut Task> {
        self.tasks.iter_mut()
    }

    pub fn completed(&self) -> &[CompletedTask] {
        &self.completed
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_running(&self, id: TaskId) -> bool {
        self.get(id).is_some_and(|t| t.is_running)
    }

    /// IDs of every task flagged running
    pub fn running_ids(&self) -> Vec<TaskId> {
        self.tasks
            .iter()
            .filter(|t| t.is_running)
            .map(|t| t.id)
            .collect()
    }

    /// Next free ID; completed tasks keep theirs reserved
    pub fn next_id(&self) -> TaskId {
        self.tasks
            .iter()
            .map(|t| t.id)
            .chain(self.completed.iter().map(|c| c.task.id))
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Add a task; blank names are ignored
    pub fn add(&mut self, name: &str, kind: TaskKind) -> Option<TaskId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let id = self.next_id();
        self.tasks.push(Task::new(id, name, kind));
        Some(id)
    }

    /// Move a task to the completed list. The caller stops it first.
    pub fn complete(&mut self, id: TaskId, completed_at: DateTime<Local>) -> bool {
        match self.tasks.iter().position(|t| t.id == id) {
            Some(index) => {
                let task = self.tasks.remove(index);
                self.completed.push(CompletedTask::new(task, completed_at));
                true
            }
            None => false,
        }
    }

    pub fn clear_completed(&mut self) {
        self.completed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TaskRegistry {
        TaskRegistry::new(
            vec![
                Task::new(1, "Cleaning", TaskKind::recurring()),
                Task::new(3, "Finish Project", TaskKind::one_time()),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn test_add_assigns_next_id_and_trims() {
        let mut registry = registry();
        let id = registry.add("  Write report ", TaskKind::one_time()).unwrap();

        assert_eq!(id, 4);
        assert_eq!(registry.get(id).unwrap().name, "Write report");
    }

    #[test]
    fn test_add_ignores_blank_names() {
        let mut registry = registry();
        assert_eq!(registry.add("   ", TaskKind::one_time()), None);
        assert_eq!(registry.tasks().len(), 2);
    }

    #[test]
    fn test_next_id_on_empty_registry() {
        assert_eq!(TaskRegistry::default().next_id(), 1);
    }

    #[test]
    fn test_completed_ids_stay_reserved() {
        let mut registry = registry();
        assert!(registry.complete(3, Local::now()));
        assert!(!registry.contains(3));
        assert_eq!(registry.completed().len(), 1);
        assert_eq!(registry.next_id(), 4);
    }

    #[test]
    fn test_complete_unknown_task() {
        let mut registry = registry();
        assert!(!registry.complete(99, Local::now()));
        assert!(registry.completed().is_empty());
    }

    #[test]
    fn test_running_ids() {
        let mut registry = registry();
        assert!(registry.running_ids().is_empty());

        registry.get_mut(3).unwrap().start(0);
        assert_eq!(registry.running_ids(), vec![3]);
        assert!(registry.is_running(3));
        assert!(!registry.is_running(1));
    }
}
