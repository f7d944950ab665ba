use std::collections::HashMap;

use crate::task::Task;

/// Tasks registered on a pipeline, looked up by step id during rollback.
///
/// Entries are never removed; a later task with the same id replaces the
/// earlier one.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: HashMap<String, Task>,
}

impl TaskRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, task: Task) {
        self.tasks.insert(task.id().to_string(), task);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
