use crate::error::AppError;
use crate::model::{PetId, Task, TaskId};
use serde::{Deserialize, Serialize};
use time::Date;
use tracing::debug;

/// Tasks belonging to one pet, kept in insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskCollection {
    tasks: Vec<Task>,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.get(id).is_some()
    }

    pub fn due_on(&self, date: Date) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| task.is_due_on(date))
            .cloned()
            .collect()
    }

    pub fn add(&mut self, task: Task) -> Result<(), AppError> {
        if self.contains(&task.id) {
            return Err(AppError::validation(format!(
                "task '{}' already exists",
                task.id
            )));
        }

        self.tasks.push(task);
        Ok(())
    }

    pub fn remove(&mut self, id: &TaskId) -> Result<Task, AppError> {
        let index = self.position(id)?;
        Ok(self.tasks.remove(index))
    }

    /// Completes the task and appends its next occurrence, if any, to this
    /// collection. The appended task is also returned.
    pub fn mark_done(&mut self, id: &TaskId) -> Result<Option<Task>, AppError> {
        let index = self.position(id)?;
        let next = self.tasks[index].mark_done()?;

        if let Some(task) = next.as_ref() {
            debug!(completed = %id, next = %task.id, "appending next occurrence");
            self.tasks.push(task.clone());
        }

        Ok(next)
    }

    pub(crate) fn assign_pet(&mut self, pet_id: &PetId) {
        for task in &mut self.tasks {
            task.pet_id = Some(pet_id.clone());
        }
    }

    fn position(&self, id: &TaskId) -> Result<usize, AppError> {
        self.tasks
            .iter()
            .position(|task| &task.id == id)
            .ok_or_else(|| AppError::not_found(format!("task '{id}' not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::TaskCollection;
    use crate::model::{Task, TaskId, TaskStatus};
    use crate::recurrence::Recurrence;
    use time::macros::{date, datetime};

    fn task(title: &str, recurrence: Recurrence) -> Task {
        Task::new(title, datetime!(2024-01-01 08:00), 2, recurrence).unwrap()
    }

    #[test]
    fn add_keeps_insertion_order() {
        let mut tasks = TaskCollection::new();
        tasks.add(task("Walk", Recurrence::None)).unwrap();
        tasks.add(task("Feed", Recurrence::None)).unwrap();

        let titles: Vec<_> = tasks.all().iter().map(|task| task.title.as_str()).collect();
        assert_eq!(titles, vec!["Walk", "Feed"]);
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let mut tasks = TaskCollection::new();
        let first = task("Walk", Recurrence::None);
        tasks.add(first.clone()).unwrap();

        let err = tasks.add(first).unwrap_err();

        assert_eq!(err.code(), "validation_error");
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn due_on_matches_calendar_date_only() {
        let mut tasks = TaskCollection::new();
        tasks
            .add(Task::new("Early", datetime!(2024-01-01 00:00), 3, Recurrence::None).unwrap())
            .unwrap();
        tasks
            .add(Task::new("Late", datetime!(2024-01-01 23:59), 3, Recurrence::None).unwrap())
            .unwrap();
        tasks
            .add(Task::new("Next day", datetime!(2024-01-02 00:00), 3, Recurrence::None).unwrap())
            .unwrap();

        let due = tasks.due_on(date!(2024-01-01));

        assert_eq!(due.len(), 2);
        assert!(tasks.due_on(date!(2023-12-31)).is_empty());
    }

    #[test]
    fn remove_returns_task_and_reports_missing() {
        let mut tasks = TaskCollection::new();
        let walk = task("Walk", Recurrence::None);
        let id = walk.id.clone();
        tasks.add(walk).unwrap();

        let removed = tasks.remove(&id).unwrap();
        assert_eq!(removed.title, "Walk");
        assert!(tasks.is_empty());

        let err = tasks.remove(&id).unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn mark_done_on_one_off_keeps_size() {
        let mut tasks = TaskCollection::new();
        let vet = task("Vet", Recurrence::None);
        let id = vet.id.clone();
        tasks.add(vet).unwrap();
        tasks.add(task("Walk", Recurrence::None)).unwrap();

        let next = tasks.mark_done(&id).unwrap();

        assert!(next.is_none());
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks.get(&id).unwrap().status, TaskStatus::Done);
        assert_eq!(tasks.all()[1].status, TaskStatus::Pending);
    }

    #[test]
    fn mark_done_on_recurring_appends_successor() {
        let mut tasks = TaskCollection::new();
        let feed = task("Feed", Recurrence::Daily);
        let id = feed.id.clone();
        tasks.add(feed).unwrap();

        let next = tasks.mark_done(&id).unwrap().expect("successor");

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks.get(&id).unwrap().status, TaskStatus::Done);
        assert_eq!(tasks.all()[1], next);
        assert_eq!(next.due_at, datetime!(2024-01-02 08:00));
    }

    #[test]
    fn mark_done_twice_appends_once() {
        let mut tasks = TaskCollection::new();
        let feed = task("Feed", Recurrence::Weekly);
        let id = feed.id.clone();
        tasks.add(feed).unwrap();

        tasks.mark_done(&id).unwrap();
        let again = tasks.mark_done(&id).unwrap();

        assert!(again.is_none());
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn mark_done_unknown_id_is_not_found() {
        let mut tasks = TaskCollection::new();
        let err = tasks.mark_done(&TaskId::from("task-404")).unwrap_err();
        assert_eq!(err.code(), "not_found");
    }
}
