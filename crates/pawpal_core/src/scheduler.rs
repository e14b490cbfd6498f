//! Ordering, filtering and conflict detection over a snapshot of tasks.
//!
//! Every function here is pure: it reads the tasks it is given and returns
//! fully materialized results. Conflicts are exact-instant collisions only;
//! task durations are not modeled, so 08:00 and 08:05 never clash.

use crate::model::{PetId, Task, TaskStatus};
use std::collections::{BTreeMap, HashSet};
use time::{Date, PrimitiveDateTime};

/// Orders tasks by due time, then by priority (most urgent first).
///
/// The sort is stable: tasks with equal due time and priority keep their
/// input order.
pub fn sort_tasks(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| {
        a.due_at
            .cmp(&b.due_at)
            .then_with(|| a.priority.cmp(&b.priority))
    });
    sorted
}

/// Optional predicates applied before the date filter result is sorted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub pet_id: Option<PetId>,
}

impl TaskFilter {
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_pet(mut self, pet_id: PetId) -> Self {
        self.pet_id = Some(pet_id);
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        let status_ok = self.status.is_none_or(|status| task.status == status);
        let pet_ok = self
            .pet_id
            .as_ref()
            .is_none_or(|pet_id| task.pet_id.as_ref() == Some(pet_id));
        status_ok && pet_ok
    }
}

/// Tasks due on `date` (time of day ignored) that pass `filter`, sorted.
pub fn get_todays_tasks(all_tasks: &[Task], date: Date, filter: &TaskFilter) -> Vec<Task> {
    let selected: Vec<Task> = all_tasks
        .iter()
        .filter(|task| task.is_due_on(date) && filter.matches(task))
        .cloned()
        .collect();
    sort_tasks(&selected)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictGroup {
    pub due_at: PrimitiveDateTime,
    pub tasks: Vec<Task>,
}

/// Groups tasks that share the exact same due timestamp.
///
/// Groups come out in due time order and keep the input order inside each
/// group. A task listed twice in the input is only counted once.
pub fn detect_conflicts(tasks: &[Task]) -> Vec<ConflictGroup> {
    let mut seen = HashSet::new();
    let mut by_instant: BTreeMap<PrimitiveDateTime, Vec<Task>> = BTreeMap::new();

    for task in tasks {
        if !seen.insert(&task.id) {
            continue;
        }
        by_instant.entry(task.due_at).or_default().push(task.clone());
    }

    by_instant
        .into_iter()
        .filter(|(_, group)| group.len() > 1)
        .map(|(due_at, tasks)| ConflictGroup { due_at, tasks })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyPlan {
    pub date: Date,
    pub tasks: Vec<Task>,
    pub conflicts: Vec<ConflictGroup>,
}

pub fn build_daily_plan(all_tasks: &[Task], date: Date, filter: &TaskFilter) -> DailyPlan {
    let tasks = get_todays_tasks(all_tasks, date, filter);
    let conflicts = detect_conflicts(&tasks);
    DailyPlan {
        date,
        tasks,
        conflicts,
    }
}
