use crate::error::AppError;
use crate::model::PetId;
use crate::recurrence::{Recurrence, next_due};
use serde::{Deserialize, Serialize};
use std::fmt;
use time::{Date, PrimitiveDateTime};
use tracing::debug;

time::serde::format_description!(
    due_at_format,
    PrimitiveDateTime,
    "[year]-[month]-[day]T[hour]:[minute]:[second]"
);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn generate() -> Self {
        Self(format!("task-{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Urgency on a 1..=5 scale where 1 is the most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const HIGHEST: Priority = Priority(1);
    pub const LOWEST: Priority = Priority(5);

    pub fn new(value: u8) -> Result<Self, AppError> {
        if (Self::HIGHEST.0..=Self::LOWEST.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AppError::validation(format!(
                "priority must be between {} and {}, got {value}",
                Self::HIGHEST.0,
                Self::LOWEST.0
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for Priority {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "done" | "completed" => Ok(Self::Done),
            other => Err(AppError::validation(format!(
                "unknown status '{other}', expected pending or done"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(with = "due_at_format")]
    pub due_at: PrimitiveDateTime,
    #[serde(default)]
    pub priority: Priority,
    pub status: TaskStatus,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_id: Option<PetId>,
}

impl Task {
    /// Builds a pending task with a freshly generated id.
    pub fn new(
        title: &str,
        due_at: PrimitiveDateTime,
        priority: u8,
        recurrence: Recurrence,
    ) -> Result<Self, AppError> {
        Self::with_id(TaskId::generate(), title, due_at, priority, recurrence)
    }

    pub fn with_id(
        id: TaskId,
        title: &str,
        due_at: PrimitiveDateTime,
        priority: u8,
        recurrence: Recurrence,
    ) -> Result<Self, AppError> {
        if id.as_str().is_empty() {
            return Err(AppError::validation("id is required"));
        }

        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("title is required"));
        }

        let due_at = due_at
            .replace_nanosecond(0)
            .map_err(|err| AppError::validation(err.to_string()))?;

        Ok(Self {
            id,
            title: trimmed.to_string(),
            due_at,
            priority: Priority::new(priority)?,
            status: TaskStatus::Pending,
            recurrence,
            pet_id: None,
        })
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    pub fn is_due_on(&self, date: Date) -> bool {
        self.due_at.date() == date
    }

    /// Marks the task done and returns the next occurrence for recurring
    /// tasks.
    ///
    /// Completing an already done task is a no-op returning `Ok(None)`. The
    /// returned successor is not stored anywhere; callers holding the owning
    /// collection must append it (see `TaskCollection::mark_done`).
    #[must_use = "the next occurrence of a recurring task must be stored"]
    pub fn mark_done(&mut self) -> Result<Option<Task>, AppError> {
        if self.is_done() {
            debug!(task_id = %self.id, "task already done");
            return Ok(None);
        }

        let next = if self.recurrence.is_recurring() {
            Some(self.next_occurrence()?)
        } else {
            None
        };

        self.status = TaskStatus::Done;
        debug!(
            task_id = %self.id,
            spawned = next.as_ref().map(|task| task.id.as_str()),
            "task marked done"
        );

        Ok(next)
    }

    fn next_occurrence(&self) -> Result<Task, AppError> {
        Ok(Task {
            id: TaskId::generate(),
            title: self.title.clone(),
            due_at: next_due(self.due_at, self.recurrence)?,
            priority: self.priority,
            status: TaskStatus::Pending,
            recurrence: self.recurrence,
            pet_id: self.pet_id.clone(),
        })
    }
}
