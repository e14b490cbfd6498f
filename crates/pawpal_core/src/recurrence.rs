use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::{Duration, PrimitiveDateTime};

/// How a task repeats once it has been completed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
}

impl Recurrence {
    /// Fixed step between two occurrences, `None` for one-off tasks.
    pub fn interval(self) -> Option<Duration> {
        match self {
            Self::None => None,
            Self::Daily => Some(Duration::days(1)),
            Self::Weekly => Some(Duration::weeks(1)),
        }
    }

    pub fn is_recurring(self) -> bool {
        self.interval().is_some()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            other => Err(AppError::validation(format!(
                "unknown recurrence '{other}', expected none, daily or weekly"
            ))),
        }
    }
}

/// Computes the due timestamp of the occurrence following `due_at`.
///
/// The step is a fixed wall-clock increment, so the time of day is kept.
/// Asking for the successor of a non-recurring task is a caller bug and
/// fails with a policy error.
pub fn next_due(
    due_at: PrimitiveDateTime,
    recurrence: Recurrence,
) -> Result<PrimitiveDateTime, AppError> {
    let step = recurrence
        .interval()
        .ok_or_else(|| AppError::policy("next_due called on a non-recurring task"))?;

    due_at
        .checked_add(step)
        .ok_or_else(|| AppError::invalid_data("next occurrence is out of the supported date range"))
}
