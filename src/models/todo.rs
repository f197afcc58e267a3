use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::patch::Patch;
use super::validation::{check_length, check_text, not_null, Validate, ValidationErrors};

pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 500;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Priority must be 1 (Low), 2 (Medium), or 3 (High), got {0}")]
pub struct InvalidPriority(pub i64);

/// Todo priority, carried on the wire and in storage as 1, 2 or 3.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(try_from = "i64", into = "i64")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl TryFrom<i64> for Priority {
    type Error = InvalidPriority;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Low),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::High),
            other => Err(InvalidPriority(other)),
        }
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn apply(mut self, patch: TodoChanges, at: DateTime<Utc>) -> Self {
        self.title = patch.title.apply_required(self.title);
        self.description = patch.description.apply_optional(self.description);
        self.completed = patch.completed.apply_required(self.completed);
        self.priority = patch.priority.apply_required(self.priority);
        self.updated_at = at.max(self.updated_at);
        self
    }

    /// Flip `completed`.
    pub fn toggled(mut self, at: DateTime<Utc>) -> Self {
        self.completed = !self.completed;
        self.updated_at = at.max(self.updated_at);
        self
    }
}

fn default_level() -> i64 {
    Priority::default().into()
}

/// Body of `POST /todos`. The priority level is checked separately from
/// field validation, when converting into a [`NewTodo`].
#[derive(Deserialize, Debug, Clone)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "default_level")]
    pub priority: i64,
}

impl Validate for CreateTodo {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_text(&mut errors, "title", &self.title, TITLE_MAX);
        if let Some(description) = &self.description {
            check_length(&mut errors, "description", description, DESCRIPTION_MAX);
        }
        errors.into_result()
    }
}

/// A create request with a known priority.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
}

impl TryFrom<CreateTodo> for NewTodo {
    type Error = InvalidPriority;

    fn try_from(input: CreateTodo) -> Result<Self, Self::Error> {
        Ok(NewTodo {
            priority: Priority::try_from(input.priority)?,
            title: input.title,
            description: input.description,
            completed: input.completed,
        })
    }
}

/// Body of `PUT`/`PATCH /todos/{id}`.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UpdateTodo {
    pub title: Patch<String>,
    pub description: Patch<String>,
    pub completed: Patch<bool>,
    pub priority: Patch<i64>,
}

/// An update request with a known priority.
#[derive(Debug, Clone, Default)]
pub struct TodoChanges {
    pub title: Patch<String>,
    pub description: Patch<String>,
    pub completed: Patch<bool>,
    pub priority: Patch<Priority>,
}

impl TryFrom<UpdateTodo> for TodoChanges {
    type Error = InvalidPriority;

    fn try_from(patch: UpdateTodo) -> Result<Self, Self::Error> {
        Ok(TodoChanges {
            priority: patch.priority.try_map(Priority::try_from)?,
            title: patch.title,
            description: patch.description,
            completed: patch.completed,
        })
    }
}

impl Validate for UpdateTodo {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match &self.title {
            Patch::Null => not_null(&mut errors, "title"),
            Patch::Value(title) => check_text(&mut errors, "title", title, TITLE_MAX),
            Patch::Absent => {}
        }
        if let Patch::Value(description) = &self.description {
            check_length(&mut errors, "description", description, DESCRIPTION_MAX);
        }
        if self.completed.is_null() {
            not_null(&mut errors, "completed");
        }
        if self.priority.is_null() {
            not_null(&mut errors, "priority");
        }
        errors.into_result()
    }
}

/// Filters accepted by `GET /todos`. Priority stays a raw integer here so an
/// out-of-range value can be reported as a bad parameter.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TodoListQuery {
    pub completed: Option<bool>,
    pub priority: Option<i64>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TodoSearchQuery {
    pub q: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityBreakdown {
    pub high: i64,
    pub medium: i64,
    pub low: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TodoStats {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
    pub completion_rate: String,
    pub by_priority: PriorityBreakdown,
}

impl TodoStats {
    pub fn from_counts(total: i64, completed: i64, by_priority: PriorityBreakdown) -> Self {
        let completion_rate = if total > 0 {
            format!("{:.1}%", completed as f64 / total as f64 * 100.0)
        } else {
            "0%".to_string()
        };
        Self {
            total,
            completed,
            pending: total - completed,
            completion_rate,
            by_priority,
        }
    }
}
