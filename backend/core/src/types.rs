use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::schedule::due_window;

/// Urgency marker on a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    None,
    High,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::None => write!(f, "none"),
            Priority::High => write!(f, "high"),
            Priority::Low => write!(f, "low"),
        }
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Priority::None),
            "high" => Ok(Priority::High),
            "low" => Ok(Priority::Low),
            other => Err(ValidationError::UnknownPriority(other.to_string())),
        }
    }
}

/// A single to-do record as persisted in the task collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(title: impl Into<String>, priority: Priority, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            priority,
            date,
            time,
            completed: false,
        }
    }
}

/// Fields as submitted by the user, before validation.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub priority: Priority,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

impl TaskDraft {
    /// Check required fields and the due-date window.
    ///
    /// Title, date and time must all be present; the title is trimmed before
    /// the emptiness check. The date must fall within `max_due_days` of `today`.
    pub fn validate(&self, today: NaiveDate, max_due_days: u32) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if self.time.is_none() {
            missing.push("time");
        }
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        if let Some(date) = self.date {
            let (earliest, latest) = due_window(today, max_due_days);
            if date < earliest || date > latest {
                return Err(ValidationError::DueDateOutOfRange { date, earliest, latest });
            }
        }
        Ok(())
    }

    /// Validate and build a fresh, incomplete task with a new id.
    pub fn into_task(self, today: NaiveDate, max_due_days: u32) -> Result<Task, ValidationError> {
        self.validate(today, max_due_days)?;
        match (self.date, self.time) {
            (Some(date), Some(time)) => Ok(Task::new(self.title, self.priority, date, time)),
            _ => Err(ValidationError::MissingFields(vec!["date", "time"])),
        }
    }
}

/// `HH:MM` wire format for the time-of-day field.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn task_serializes_time_as_hh_mm() {
        let task = Task::new("Buy milk", Priority::High, day(2026, 10, 20), at(9, 5));
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["time"], "09:05");
        assert_eq!(json["date"], "2026-10-20");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn task_without_completed_field_defaults_to_false() {
        let raw = r#"{"id":"a","title":"t","priority":"none","date":"2026-10-20","time":"14:30"}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert!(!task.completed);
        assert_eq!(task.time, at(14, 30));
    }

    #[test]
    fn draft_reports_every_missing_field() {
        let draft = TaskDraft { title: "   ".into(), ..Default::default() };
        let err = draft.validate(day(2026, 10, 16), 30).unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["title", "date", "time"]));
        assert!(err.to_string().starts_with("Please fill in all required fields."));
    }

    #[test]
    fn draft_rejects_dates_outside_window() {
        let today = day(2026, 10, 16);
        let past = TaskDraft {
            title: "late".into(),
            date: Some(day(2026, 10, 15)),
            time: Some(at(10, 0)),
            ..Default::default()
        };
        assert!(matches!(past.validate(today, 30), Err(ValidationError::DueDateOutOfRange { .. })));

        let far = TaskDraft { date: Some(day(2026, 11, 16)), ..past.clone() };
        assert!(far.validate(today, 30).is_err());

        let edge = TaskDraft { date: Some(day(2026, 11, 15)), ..past };
        assert!(edge.validate(today, 30).is_ok());
    }

    #[test]
    fn draft_becomes_incomplete_task() {
        let draft = TaskDraft {
            title: "Write report".into(),
            priority: Priority::Low,
            date: Some(day(2026, 10, 16)),
            time: Some(at(17, 0)),
        };
        let task = draft.into_task(day(2026, 10, 16), 30).unwrap();
        assert_eq!(task.title, "Write report");
        assert_eq!(task.priority, Priority::Low);
        assert!(!task.completed);
        assert!(!task.id.is_empty());
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("".parse::<Priority>().unwrap(), Priority::None);
        assert!("urgent".parse::<Priority>().is_err());
    }
}
