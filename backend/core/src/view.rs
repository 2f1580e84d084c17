use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{Priority, Task};

/// Which slice of the task list to show.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskView {
    #[default]
    All,
    /// High-priority tasks.
    Important,
    Completed,
    Incomplete,
}

impl TaskView {
    pub const ALL: [TaskView; 4] = [
        TaskView::All,
        TaskView::Important,
        TaskView::Completed,
        TaskView::Incomplete,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            TaskView::All => "All Tasks",
            TaskView::Important => "Important",
            TaskView::Completed => "Completed",
            TaskView::Incomplete => "Incomplete",
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskView::All => true,
            TaskView::Important => task.priority == Priority::High,
            TaskView::Completed => task.completed,
            TaskView::Incomplete => !task.completed,
        }
    }

    /// Tasks visible in this view, in collection order.
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t)).collect()
    }
}

impl fmt::Display for TaskView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskView::All => "all",
            TaskView::Important => "important",
            TaskView::Completed => "completed",
            TaskView::Incomplete => "incomplete",
        };
        f.write_str(name)
    }
}

impl FromStr for TaskView {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskView::ALL
            .into_iter()
            .find(|v| v.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownView(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn task(title: &str, priority: Priority, completed: bool) -> Task {
        let mut t = Task::new(
            title,
            priority,
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        );
        t.completed = completed;
        t
    }

    #[test]
    fn each_view_filters_in_order() {
        let tasks = vec![
            task("a", Priority::High, false),
            task("b", Priority::None, true),
            task("c", Priority::High, true),
            task("d", Priority::Low, false),
        ];
        let titles = |v: TaskView| v.apply(&tasks).iter().map(|t| t.title.clone()).collect::<Vec<_>>();
        assert_eq!(titles(TaskView::All), ["a", "b", "c", "d"]);
        assert_eq!(titles(TaskView::Important), ["a", "c"]);
        assert_eq!(titles(TaskView::Completed), ["b", "c"]);
        assert_eq!(titles(TaskView::Incomplete), ["a", "d"]);
    }

    #[test]
    fn unknown_view_is_a_typed_error() {
        assert_eq!("Completed".parse::<TaskView>().unwrap(), TaskView::Completed);
        assert_eq!(
            "starred".parse::<TaskView>(),
            Err(ValidationError::UnknownView("starred".into()))
        );
    }
}
