use chrono::NaiveDate;
use thiserror::Error;

/// Input rejected before any work is done. Reported inline, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields. (missing: {})", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("due date {date} is outside the allowed window {earliest}..={latest}")]
    DueDateOutOfRange {
        date: NaiveDate,
        earliest: NaiveDate,
        latest: NaiveDate,
    },

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("unknown priority '{0}', expected none, high or low")]
    UnknownPriority(String),

    #[error("unknown view '{0}', expected all, important, completed or incomplete")]
    UnknownView(String),

    #[error("Please enter a search query.")]
    EmptyQuery,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_message_lists_fields() {
        let err = ValidationError::MissingFields(vec!["date", "time"]);
        assert_eq!(err.to_string(), "Please fill in all required fields. (missing: date, time)");
    }

    #[test]
    fn empty_query_message_is_user_facing() {
        assert_eq!(ValidationError::EmptyQuery.to_string(), "Please enter a search query.");
    }
}
