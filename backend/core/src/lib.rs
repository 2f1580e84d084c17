pub mod error;
pub mod schedule;
pub mod types;
pub mod view;

pub use error::ValidationError;
pub use schedule::{due_window, format_due, parse_date, parse_time, DEFAULT_MAX_DUE_DAYS};
pub use types::{Priority, Task, TaskDraft};
pub use view::TaskView;
