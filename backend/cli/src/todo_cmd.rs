//! `simpledo todo …`: manage the persisted task list.

use anyhow::{bail, Result};
use clap::Subcommand;
use simpledo_core::{format_due, parse_date, parse_time, Priority, Task, TaskDraft, TaskView};

use crate::app::{today, AppContext};
use crate::terminal_output::{dim, heading, note_info, note_success, note_warn, render_table, single_line, Column};

#[derive(Subcommand)]
pub enum TodoCommands {
    /// List tasks
    List {
        /// all, important, completed or incomplete
        #[arg(short, long, default_value = "all")]
        view: String,
    },
    /// Add a task
    Add {
        #[arg(short, long)]
        title: String,
        /// Due date, YYYY-MM-DD
        #[arg(short, long)]
        date: Option<String>,
        /// Due time, HH:MM
        #[arg(long)]
        time: Option<String>,
        /// none, high or low
        #[arg(short, long, default_value = "none")]
        priority: String,
    },
    /// Change fields of an existing task
    Update {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Flip a task between completed and not completed
    Toggle { id: String },
    /// Delete a task
    Remove { id: String },
}

pub fn run(ctx: &AppContext, cmd: TodoCommands) -> Result<()> {
    let store = ctx.open_store()?;
    let today = today();

    match cmd {
        TodoCommands::List { view } => {
            let view: TaskView = view.parse()?;
            let tasks = store.view(view);
            println!("{}", heading(view.title()));
            if tasks.is_empty() {
                note_info("No tasks to show.");
            } else {
                print!("{}", task_table(&tasks, today));
            }
        }
        TodoCommands::Add { title, date, time, priority } => {
            let draft = TaskDraft {
                title: title.trim().to_string(),
                priority: priority.parse()?,
                date: date.as_deref().map(parse_date).transpose()?,
                time: time.as_deref().map(parse_time).transpose()?,
            };
            let task = store.create(draft, today, ctx.max_due_days())?;
            note_success(&format!("Added \"{}\" ({})", task.title, task.id));
        }
        TodoCommands::Update { id, title, date, time, priority, completed } => {
            let Some(mut task) = store.find(&id)? else {
                bail!("No task with id '{id}'");
            };
            if let Some(title) = title {
                if title.trim().is_empty() {
                    bail!("Title cannot be empty");
                }
                task.title = title.trim().to_string();
            }
            if let Some(date) = date {
                task.date = parse_date(&date)?;
            }
            if let Some(time) = time {
                task.time = parse_time(&time)?;
            }
            if let Some(priority) = priority {
                task.priority = priority.parse()?;
            }
            if let Some(completed) = completed {
                task.completed = completed;
            }
            if store.update(task)? {
                note_success(&format!("Updated {id}"));
            } else {
                note_warn(&format!("Task {id} disappeared before it could be updated"));
            }
        }
        TodoCommands::Toggle { id } => match store.toggle(&id)? {
            Some(task) if task.completed => note_success(&format!("Completed \"{}\"", task.title)),
            Some(task) => note_success(&format!("Reopened \"{}\"", task.title)),
            None => bail!("No task with id '{id}'"),
        },
        TodoCommands::Remove { id } => {
            if store.remove(&id)? {
                note_success(&format!("Removed {id}"));
            } else {
                note_info(&format!("No task with id '{id}'; nothing removed"));
            }
        }
    }
    Ok(())
}

fn task_table(tasks: &[Task], today: chrono::NaiveDate) -> String {
    let columns = [
        Column::left(""),
        Column::left("Title").max_width(40),
        Column::left("Priority"),
        Column::left("Due"),
        Column::left("ID"),
    ];
    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|t| {
            vec![
                if t.completed { "[x]" } else { "[ ]" }.to_string(),
                single_line(&t.title),
                match t.priority {
                    Priority::None => String::new(),
                    p => p.to_string(),
                },
                format_due(t.date, t.time, today),
                dim(&t.id),
            ]
        })
        .collect();
    render_table(&columns, &rows)
}
