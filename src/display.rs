// Terminal rendering for the CLI

use crate::models::{Priority, Stats, Status, Task};
use crate::views::MonthGrid;
use colored::{ColoredString, Colorize};
use std::fmt::Write;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn status_label(status: Status) -> ColoredString {
    match status {
        Status::NotStarted => "not-started".normal(),
        Status::InProgress => "in-progress".yellow(),
        Status::Done => "done".green(),
    }
}

pub fn priority_label(priority: Priority) -> ColoredString {
    match priority {
        Priority::Low => "low".green(),
        Priority::Medium => "medium".yellow(),
        Priority::High => "high".red(),
    }
}

/// One line per task, used by list views
pub fn task_line(task: &Task) -> String {
    let title = if task.is_done() {
        task.title.strikethrough()
    } else {
        task.title.bold()
    };
    format!(
        "[{}] {}  ({}, {}, due {})  {}",
        status_label(task.status),
        title,
        priority_label(task.priority),
        task.category,
        task.due_date.format("%Y-%m-%d"),
        task.id.dimmed()
    )
}

/// Every field of a single task
pub fn task_detail(task: &Task) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", task.title.bold());
    if !task.description.is_empty() {
        let _ = writeln!(out, "{}", task.description);
    }
    let _ = writeln!(out, "  id:        {}", task.id);
    let _ = writeln!(out, "  status:    {}", status_label(task.status));
    let _ = writeln!(out, "  priority:  {}", priority_label(task.priority));
    let _ = writeln!(out, "  category:  {}", task.category);
    let _ = writeln!(out, "  due:       {}", task.due_date.format("%Y-%m-%d"));
    let _ = writeln!(out, "  created:   {}", task.created_at.to_rfc3339());
    if let Some(completed) = task.completed_at {
        let _ = writeln!(out, "  completed: {}", completed.to_rfc3339());
    }
    out
}

pub fn stats_block(stats: &Stats) -> String {
    format!(
        "Total: {}  Done: {}  In progress: {}  Not started: {}",
        stats.total.to_string().bold(),
        stats.completed.to_string().green(),
        stats.in_progress.to_string().yellow(),
        stats.pending
    )
}

/// Sunday-first month grid followed by each busy day's task titles
pub fn calendar(grid: &MonthGrid<'_>, preview: usize) -> String {
    let mut out = String::new();
    let name = MONTH_NAMES[grid.month() as usize - 1];
    let _ = writeln!(out, "{} {}", name.bold(), grid.year());
    let _ = writeln!(out, "{}", WEEKDAYS.map(|d| format!("{:>4}", d)).concat());

    let mut column = 0;
    for _ in 0..grid.leading_blanks {
        out.push_str("    ");
        column += 1;
    }
    for (i, cell) in grid.days.iter().enumerate() {
        let marker = if cell.tasks.is_empty() { ' ' } else { '*' };
        let _ = write!(out, "{:>3}{}", i + 1, marker);
        column += 1;
        if column == 7 {
            out.push('\n');
            column = 0;
        }
    }
    if column != 0 {
        out.push('\n');
    }

    for cell in grid.days.iter().filter(|c| !c.tasks.is_empty()) {
        let titles: Vec<String> = cell
            .preview(preview)
            .iter()
            .map(|t| match t.status {
                Status::Done => t.title.green().to_string(),
                Status::InProgress => t.title.yellow().to_string(),
                Status::NotStarted => t.title.clone(),
            })
            .collect();
        let _ = write!(out, "\n{}: {}", cell.date.format("%a %d"), titles.join(", "));
        let more = cell.overflow(preview);
        if more > 0 {
            let _ = write!(out, " {}", format!("+{} more", more).dimmed());
        }
    }
    out
}
