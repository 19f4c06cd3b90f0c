use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use eyre::{Result, eyre};
use std::path::PathBuf;
use taskhub::display;
use taskhub::transfer;
use taskhub::views;
use taskhub::{
    Category, Config, FileStorage, NewTask, Priority, Selector, Status, TaskFilter, TaskPatch, TaskStore,
};
use tracing::Level;

#[derive(Parser)]
#[command(name = "taskhub")]
#[command(about = "TaskHub CLI - create, organize and track your tasks")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding task data (overrides the config file)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Path to a YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a task
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
        #[arg(short, long, default_value = "work")]
        category: Category,
        #[arg(short, long, default_value = "not-started")]
        status: Status,
        /// Due date, YYYY-MM-DD or RFC 3339 (default: today)
        #[arg(long, value_parser = parse_due)]
        due: Option<DateTime<Utc>>,
    },

    /// Change fields of an existing task
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
        #[arg(short, long)]
        category: Option<Category>,
        #[arg(short, long)]
        status: Option<Status>,
        #[arg(long, value_parser = parse_due)]
        due: Option<DateTime<Utc>>,
    },

    /// Advance a task to its next status
    Toggle { id: String },

    /// Delete a task
    Delete { id: String },

    /// Show one task in full
    Show { id: String },

    /// List tasks, optionally filtered
    List {
        /// Case-insensitive text to find in title or description
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        status: Selector<Status>,
        #[arg(long, default_value = "all")]
        category: Selector<Category>,
        #[arg(long, default_value = "all")]
        priority: Selector<Priority>,
        /// Print matching tasks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print task counts by status
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Counts plus upcoming and recently created tasks
    Dashboard,

    /// Show a month calendar of due dates
    Calendar {
        /// Month to show as YYYY-MM (default: current month)
        #[arg(long, value_parser = parse_month)]
        month: Option<(i32, u32)>,
    },

    /// Write a JSON backup of all tasks
    Export {
        /// Directory to write the backup into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Replace all tasks with those in a JSON backup
    Import { file: PathBuf },

    /// Delete all tasks
    Clear {
        /// Confirm deleting every task
        #[arg(long)]
        yes: bool,
    },
}

fn parse_due(s: &str) -> Result<DateTime<Utc>, String> {
    taskhub::parse_due_date(s).map_err(|e| e.to_string())
}

fn parse_month(s: &str) -> Result<(i32, u32), String> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .map(|d| (d.year(), d.month()))
        .map_err(|_| format!("Invalid month '{}' (expected YYYY-MM)", s))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    // Open store
    let mut store = TaskStore::open(FileStorage::open(&config.data_dir)?)?;

    match cli.command {
        Commands::Add {
            title,
            description,
            priority,
            category,
            status,
            due,
        } => {
            let mut new = NewTask::new(title);
            new.description = description;
            new.priority = priority;
            new.category = category;
            new.status = status;
            if let Some(due) = due {
                new.due_date = due;
            }
            let task = store.add(new)?;
            println!("Added {}", task.id);
        }
        Commands::Edit {
            id,
            title,
            description,
            priority,
            category,
            status,
            due,
        } => {
            let patch = TaskPatch {
                title,
                description,
                priority,
                status,
                category,
                due_date: due,
            };
            if patch.is_empty() {
                return Err(eyre!("Nothing to change: pass at least one field to edit"));
            }
            let task = store.update(&id, patch)?;
            println!("{}", display::task_line(&task));
        }
        Commands::Toggle { id } => {
            let task = store.advance_status(&id)?;
            println!("{}", display::task_line(&task));
        }
        Commands::Delete { id } => {
            let task = store.delete(&id)?;
            println!("Deleted \"{}\"", task.title);
        }
        Commands::Show { id } => {
            let task = store.get(&id).ok_or_else(|| taskhub::TaskError::NotFound(id.clone()))?;
            print!("{}", display::task_detail(task));
        }
        Commands::List {
            search,
            status,
            category,
            priority,
            json,
        } => {
            let filter = TaskFilter {
                search,
                status,
                category,
                priority,
            };
            let tasks = store.filter(&filter);
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                if filter.is_empty() {
                    println!("No tasks yet. Add one with `taskhub add <title>`.");
                } else {
                    println!("No tasks match the filter.");
                }
            } else {
                for task in tasks {
                    println!("{}", display::task_line(task));
                }
            }
        }
        Commands::Stats { json } => {
            let stats = store.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{}", display::stats_block(&stats));
            }
        }
        Commands::Dashboard => {
            println!("{}", display::stats_block(&store.stats()));

            println!("\nUpcoming:");
            let upcoming = store.upcoming(config.upcoming_limit);
            if upcoming.is_empty() {
                println!("  nothing due");
            }
            for task in upcoming {
                println!("  {}", display::task_line(task));
            }

            println!("\nRecent:");
            let recent = store.recent(config.recent_limit);
            if recent.is_empty() {
                println!("  no tasks yet");
            }
            for task in recent {
                println!("  {}", display::task_line(task));
            }
        }
        Commands::Calendar { month } => {
            let (year, month) = month.unwrap_or_else(|| {
                let today = Local::now().date_naive();
                (today.year(), today.month())
            });
            let grid = views::month_grid(store.list(), year, month, &Local)?;
            println!("{}", display::calendar(&grid, config.calendar_preview));
        }
        Commands::Export { out } => {
            let path = transfer::export_to_dir(&store, &out, Utc::now().date_naive())?;
            println!("Exported {} tasks to {}", store.len(), path.display());
        }
        Commands::Import { file } => {
            let count = transfer::import_file(&mut store, &file)?;
            println!("Imported {} tasks", count);
        }
        Commands::Clear { yes } => {
            if !yes {
                return Err(eyre!("Refusing to delete all tasks without --yes"));
            }
            store.clear()?;
            println!("All tasks deleted");
        }
    }

    Ok(())
}
