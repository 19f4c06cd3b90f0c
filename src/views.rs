// Derived, read-only projections of the task collection

use crate::models::{Stats, Status, Task};
use chrono::{Datelike, Months, NaiveDate, TimeZone};
use eyre::{Result, eyre};
use std::collections::BTreeMap;

/// Default number of tasks on the upcoming list
pub const UPCOMING_LIMIT: usize = 3;

/// Default number of tasks on the recent list
pub const RECENT_LIMIT: usize = 5;

/// Default number of task titles previewed in a calendar cell
pub const CALENDAR_PREVIEW: usize = 2;

/// Count tasks by status
pub fn stats(tasks: &[Task]) -> Stats {
    let mut stats = Stats {
        total: tasks.len(),
        ..Stats::default()
    };
    for task in tasks {
        match task.status {
            Status::Done => stats.completed += 1,
            Status::InProgress => stats.in_progress += 1,
            Status::NotStarted => stats.pending += 1,
        }
    }
    stats
}

/// Unfinished tasks, soonest due first
pub fn upcoming(tasks: &[Task], limit: usize) -> Vec<&Task> {
    let mut open: Vec<&Task> = tasks.iter().filter(|t| !t.is_done()).collect();
    open.sort_by_key(|t| t.due_date);
    open.truncate(limit);
    open
}

/// Most recently created tasks first
pub fn recent(tasks: &[Task], limit: usize) -> Vec<&Task> {
    let mut all: Vec<&Task> = tasks.iter().collect();
    all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    all.truncate(limit);
    all
}

/// Group tasks by the calendar day of their due date in `tz`
///
/// Within a day tasks keep store order.
pub fn group_by_day<'a, Tz: TimeZone>(tasks: &'a [Task], tz: &Tz) -> BTreeMap<NaiveDate, Vec<&'a Task>> {
    let mut days: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        let day = task.due_date.with_timezone(tz).date_naive();
        days.entry(day).or_default().push(task);
    }
    days
}

/// One day of a month grid
#[derive(Debug, Clone)]
pub struct DayCell<'a> {
    pub date: NaiveDate,
    pub tasks: Vec<&'a Task>,
}

impl<'a> DayCell<'a> {
    /// First `n` tasks of the day
    pub fn preview(&self, n: usize) -> &[&'a Task] {
        &self.tasks[..self.tasks.len().min(n)]
    }

    /// How many tasks are hidden beyond the first `n`
    pub fn overflow(&self, n: usize) -> usize {
        self.tasks.len().saturating_sub(n)
    }
}

/// A calendar month laid out Sunday-first
#[derive(Debug, Clone)]
pub struct MonthGrid<'a> {
    pub first: NaiveDate,
    /// Empty cells before the 1st (Sunday = 0)
    pub leading_blanks: u32,
    pub days: Vec<DayCell<'a>>,
}

impl MonthGrid<'_> {
    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn days_in_month(&self) -> usize {
        self.days.len()
    }

    pub fn day(&self, day: u32) -> Option<&DayCell<'_>> {
        self.days.get(day.checked_sub(1)? as usize)
    }
}

/// Lay out `year`/`month` with each day's tasks, bucketed in `tz`
pub fn month_grid<'a, Tz: TimeZone>(tasks: &'a [Task], year: i32, month: u32, tz: &Tz) -> Result<MonthGrid<'a>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| eyre!("Invalid month: {}-{:02}", year, month))?;
    let next = first
        .checked_add_months(Months::new(1))
        .ok_or_else(|| eyre!("Month out of range: {}-{:02}", year, month))?;

    let mut buckets = group_by_day(tasks, tz);
    let days = first
        .iter_days()
        .take_while(|d| *d < next)
        .map(|date| DayCell {
            date,
            tasks: buckets.remove(&date).unwrap_or_default(),
        })
        .collect();

    Ok(MonthGrid {
        first,
        leading_blanks: first.weekday().num_days_from_sunday(),
        days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Priority};
    use chrono::{FixedOffset, Utc};

    fn task(id: &str, status: Status, due: &str, created: &str) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {}", id),
            description: String::new(),
            priority: Priority::Medium,
            status,
            category: Category::Work,
            due_date: due.parse().unwrap(),
            created_at: created.parse().unwrap(),
            completed_at: None,
        }
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    fn sample() -> Vec<Task> {
        vec![
            task("a", Status::NotStarted, "2024-06-10T00:00:00Z", "2024-05-01T08:00:00Z"),
            task("b", Status::Done, "2024-06-01T00:00:00Z", "2024-05-03T08:00:00Z"),
            task("c", Status::InProgress, "2024-06-05T00:00:00Z", "2024-05-02T08:00:00Z"),
            task("d", Status::NotStarted, "2024-06-02T00:00:00Z", "2024-05-05T08:00:00Z"),
            task("e", Status::InProgress, "2024-06-20T00:00:00Z", "2024-05-04T08:00:00Z"),
            task("f", Status::NotStarted, "2024-06-05T18:30:00Z", "2024-05-06T08:00:00Z"),
        ]
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(stats(&[]), Stats::default());
    }

    #[test]
    fn test_stats_partition() {
        let s = stats(&sample());
        assert_eq!(s.total, 6);
        assert_eq!(s.completed, 1);
        assert_eq!(s.in_progress, 2);
        assert_eq!(s.pending, 3);
        assert_eq!(s.completed + s.in_progress + s.pending, s.total);
    }

    #[test]
    fn test_upcoming_skips_done_and_sorts_by_due() {
        let tasks = sample();
        assert_eq!(ids(&upcoming(&tasks, UPCOMING_LIMIT)), vec!["d", "c", "f"]);
        assert_eq!(upcoming(&tasks, 10).len(), 5);
    }

    #[test]
    fn test_recent_sorts_by_created_desc() {
        let tasks = sample();
        assert_eq!(ids(&recent(&tasks, RECENT_LIMIT)), vec!["f", "d", "e", "b", "c"]);
    }

    #[test]
    fn test_views_on_empty_collection() {
        assert!(upcoming(&[], UPCOMING_LIMIT).is_empty());
        assert!(recent(&[], RECENT_LIMIT).is_empty());
        assert!(group_by_day(&[], &Utc).is_empty());
    }

    #[test]
    fn test_group_by_day_ignores_time_of_day() {
        let tasks = sample();
        let days = group_by_day(&tasks, &Utc);

        let june5 = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(ids(&days[&june5]), vec!["c", "f"]);
        assert_eq!(days.len(), 5);
    }

    #[test]
    fn test_group_by_day_respects_time_zone() {
        let tasks = sample();
        // 18:30 UTC is already the next day at UTC+7
        let tz = FixedOffset::east_opt(7 * 3600).unwrap();
        let days = group_by_day(&tasks, &tz);

        let june5 = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        let june6 = NaiveDate::from_ymd_opt(2024, 6, 6).unwrap();
        assert_eq!(ids(&days[&june5]), vec!["c"]);
        assert_eq!(ids(&days[&june6]), vec!["f"]);
    }

    #[test]
    fn test_month_grid_layout() {
        let tasks = sample();
        let grid = month_grid(&tasks, 2024, 6, &Utc).unwrap();

        // June 1st 2024 is a Saturday
        assert_eq!(grid.leading_blanks, 6);
        assert_eq!(grid.days_in_month(), 30);
        assert_eq!(grid.year(), 2024);
        assert_eq!(grid.month(), 6);

        let fifth = grid.day(5).unwrap();
        assert_eq!(fifth.tasks.len(), 2);
        assert_eq!(fifth.preview(1).len(), 1);
        assert_eq!(fifth.overflow(1), 1);
        assert_eq!(fifth.overflow(CALENDAR_PREVIEW), 0);

        assert!(grid.day(3).unwrap().tasks.is_empty());
        assert!(grid.day(0).is_none());
        assert!(grid.day(31).is_none());
    }

    #[test]
    fn test_month_grid_leap_february() {
        let grid = month_grid(&[], 2024, 2, &Utc).unwrap();
        assert_eq!(grid.days_in_month(), 29);
        // Feb 1st 2024 is a Thursday
        assert_eq!(grid.leading_blanks, 4);

        let grid = month_grid(&[], 2023, 2, &Utc).unwrap();
        assert_eq!(grid.days_in_month(), 28);
    }

    #[test]
    fn test_month_grid_invalid_month() {
        assert!(month_grid(&[], 2024, 13, &Utc).is_err());
        assert!(month_grid(&[], 2024, 0, &Utc).is_err());
    }
}
