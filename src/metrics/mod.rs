pub mod types;
pub mod window;

pub use types::*;
pub use window::TrailingWindow;

use chrono::{DateTime, Utc};

use crate::date_util::whole_days_between;
use crate::model::{TagRecord, TaskRecord};

/// Length of the trailing window behind the weekly completion rate.
const WEEKLY_WINDOW_DAYS: u32 = 7;

/// Count tasks per status. The counts always sum to `tasks.len()`.
pub fn compute_status_summary(tasks: &[TaskRecord]) -> StatusSummary {
    let mut summary = StatusSummary::default();
    for task in tasks {
        summary.increment(task.status);
    }
    summary
}

/// Bucket completed tasks by completion date. Tasks whose completion time
/// is unknown contribute nothing; the productivity indicators report them.
pub fn compute_daily_completion_series(tasks: &[TaskRecord]) -> DailyCompletionSeries {
    let mut series = DailyCompletionSeries::default();
    for date in tasks.iter().filter_map(TaskRecord::completion_date) {
        series.record(date);
    }
    series
}

/// Rank the canonical tag list by how many tasks reference each name.
/// Descending by count, ties in canonical-list order. `include_unused`
/// keeps tags no task references (the dashboard hides them by default).
pub fn compute_tag_usage_ranking(
    tasks: &[TaskRecord],
    tags: &[TagRecord],
    include_unused: bool,
) -> TagUsageRanking {
    let mut entries: Vec<TagUsage> = tags
        .iter()
        .map(|tag| TagUsage {
            name: tag.name.clone(),
            count: tasks.iter().filter(|t| t.tags.contains(&tag.name)).count() as u64,
        })
        .collect();

    if !include_unused {
        entries.retain(|e| e.count > 0);
    }

    // Stable sort keeps canonical order within equal counts
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    TagUsageRanking::new(entries)
}

/// Derive productivity indicators relative to the injected reporting
/// instant. Nothing here reads the ambient clock.
pub fn compute_productivity_indicators(
    tasks: &[TaskRecord],
    now: DateTime<Utc>,
) -> ProductivityIndicators {
    let today = now.date_naive();
    let week = TrailingWindow::days_ending(WEEKLY_WINDOW_DAYS, today);
    let completed_in_week = compute_daily_completion_series(tasks).completed_in(&week);

    let mut completion_days_sum: i64 = 0;
    let mut completion_days_count: i64 = 0;
    let mut completed_without_timestamp: u64 = 0;
    let mut created_today: u64 = 0;
    let mut created_in_week: u64 = 0;

    for task in tasks {
        if let Some(completed_at) = task.completion_timestamp() {
            completion_days_sum += whole_days_between(task.created_at, completed_at);
            completion_days_count += 1;
        } else if task.completion_time_unknown() {
            completed_without_timestamp += 1;
        }

        let created_date = task.created_at.date_naive();
        if created_date == today {
            created_today += 1;
        }
        if week.contains(created_date) {
            created_in_week += 1;
        }
    }

    let average_completion_days = if completion_days_count > 0 {
        Some(completion_days_sum / completion_days_count)
    } else {
        None
    };

    let weekly_completion_rate = if created_in_week > 0 {
        (completed_in_week as f64 / created_in_week as f64 * 100.0).round() as u32
    } else {
        0
    };

    ProductivityIndicators {
        average_completion_days,
        created_today,
        weekly_completion_rate,
        completed_without_timestamp,
    }
}

/// Compute every dashboard metric family from one input snapshot.
pub fn compute_dashboard(
    tasks: &[TaskRecord],
    tags: &[TagRecord],
    now: DateTime<Utc>,
    include_unused: bool,
) -> Dashboard {
    let status = compute_status_summary(tasks);
    Dashboard {
        completion_rate: status.completion_rate(),
        status,
        daily_completions: compute_daily_completion_series(tasks),
        top_tags: compute_tag_usage_ranking(tasks, tags, include_unused),
        productivity: compute_productivity_indicators(tasks, now),
    }
}
