use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{TagName, TaskStatus};

use super::window::TrailingWindow;

/// Task counts per status. Every status is present even when zero, and the
/// counts sum to the number of input tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
}

impl StatusSummary {
    pub fn count(&self, status: TaskStatus) -> u64 {
        match status {
            TaskStatus::Pending => self.pending,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
        }
    }

    pub(crate) fn increment(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Pending => self.pending += 1,
            TaskStatus::InProgress => self.in_progress += 1,
            TaskStatus::Completed => self.completed += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.pending + self.in_progress + self.completed
    }

    /// Completed share as a whole percentage, half rounding up. Zero when
    /// there are no tasks.
    pub fn completion_rate(&self) -> u8 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        (self.completed as f64 / total as f64 * 100.0).round() as u8
    }
}

/// Per-day completion counts. Sparse: days without completions are absent,
/// and the consumer decides whether to fill gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DailyCompletionSeries {
    counts: BTreeMap<NaiveDate, u64>,
}

impl DailyCompletionSeries {
    pub(crate) fn record(&mut self, date: NaiveDate) {
        *self.counts.entry(date).or_insert(0) += 1;
    }

    pub fn count_on(&self, date: NaiveDate) -> u64 {
        self.counts.get(&date).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Days and counts in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, u64)> + '_ {
        self.counts.iter().map(|(date, count)| (*date, *count))
    }

    /// The most recent `n` days with activity, as a trimmed series. This is
    /// a query over the full series, not a property of it: the dashboard
    /// trims to 7 after sorting ascending by date.
    pub fn recent_active_days(&self, n: usize) -> DailyCompletionSeries {
        let counts = self
            .counts
            .iter()
            .rev()
            .take(n)
            .map(|(date, count)| (*date, *count))
            .collect();
        DailyCompletionSeries { counts }
    }

    /// Total completions falling inside the window.
    pub fn completed_in(&self, window: &TrailingWindow) -> u64 {
        if window.is_empty() {
            return 0;
        }
        self.counts
            .range(window.start()..=window.end())
            .map(|(_, count)| *count)
            .sum()
    }
}

/// One tag with the number of tasks referencing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagUsage {
    pub name: TagName,
    pub count: u64,
}

/// Tags ordered by usage, most-used first. Ties keep the canonical tag
/// list order, so the ranking is deterministic for any input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagUsageRanking {
    entries: Vec<TagUsage>,
}

impl TagUsageRanking {
    pub(crate) fn new(entries: Vec<TagUsage>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TagUsage] {
        &self.entries
    }

    /// The `k` most-used tags. Slices the precomputed ranking.
    pub fn top(&self, k: usize) -> &[TagUsage] {
        &self.entries[..k.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagUsage> + '_ {
        self.entries.iter()
    }
}

/// Productivity indicators derived from one input snapshot and an injected
/// reporting instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProductivityIndicators {
    /// Mean completion time in whole days, fractional time truncated.
    /// `None` when no completed task carries a completion timestamp.
    pub average_completion_days: Option<i64>,
    /// Tasks created during the reporting day.
    pub created_today: u64,
    /// Completions over creations in the trailing 7 days, as a whole
    /// percentage. Zero when nothing was created in the window. Can exceed
    /// 100 when old tasks are completed in a quiet week.
    pub weekly_completion_rate: u32,
    /// Completed tasks lacking a completion timestamp, excluded from the
    /// average above.
    pub completed_without_timestamp: u64,
}

/// Everything the dashboard renders, computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub status: StatusSummary,
    /// Completed share of all tasks, whole percent.
    pub completion_rate: u8,
    pub daily_completions: DailyCompletionSeries,
    pub top_tags: TagUsageRanking,
    pub productivity: ProductivityIndicators,
}
