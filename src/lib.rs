pub mod client;
pub mod date_util;
pub mod error;
pub mod metrics;
pub mod model;

pub use client::Client;
pub use error::{Error, Result};
pub use metrics::{
    Dashboard, DailyCompletionSeries, ProductivityIndicators, StatusSummary, TagUsage,
    TagUsageRanking, TrailingWindow,
};
pub use model::{Comment, TagName, TagRecord, TaskRecord, TaskStatus};

use chrono::{DateTime, Utc};

/// Main entry point: fetches collections from the task-list API and runs
/// the aggregation over the snapshot. Holds no state between calls; every
/// method refetches and recomputes wholesale.
pub struct TaskDash {
    client: Client,
}

impl TaskDash {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Access the underlying client (for direct fetches in the CLI).
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetch tasks and tags concurrently and compute the full dashboard.
    pub async fn dashboard(&self, now: DateTime<Utc>, include_unused: bool) -> Result<Dashboard> {
        let (tasks, tags) = tokio::join!(
            self.client.fetch_all_tasks(),
            self.client.fetch_all_tags()
        );
        Ok(metrics::compute_dashboard(&tasks?, &tags?, now, include_unused))
    }

    pub async fn status_summary(&self) -> Result<StatusSummary> {
        let tasks = self.client.fetch_all_tasks().await?;
        Ok(metrics::compute_status_summary(&tasks))
    }

    pub async fn daily_completions(&self) -> Result<DailyCompletionSeries> {
        let tasks = self.client.fetch_all_tasks().await?;
        Ok(metrics::compute_daily_completion_series(&tasks))
    }

    pub async fn tag_ranking(&self, include_unused: bool) -> Result<TagUsageRanking> {
        let (tasks, tags) = tokio::join!(
            self.client.fetch_all_tasks(),
            self.client.fetch_all_tags()
        );
        Ok(metrics::compute_tag_usage_ranking(&tasks?, &tags?, include_unused))
    }

    pub async fn productivity(&self, now: DateTime<Utc>) -> Result<ProductivityIndicators> {
        let tasks = self.client.fetch_all_tasks().await?;
        Ok(metrics::compute_productivity_indicators(&tasks, now))
    }
}
