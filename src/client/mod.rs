use std::collections::BTreeSet;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::date_util::parse_timestamp;
use crate::error::{Error, Result};
use crate::model::{Comment, TagName, TagRecord, TaskRecord, TaskStatus};

const MAX_RETRIES: u32 = 3;
const BACKOFF_MS: &[u64] = &[250, 500, 1000];

/// HTTP client for the task-list API.
///
/// The API serves the full task and tag collections as JSON arrays from
/// `/tarefas` and `/tags`; both fetches are snapshot reads with no paging.
#[derive(Debug, Clone)]
pub struct Client {
    base: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| Error::UrlParse(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::UrlParse(format!(
                "unsupported scheme in base URL: {base_url}"
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Fetch every task record. Fails the whole fetch on the first record
    /// missing a required field rather than silently skipping it.
    pub async fn fetch_all_tasks(&self) -> Result<Vec<TaskRecord>> {
        let raw: Vec<RawTask> = self.get_json("tarefas").await?;
        log::debug!("fetched {} tasks", raw.len());
        raw.into_iter().map(TaskRecord::try_from).collect()
    }

    /// Fetch the canonical tag list.
    pub async fn fetch_all_tags(&self) -> Result<Vec<TagRecord>> {
        let raw: Vec<RawTag> = self.get_json("tags").await?;
        log::debug!("fetched {} tags", raw.len());
        raw.into_iter().map(TagRecord::try_from).collect()
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self
            .base
            .join(path)
            .map_err(|e| Error::UrlParse(e.to_string()))?;

        let mut attempt: u32 = 0;
        loop {
            let response = self.http.get(url.clone()).send().await?;
            let status = response.status();

            if status.is_success() {
                let body = response.bytes().await?;
                return serde_json::from_slice(&body).map_err(Error::Decode);
            }

            let retryable = status.as_u16() == 429 || status.is_server_error();
            if retryable && attempt < MAX_RETRIES {
                let wait = BACKOFF_MS.get(attempt as usize).copied().unwrap_or(1000);
                log::warn!(
                    "GET {url} returned {status}; retrying in {wait}ms ({}/{MAX_RETRIES})",
                    attempt + 1
                );
                tokio::time::sleep(Duration::from_millis(wait)).await;
                attempt += 1;
                continue;
            }

            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: snippet(&message),
            });
        }
    }
}

/// Trim an error body to something log-friendly.
fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= 200 {
        trimmed.to_string()
    } else {
        let cut = trimmed
            .char_indices()
            .take_while(|(i, _)| *i < 200)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}…", &trimmed[..cut])
    }
}

// ── Wire records ───────────────────────────────────────────────────────

/// Task document as served by the API. Fields the store may omit are
/// optional here; conversion to `TaskRecord` enforces what the
/// aggregation requires.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTask {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub completed_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub comments: Vec<RawComment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawComment {
    pub text: String,
    pub created_at: String,
}

/// Tag document as served by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTag {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: Option<String>,
}

impl TryFrom<RawTask> for TaskRecord {
    type Error = Error;

    fn try_from(raw: RawTask) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidTaskRecord {
            id: raw.id.clone(),
            reason,
        };

        let status = raw
            .status
            .as_deref()
            .ok_or_else(|| invalid("missing status".to_string()))?;
        let status = TaskStatus::parse(status)?;

        let created_at = raw
            .created_at
            .as_deref()
            .ok_or_else(|| invalid("missing created_at".to_string()))?;
        let created_at = parse_timestamp(created_at)
            .map_err(|e| invalid(format!("bad created_at: {e}")))?;

        let completed_at = raw
            .completed_at
            .as_deref()
            .map(|s| parse_timestamp(s).map_err(|e| invalid(format!("bad completed_at: {e}"))))
            .transpose()?;

        let mut tags = BTreeSet::new();
        for name in raw.tags {
            tags.insert(TagName::new(name)?);
        }

        let mut comments = Vec::with_capacity(raw.comments.len());
        for c in raw.comments {
            let created_at = parse_timestamp(&c.created_at)
                .map_err(|e| invalid(format!("bad comment timestamp: {e}")))?;
            comments.push(Comment {
                text: c.text,
                created_at,
            });
        }

        Ok(TaskRecord {
            id: raw.id,
            title: raw.title,
            description: raw.description,
            status,
            created_at,
            completed_at,
            tags,
            comments,
        })
    }
}

impl TryFrom<RawTag> for TagRecord {
    type Error = Error;

    fn try_from(raw: RawTag) -> Result<Self> {
        let name = raw
            .name
            .ok_or_else(|| Error::InvalidTagName(format!("tag {} has no name", raw.id)))?;
        Ok(TagRecord {
            id: raw.id,
            name: TagName::new(name)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_task(json: serde_json::Value) -> RawTask {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        assert!(Client::new("not a url").is_err());
        assert!(Client::new("ftp://example.com").is_err());
        assert!(Client::new("http://127.0.0.1:8000/").is_ok());
    }

    #[test]
    fn test_raw_task_full_conversion() {
        let raw = raw_task(serde_json::json!({
            "_id": "abc123",
            "title": "Ship release",
            "description": "cut the tag",
            "status": "completed",
            "created_at": "2025-01-01T09:00:00Z",
            "completed_at": "2025-01-03T17:00:00Z",
            "tags": ["urgent", "release"],
            "comments": [{"text": "done", "created_at": "2025-01-03T17:05:00"}]
        }));

        let task = TaskRecord::try_from(raw).unwrap();
        assert_eq!(task.id, "abc123");
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.tags.len(), 2);
        assert_eq!(task.comments.len(), 1);
        assert!(task.completed_at.is_some());
    }

    #[test]
    fn test_raw_task_missing_status_fails() {
        let raw = raw_task(serde_json::json!({
            "_id": "abc123",
            "created_at": "2025-01-01T09:00:00Z"
        }));
        match TaskRecord::try_from(raw) {
            Err(Error::InvalidTaskRecord { id, reason }) => {
                assert_eq!(id, "abc123");
                assert!(reason.contains("status"));
            }
            other => panic!("expected InvalidTaskRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_raw_task_missing_created_at_fails() {
        let raw = raw_task(serde_json::json!({
            "_id": "abc123",
            "status": "pending"
        }));
        match TaskRecord::try_from(raw) {
            Err(Error::InvalidTaskRecord { reason, .. }) => {
                assert!(reason.contains("created_at"));
            }
            other => panic!("expected InvalidTaskRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_raw_task_unknown_status_fails() {
        let raw = raw_task(serde_json::json!({
            "_id": "abc123",
            "status": "archived",
            "created_at": "2025-01-01T09:00:00Z"
        }));
        match TaskRecord::try_from(raw) {
            Err(Error::InvalidStatus(s)) => assert_eq!(s, "archived"),
            other => panic!("expected InvalidStatus, got {other:?}"),
        }
    }

    #[test]
    fn test_raw_task_dedupes_tags() {
        let raw = raw_task(serde_json::json!({
            "_id": "abc123",
            "status": "pending",
            "created_at": "2025-01-01T09:00:00Z",
            "tags": ["urgent", "urgent"]
        }));
        let task = TaskRecord::try_from(raw).unwrap();
        assert_eq!(task.tags.len(), 1);
    }

    #[test]
    fn test_raw_task_naive_timestamps_accepted() {
        // Store emits bare ISO datetimes for older documents
        let raw = raw_task(serde_json::json!({
            "_id": "abc123",
            "status": "pending",
            "created_at": "2025-01-01T09:00:00"
        }));
        assert!(TaskRecord::try_from(raw).is_ok());
    }

    #[test]
    fn test_raw_tag_conversion() {
        let raw: RawTag =
            serde_json::from_value(serde_json::json!({"_id": "t1", "name": "urgent"})).unwrap();
        let tag = TagRecord::try_from(raw).unwrap();
        assert_eq!(tag.name.as_str(), "urgent");

        let nameless: RawTag =
            serde_json::from_value(serde_json::json!({"_id": "t2", "name": null})).unwrap();
        assert!(TagRecord::try_from(nameless).is_err());
    }

    #[test]
    fn test_snippet_truncates_long_bodies() {
        assert_eq!(snippet("  short  "), "short");
        let long = "x".repeat(500);
        let s = snippet(&long);
        assert!(s.chars().count() <= 201);
        assert!(s.ends_with('…'));
    }
}
