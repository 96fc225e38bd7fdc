//! Newsletter signups persisted to a JSON file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

pub const EMAIL_LIST_FILE: &str = "email-list.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signup {
    pub email: String,
    pub date: DateTime<Utc>,
}

/// On-disk document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailList {
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub signups: Vec<Signup>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed { email: String, total: usize },
    AlreadySubscribed,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to write email list: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode email list: {0}")]
    Encode(#[from] serde_json::Error),

    /// The file exists but does not parse; it is left untouched
    #[error("Email list at {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        source: serde_json::Error,
    },
}

pub struct NewsletterStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl NewsletterStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(EMAIL_LIST_FILE),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current list for display. A missing or unreadable file reads as empty.
    pub async fn load(&self) -> EmailList {
        match self.read().await {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read email list");
                EmailList::default()
            }
        }
    }

    /// Strict read: only a missing file counts as empty.
    async fn read(&self) -> Result<EmailList, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
                path: self.path.display().to_string(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(EmailList::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a sibling temp file, then rename over the list.
    async fn save(&self, list: &EmailList) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_string_pretty(list)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Add `email` (lowercased) unless it is already on the list.
    pub async fn subscribe(&self, email: &str) -> Result<SubscribeOutcome, StoreError> {
        let _guard = self.lock.lock().await;

        let email = email.trim().to_lowercase();
        let mut list = self.read().await?;

        if list.emails.contains(&email) {
            return Ok(SubscribeOutcome::AlreadySubscribed);
        }

        list.emails.push(email.clone());
        list.signups.push(Signup {
            email: email.clone(),
            date: Utc::now(),
        });
        self.save(&list).await?;

        tracing::info!(total = list.emails.len(), "Newsletter signup stored");

        Ok(SubscribeOutcome::Subscribed {
            email,
            total: list.emails.len(),
        })
    }

    /// Total subscribers and the last `limit` signups.
    pub async fn recent(&self, limit: usize) -> (usize, Vec<Signup>) {
        let _guard = self.lock.lock().await;

        let list = self.load().await;
        let skip = list.signups.len().saturating_sub(limit);
        let recent = list.signups.into_iter().skip(skip).collect();
        (list.emails.len(), recent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("pupito-newsletter-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let store = NewsletterStore::new(temp_dir());

        let list = store.load().await;
        assert!(list.emails.is_empty());
        assert!(list.signups.is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_creates_dir_and_dedupes() {
        let dir = temp_dir();
        let store = NewsletterStore::new(dir.join("nested"));

        let first = store.subscribe("Fan@Example.com").await.expect("Should subscribe");
        assert_eq!(
            first,
            SubscribeOutcome::Subscribed {
                email: "fan@example.com".to_string(),
                total: 1,
            }
        );

        let again = store.subscribe("fan@example.com").await.expect("Should read");
        assert_eq!(again, SubscribeOutcome::AlreadySubscribed);

        let saved = tokio::fs::read_to_string(store.path()).await.expect("file exists");
        assert!(saved.contains("\"emails\""));
        assert!(saved.contains("fan@example.com"));

        tokio::fs::remove_dir_all(dir).await.ok();
    }

    #[tokio::test]
    async fn test_recent_returns_tail() {
        let dir = temp_dir();
        let store = NewsletterStore::new(&dir);

        for i in 0..12 {
            store
                .subscribe(&format!("fan{}@example.com", i))
                .await
                .expect("Should subscribe");
        }

        let (total, recent) = store.recent(10).await;
        assert_eq!(total, 12);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].email, "fan2@example.com");
        assert_eq!(recent[9].email, "fan11@example.com");

        tokio::fs::remove_dir_all(dir).await.ok();
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_empty() {
        let dir = temp_dir();
        tokio::fs::create_dir_all(&dir).await.expect("mkdir");
        let store = NewsletterStore::new(&dir);
        tokio::fs::write(store.path(), "{not json").await.expect("write");

        assert!(store.load().await.emails.is_empty());

        tokio::fs::remove_dir_all(dir).await.ok();
    }

    #[tokio::test]
    async fn test_subscribe_refuses_to_overwrite_corrupt_file() {
        let dir = temp_dir();
        tokio::fs::create_dir_all(&dir).await.expect("mkdir");
        let store = NewsletterStore::new(&dir);
        tokio::fs::write(store.path(), "{not json").await.expect("write");

        let result = store.subscribe("fan@example.com").await;
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));

        let contents = tokio::fs::read_to_string(store.path()).await.expect("read");
        assert_eq!(contents, "{not json");

        tokio::fs::remove_dir_all(dir).await.ok();
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_file() {
        let dir = temp_dir();
        let store = NewsletterStore::new(&dir);

        store.subscribe("fan@example.com").await.expect("Should subscribe");

        assert!(tokio::fs::try_exists(store.path()).await.expect("stat"));
        let tmp = store.path().with_extension("json.tmp");
        assert!(!tokio::fs::try_exists(&tmp).await.expect("stat"));

        tokio::fs::remove_dir_all(dir).await.ok();
    }

    #[tokio::test]
    async fn test_concurrent_subscribes_are_all_kept() {
        let dir = temp_dir();
        let store = std::sync::Arc::new(NewsletterStore::new(&dir));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.subscribe(&format!("fan{i}@example.com")).await })
            })
            .collect();
        for task in tasks {
            task.await.expect("join").expect("Should subscribe");
        }

        let (total, _) = store.recent(10).await;
        assert_eq!(total, 8);

        tokio::fs::remove_dir_all(dir).await.ok();
    }
}
