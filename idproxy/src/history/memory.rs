//! In-memory query history.

use super::{NewQueryRecord, QueryHistory, Result};
use crate::api::models::queries::QueryRecord;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local query history kept in insertion order.
///
/// Cloning is cheap and clones share the same records. Nothing is persisted:
/// the history is lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQueryHistory {
    records: Arc<RwLock<Vec<QueryRecord>>>,
}

impl InMemoryQueryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl QueryHistory for InMemoryQueryHistory {
    async fn append(&self, record: NewQueryRecord) -> Result<QueryRecord> {
        let mut records = self.records.write().await;

        // Timestamp is taken under the write lock so it never goes backwards
        // relative to insertion order.
        let now = Utc::now();
        let timestamp = records.last().map_or(now, |last| last.timestamp.max(now));

        let stored = QueryRecord {
            id: Uuid::new_v4(),
            phone_number: record.phone_number,
            service_provider_id: record.service_provider_id,
            request_id: record.request_id,
            consent_granted: record.consent_granted,
            response_code: record.response_code,
            response_message: record.response_message,
            account_status: record.account_status,
            timestamp,
        };
        records.push(stored.clone());

        Ok(stored)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<QueryRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().rev().take(limit).cloned().collect())
    }

    async fn clear(&self) -> Result<u64> {
        let mut records = self.records.write().await;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_record(phone_number: &str, response_code: &str) -> NewQueryRecord {
        NewQueryRecord {
            phone_number: phone_number.to_string(),
            service_provider_id: "8349570948".to_string(),
            request_id: Some(Uuid::new_v4().to_string()),
            consent_granted: true,
            response_code: response_code.to_string(),
            response_message: None,
            account_status: Some("ACTIVE".to_string()),
        }
    }

    #[tokio::test]
    async fn test_recent_on_empty_store() {
        let history = InMemoryQueryHistory::new();
        assert!(history.recent(10).await.unwrap().is_empty());
        assert!(history.is_empty().await);
    }

    #[tokio::test]
    async fn test_append_then_recent_one_returns_it() {
        let history = InMemoryQueryHistory::new();
        history.append(new_record("+12040000001", "0")).await.unwrap();
        let appended = history.append(new_record("+12040000002", "1")).await.unwrap();

        let recent = history.recent(1).await.unwrap();
        assert_eq!(recent, vec![appended]);
    }

    #[tokio::test]
    async fn test_append_assigns_unique_ids() {
        let history = InMemoryQueryHistory::new();
        let first = history.append(new_record("+12040000001", "0")).await.unwrap();
        let second = history.append(new_record("+12040000001", "0")).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(history.len().await, 2);
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_bounded() {
        let history = InMemoryQueryHistory::new();
        for i in 0..15 {
            history.append(new_record(&format!("+1204000{i:04}"), "0")).await.unwrap();
        }

        let recent = history.recent(10).await.unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].phone_number, "+12040000014");
        assert_eq!(recent[9].phone_number, "+12040000005");
        assert!(recent.windows(2).all(|pair| pair[0].timestamp >= pair[1].timestamp));

        assert_eq!(history.recent(100).await.unwrap().len(), 15);
        assert!(history.recent(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let history = InMemoryQueryHistory::new();
        for _ in 0..3 {
            history.append(new_record("+12040000065", "0")).await.unwrap();
        }

        assert_eq!(history.clear().await.unwrap(), 3);
        for limit in [0, 1, 10, usize::MAX] {
            assert!(history.recent(limit).await.unwrap().is_empty());
        }
        assert_eq!(history.clear().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_records() {
        let history = InMemoryQueryHistory::new();
        let other = history.clone();
        history.append(new_record("+12040000065", "0")).await.unwrap();
        assert_eq!(other.recent(10).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends() {
        let history = InMemoryQueryHistory::new();
        let handles: Vec<_> = (0..50)
            .map(|i| {
                let history = history.clone();
                tokio::spawn(async move { history.append(new_record(&format!("+1204{i:07}"), "0")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let recent = history.recent(usize::MAX).await.unwrap();
        assert_eq!(recent.len(), 50);
        assert!(recent.windows(2).all(|pair| pair[0].timestamp >= pair[1].timestamp));
    }
}
