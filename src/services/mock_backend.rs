//! In-memory backend simulation with a fixed artificial latency.
//!
//! Second tier of the provider chain, and the whole chain when the mock-only
//! flag is set. The reference HTTP backend also serves from one of these.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::error::{TierError, TierResult};
use crate::models::entity::EntityKind;
use crate::services::seed;
use crate::services::tier::{self, Tier};

pub struct MockTier {
    collections: RwLock<HashMap<EntityKind, Vec<Value>>>,
    latency: Duration,
    offline: AtomicBool,
}

impl MockTier {
    /// Mock backend holding the default fixtures
    pub fn new(latency: Duration) -> Self {
        let collections = EntityKind::ALL
            .into_iter()
            .map(|kind| (kind, seed::mock_records(kind)))
            .collect();
        Self::with_collections(collections, latency)
    }

    /// Mock backend with no records at all
    pub fn empty(latency: Duration) -> Self {
        Self::with_collections(HashMap::new(), latency)
    }

    pub fn with_collections(collections: HashMap<EntityKind, Vec<Value>>, latency: Duration) -> Self {
        Self {
            collections: RwLock::new(collections),
            latency,
            offline: AtomicBool::new(false),
        }
    }

    /// While offline every call fails with a transport error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Drop every change and restore the fixtures
    pub fn reset(&self) {
        let mut collections = self.collections.write();
        collections.clear();
        for kind in EntityKind::ALL {
            collections.insert(kind, seed::mock_records(kind));
        }
    }

    async fn simulate_network(&self, op: &str, kind: EntityKind) -> TierResult<()> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(TierError::Transport("mock backend offline".to_string()));
        }
        debug!(op, entity = %kind, "mock backend call");
        Ok(())
    }
}

#[async_trait]
impl Tier for MockTier {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list(&self, kind: EntityKind) -> TierResult<Vec<Value>> {
        self.simulate_network("list", kind).await?;
        Ok(self
            .collections
            .read()
            .get(&kind)
            .cloned()
            .unwrap_or_default())
    }

    async fn get(&self, kind: EntityKind, id: &str) -> TierResult<Value> {
        self.simulate_network("get", kind).await?;
        let collections = self.collections.read();
        let records = collections.get(&kind).map(Vec::as_slice).unwrap_or_default();
        tier::find_record(kind, records, id)
    }

    async fn insert(&self, kind: EntityKind, record: Value) -> TierResult<Value> {
        self.simulate_network("insert", kind).await?;
        let mut collections = self.collections.write();
        tier::insert_record(kind, collections.entry(kind).or_default(), record)
    }

    async fn update(&self, kind: EntityKind, id: &str, patch: Value) -> TierResult<Value> {
        self.simulate_network("update", kind).await?;
        let mut collections = self.collections.write();
        tier::merge_record(kind, collections.entry(kind).or_default(), id, &patch)
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> TierResult<()> {
        self.simulate_network("delete", kind).await?;
        let mut collections = self.collections.write();
        tier::remove_record(kind, collections.entry(kind).or_default(), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::file::FileUpload;
    use serde_json::json;

    #[tokio::test]
    async fn test_serves_fixtures() {
        let mock = MockTier::new(Duration::ZERO);
        let traders = mock.list(EntityKind::Trader).await.unwrap();
        assert_eq!(traders.len(), 5);
        let trader = mock.get(EntityKind::Trader, "TRD002").await.unwrap();
        assert_eq!(trader["name"], "Sarah Johnson");
    }

    #[tokio::test]
    async fn test_offline_is_a_transport_failure() {
        let mock = MockTier::new(Duration::ZERO);
        mock.set_offline(true);
        let result = mock.list(EntityKind::File).await;
        assert!(matches!(result, Err(TierError::Transport(_))));

        mock.set_offline(false);
        assert!(mock.list(EntityKind::File).await.is_ok());
    }

    #[tokio::test]
    async fn test_not_found_is_reported_as_such() {
        let mock = MockTier::new(Duration::ZERO);
        let result = mock.delete(EntityKind::Product, "p99").await;
        assert!(matches!(result, Err(TierError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_increment_views_default_impl() {
        let mock = MockTier::new(Duration::ZERO);
        let file = mock.increment_views("f1").await.unwrap();
        assert_eq!(file["totalViews"], 43);
    }

    #[tokio::test]
    async fn test_increment_views_saturates() {
        let file = json!({ "id": "f9", "totalViews": u64::MAX });
        let mock = MockTier::with_collections(
            HashMap::from([(EntityKind::File, vec![file])]),
            Duration::ZERO,
        );
        let file = mock.increment_views("f9").await.unwrap();
        assert_eq!(file["totalViews"], u64::MAX);
    }

    #[tokio::test]
    async fn test_upload_then_extract() {
        let mock = MockTier::new(Duration::ZERO);
        let upload = FileUpload {
            file_name: "Spring Catalog.xlsx".to_string(),
            content: Vec::new(),
            trader_id: Some("TRD002".to_string()),
        };
        let stored = mock.upload_file(&upload, "f6").await.unwrap();
        assert_eq!(stored["uploadedBy"], "TRD002");
        assert_eq!(stored["security"], "Protected");
        assert_eq!(stored["itemsCount"], 0);
        assert_eq!(mock.list(EntityKind::File).await.unwrap().len(), 6);

        let result = mock.extract_products("f6").await.unwrap();
        assert_eq!(result["message"], "Products extracted successfully");
        let count = result["itemsCount"].as_u64().unwrap();
        assert!((50..150).contains(&count));
        let file = mock.get(EntityKind::File, "f6").await.unwrap();
        assert_eq!(file["itemsCount"].as_u64(), Some(count));

        let missing = mock.extract_products("f404").await;
        assert!(matches!(missing, Err(TierError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_reset_restores_fixtures() {
        let mock = MockTier::new(Duration::ZERO);
        mock.delete(EntityKind::Trader, "TRD001").await.unwrap();
        mock.insert(EntityKind::Trader, json!({ "id": "TRD100" })).await.unwrap();
        mock.reset();
        let ids: Vec<_> = mock
            .list(EntityKind::Trader)
            .await
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["TRD001", "TRD002", "TRD003", "TRD004", "TRD005"]);
    }

    #[tokio::test]
    async fn test_latency_is_applied() {
        let mock = MockTier::empty(Duration::from_millis(30));
        let started = std::time::Instant::now();
        mock.list(EntityKind::Customer).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}
