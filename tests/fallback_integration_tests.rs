mod common;

use std::collections::HashSet;
use std::sync::Arc;

use admin_data_access::models::{
    CustomerDraft, CustomerPatch, CustomerStatus, EntityKind, FilePatch, FileStatus, ProductPatch,
    TraderPatch,
};
use admin_data_access::services::local_store::{FileStore, KeyValueStore, LocalTier};
use admin_data_access::services::tier::Tier;
use admin_data_access::ErrorKind;

use crate::common::{chain, chain_with_store, UNREACHABLE_API};

fn ada() -> CustomerDraft {
    CustomerDraft {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        company_name: "Analytical Engines Ltd".to_string(),
        phone_no: "+44 20 7946 0000".to_string(),
        gender: "female".to_string(),
        country: "uk".to_string(),
        state: "London".to_string(),
        address: "12 St James's Square, London".to_string(),
        ..Default::default()
    }
}

/// Create a customer through the chain and read it back from the serving tier
#[tokio::test]
async fn test_create_customer_ada_lovelace() {
    let chain = chain(UNREACHABLE_API);
    let customers = chain.facade.customers();

    let created = customers.create(ada()).await.unwrap();
    assert_eq!(created.name, "Ada Lovelace");
    assert_eq!(created.status, CustomerStatus::Active);
    assert!(uuid::Uuid::parse_str(&created.id).is_ok());
    let skew = chrono::Utc::now() - created.created_at;
    assert!(skew.num_seconds().abs() < 5);

    let fetched = customers.get(&created.id).await.unwrap();
    assert_eq!(fetched, created);

    let listed = customers.list().await.unwrap();
    assert!(listed.iter().any(|c| c.id == created.id));
}

#[tokio::test]
async fn test_created_ids_are_unique_and_never_reused() {
    let chain = chain(UNREACHABLE_API);
    let customers = chain.facade.customers();

    let mut ids = HashSet::new();
    for _ in 0..5 {
        let created = customers.create(ada()).await.unwrap();
        assert!(ids.insert(created.id.clone()));
    }

    let victim = ids.iter().next().cloned().unwrap();
    customers.delete(&victim).await.unwrap();
    let replacement = customers.create(ada()).await.unwrap();
    assert!(!ids.contains(&replacement.id));
}

#[tokio::test]
async fn test_create_rejects_invalid_draft() {
    let chain = chain(UNREACHABLE_API);
    let mut draft = ada();
    draft.email = "ada-at-example".to_string();

    let err = chain.facade.customers().create(draft).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    assert_eq!(chain.facade.customers().list().await.unwrap().len(), 3);
}

/// An empty patch is a no-op for every entity type
#[tokio::test]
async fn test_empty_update_equals_get() {
    let chain = chain(UNREACHABLE_API);
    let facade = &chain.facade;

    let customer_id = "690b1a2b4e7e8d12345abcde1";
    assert_eq!(
        facade.customers().update(customer_id, CustomerPatch::default()).await.unwrap(),
        facade.customers().get(customer_id).await.unwrap()
    );
    assert_eq!(
        facade.traders().update("TRD004", TraderPatch::default()).await.unwrap(),
        facade.traders().get("TRD004").await.unwrap()
    );
    assert_eq!(
        facade.files().update("f3", FilePatch::default()).await.unwrap(),
        facade.files().get("f3").await.unwrap()
    );
    assert_eq!(
        facade.products().update("p2", ProductPatch::default()).await.unwrap(),
        facade.products().get("p2").await.unwrap()
    );
}

#[tokio::test]
async fn test_update_merges_fields() {
    let chain = chain(UNREACHABLE_API);
    let before = chain.facade.traders().get("TRD001").await.unwrap();

    let patch = TraderPatch {
        region: Some("Oregon".to_string()),
        ..Default::default()
    };
    let after = chain.facade.traders().update("TRD001", patch).await.unwrap();

    assert_eq!(after.region, "Oregon");
    assert_eq!(after.name, before.name);
    assert_eq!(after.joined_date, before.joined_date);
}

#[tokio::test]
async fn test_delete_trader_trd002() {
    let chain = chain(UNREACHABLE_API);
    let traders = chain.facade.traders();

    traders.delete("TRD002").await.unwrap();

    let err = traders.get("TRD002").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let remaining = traders.list().await.unwrap();
    assert_eq!(remaining.len(), 4);
    assert!(remaining.iter().all(|t| t.id != "TRD002"));

    let err = traders.delete("TRD002").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_archive_file() {
    let chain = chain(UNREACHABLE_API);
    let files = chain.facade.files();
    let before = files.get("f1").await.unwrap();
    assert_eq!(before.status, FileStatus::Active);

    let archived = files.change_status("f1", "Archived").await.unwrap();
    assert_eq!(archived.status, FileStatus::Archived);

    let after = files.get("f1").await.unwrap();
    assert_eq!(after.status, FileStatus::Archived);
    let mut unchanged = after.clone();
    unchanged.status = before.status;
    assert_eq!(unchanged, before);
}

#[tokio::test]
async fn test_unknown_status_is_rejected_without_mutation() {
    let chain = chain(UNREACHABLE_API);
    let traders = chain.facade.traders();
    let before = traders.get("TRD005").await.unwrap();

    let err = traders.change_status("TRD005", "Suspended").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    assert_eq!(traders.get("TRD005").await.unwrap(), before);
}

/// With the mock offline the local store answers, with the same record shape
#[tokio::test]
async fn test_falls_back_to_local_store() {
    let chain = chain(UNREACHABLE_API);
    let from_mock = chain.facade.traders().get("TRD003").await.unwrap();

    chain.mock.set_offline(true);
    let from_local = chain.facade.traders().get("TRD003").await.unwrap();
    assert_eq!(from_local, from_mock);

    let customers = chain.facade.customers().list().await.unwrap();
    let ids: Vec<_> = customers.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);

    chain.mock.set_offline(false);
    assert_eq!(chain.facade.customers().list().await.unwrap()[0].id, "690b1a2b4e7e8d12345abcde1");
}

#[tokio::test]
async fn test_every_tier_down_is_transport_failure() {
    let dir = std::env::temp_dir().join(format!("admin-data-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    // A file where the store expects a directory makes every local read fail
    let blocker = dir.join("blocked");
    std::fs::write(&blocker, "not a directory").unwrap();

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&blocker));
    let chain = chain_with_store(UNREACHABLE_API, store);
    chain.mock.set_offline(true);

    let err = chain.facade.products().list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportFailure);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_local_store_seeds_customers_once() {
    let dir = std::env::temp_dir().join(format!("admin-data-it-{}", uuid::Uuid::new_v4()));
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&dir));

    let first = LocalTier::new(store.clone());
    assert_eq!(first.list(EntityKind::Customer).await.unwrap().len(), 3);
    first.delete(EntityKind::Customer, "2").await.unwrap();

    // A fresh instance over the same directory keeps the deletion
    let second = LocalTier::new(Arc::new(FileStore::new(&dir)));
    let customers = second.list(EntityKind::Customer).await.unwrap();
    assert_eq!(customers.len(), 2);
    assert!(customers.iter().all(|c| c["_id"] != "2"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_customer_documents_through_chain() {
    let chain = chain(UNREACHABLE_API);
    let id = "690b1a2b4e7e8d12345abcde2";

    let updated = chain
        .facade
        .customers()
        .add_document(id, "uploads/contract.pdf")
        .await
        .unwrap();
    assert_eq!(
        updated.documents,
        vec!["https://via.placeholder.com/150", "uploads/contract.pdf"]
    );

    let updated = chain
        .facade
        .customers()
        .remove_document(id, "https://via.placeholder.com/150")
        .await
        .unwrap();
    assert_eq!(updated.documents, vec!["uploads/contract.pdf"]);
}
