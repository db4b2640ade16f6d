//! Backend tier abstraction and the collection operations shared by the
//! in-memory tiers.
//!
//! Records cross this boundary as JSON objects. Ids are compared with strict
//! string equality.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::{TierError, TierResult};
use crate::models::entity::EntityKind;
use crate::models::file::{simulated_item_count, FileUpload, EXTRACTION_MESSAGE};

/// One candidate backend in the provider chain
#[async_trait]
pub trait Tier: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn list(&self, kind: EntityKind) -> TierResult<Vec<Value>>;

    async fn get(&self, kind: EntityKind, id: &str) -> TierResult<Value>;

    /// Store a fully formed record (id and creation time already assigned)
    async fn insert(&self, kind: EntityKind, record: Value) -> TierResult<Value>;

    /// Shallow-merge `patch` onto the stored record
    async fn update(&self, kind: EntityKind, id: &str, patch: Value) -> TierResult<Value>;

    async fn delete(&self, kind: EntityKind, id: &str) -> TierResult<()>;

    async fn set_status(&self, kind: EntityKind, id: &str, status: &str) -> TierResult<Value> {
        self.update(kind, id, json!({ "status": status })).await
    }

    async fn increment_views(&self, id: &str) -> TierResult<Value> {
        let file = self.get(EntityKind::File, id).await?;
        let views = file.get("totalViews").and_then(Value::as_u64).unwrap_or(0);
        self.update(EntityKind::File, id, json!({ "totalViews": views.saturating_add(1) }))
            .await
    }

    /// Store the record for an uploaded file under `id`
    async fn upload_file(&self, upload: &FileUpload, id: &str) -> TierResult<Value> {
        let record = upload.to_record(id, Utc::now().date_naive());
        let record = serde_json::to_value(record).map_err(|e| TierError::Validation(e.to_string()))?;
        self.insert(EntityKind::File, record).await
    }

    /// Run product extraction on a file and record the item count
    async fn extract_products(&self, id: &str) -> TierResult<Value> {
        let items_count = simulated_item_count(id);
        self.update(EntityKind::File, id, json!({ "itemsCount": items_count }))
            .await?;
        Ok(json!({ "message": EXTRACTION_MESSAGE, "itemsCount": items_count }))
    }
}

pub fn not_found(kind: EntityKind, id: &str) -> TierError {
    TierError::NotFound {
        kind,
        id: id.to_string(),
    }
}

pub fn record_id(kind: EntityKind, record: &Value) -> Option<&str> {
    record.get(kind.id_field()).and_then(Value::as_str)
}

fn position(kind: EntityKind, records: &[Value], id: &str) -> Option<usize> {
    records
        .iter()
        .position(|record| record_id(kind, record) == Some(id))
}

pub fn find_record(kind: EntityKind, records: &[Value], id: &str) -> TierResult<Value> {
    position(kind, records, id)
        .map(|idx| records[idx].clone())
        .ok_or_else(|| not_found(kind, id))
}

/// Append a record, rejecting malformed input and duplicate ids
pub fn insert_record(kind: EntityKind, records: &mut Vec<Value>, record: Value) -> TierResult<Value> {
    if !record.is_object() {
        return Err(TierError::Validation(format!(
            "{} record must be a JSON object",
            kind
        )));
    }
    let id = match record_id(kind, &record) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            return Err(TierError::Validation(format!(
                "{} record is missing '{}'",
                kind,
                kind.id_field()
            )))
        }
    };
    if position(kind, records, &id).is_some() {
        return Err(TierError::Validation(format!(
            "{} with id {} already exists",
            kind, id
        )));
    }
    records.push(record.clone());
    Ok(record)
}

/// Shallow merge; immutable fields in the patch are ignored
pub fn merge_record(
    kind: EntityKind,
    records: &mut [Value],
    id: &str,
    patch: &Value,
) -> TierResult<Value> {
    let patch = patch.as_object().ok_or_else(|| {
        TierError::Validation(format!("{} patch must be a JSON object", kind))
    })?;
    let idx = position(kind, records, id).ok_or_else(|| not_found(kind, id))?;
    let immutable = kind.immutable_fields();

    let Some(target) = records[idx].as_object_mut() else {
        return Err(TierError::Transport(format!(
            "stored {} {} is not a JSON object",
            kind, id
        )));
    };
    for (key, value) in patch {
        if immutable.contains(&key.as_str()) {
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
    Ok(records[idx].clone())
}

pub fn remove_record(kind: EntityKind, records: &mut Vec<Value>, id: &str) -> TierResult<()> {
    let idx = position(kind, records, id).ok_or_else(|| not_found(kind, id))?;
    records.remove(idx);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn traders() -> Vec<Value> {
        vec![
            json!({ "id": "TRD001", "name": "John Smith", "status": "Active", "joinedDate": "2023-05-15" }),
            json!({ "id": "TRD002", "name": "Sarah Johnson", "status": "Active", "joinedDate": "2023-06-20" }),
        ]
    }

    #[test]
    fn test_find_uses_strict_equality() {
        let records = vec![json!({ "_id": "1", "name": "John Doe" })];
        assert!(find_record(EntityKind::Customer, &records, "1").is_ok());
        // Leading digits alone must not match
        assert!(matches!(
            find_record(EntityKind::Customer, &records, "1abc"),
            Err(TierError::NotFound { .. })
        ));
        assert!(find_record(EntityKind::Customer, &records, "01").is_err());
    }

    #[test]
    fn test_merge_is_shallow_and_keeps_immutable_fields() {
        let mut records = traders();
        let merged = merge_record(
            EntityKind::Trader,
            &mut records,
            "TRD002",
            &json!({ "status": "Inactive", "id": "HIJACK", "joinedDate": "1999-01-01" }),
        )
        .unwrap();
        assert_eq!(merged["status"], "Inactive");
        assert_eq!(merged["id"], "TRD002");
        assert_eq!(merged["joinedDate"], "2023-06-20");
        assert_eq!(merged["name"], "Sarah Johnson");
        assert_eq!(records[1], merged);
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let mut records = traders();
        let before = records[0].clone();
        let merged = merge_record(EntityKind::Trader, &mut records, "TRD001", &json!({})).unwrap();
        assert_eq!(merged, before);
    }

    #[test]
    fn test_insert_rejects_duplicates_and_missing_ids() {
        let mut records = traders();
        let dup = insert_record(EntityKind::Trader, &mut records, json!({ "id": "TRD001" }));
        assert!(matches!(dup, Err(TierError::Validation(_))));
        let missing = insert_record(EntityKind::Trader, &mut records, json!({ "name": "x" }));
        assert!(matches!(missing, Err(TierError::Validation(_))));
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_remove_keeps_order_of_the_rest() {
        let mut records = traders();
        records.push(json!({ "id": "TRD003" }));
        remove_record(EntityKind::Trader, &mut records, "TRD002").unwrap();
        let ids: Vec<_> = records
            .iter()
            .filter_map(|r| record_id(EntityKind::Trader, r))
            .collect();
        assert_eq!(ids, vec!["TRD001", "TRD003"]);
        assert!(remove_record(EntityKind::Trader, &mut records, "TRD002").is_err());
    }
}
