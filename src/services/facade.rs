//! Single entry point for every (entity, operation) pair.
//!
//! Each call walks the tier chain in order and restarts at the first tier on
//! the next call. A tier's transport failure moves on to the next tier, and so
//! does a read whose reply does not decode into the entity type. Any other
//! failure (not found, validation, unauthorized) ends the call and reaches the
//! caller as-is, including when it comes from a later tier.
//!
//! A write that a tier accepted is never replayed on a later tier. When its
//! reply does not decode, the record is re-read from the tier that took the
//! write; writes without a record to re-read fail as transport.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{ConfigError, DataAccessError, TierError, TierResult};
use crate::models::customer::{Customer, DocumentsPatch};
use crate::models::entity::{Entity, EntityKind, HasStatus};
use crate::models::file::{ExtractionResult, File, FileUpload};
use crate::models::product::Product;
use crate::models::trader::Trader;
use crate::services::local_store::{KeyValueStore, LocalTier};
use crate::services::mock_backend::MockTier;
use crate::services::remote::{RemoteClient, RemoteTier};
use crate::services::tier::{self, Tier};
use crate::services::token_store::TokenStore;
use crate::services::validation;

enum Operation<'a> {
    List,
    Get(&'a str),
    Insert(Value),
    Update(&'a str, Value),
    Delete(&'a str),
    SetStatus(&'a str, &'a str),
    IncrementViews(&'a str),
    UploadFile(&'a FileUpload, &'a str),
    ExtractProducts(&'a str),
}

impl Operation<'_> {
    fn name(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get(_) => "get",
            Operation::Insert(_) => "create",
            Operation::Update(..) => "update",
            Operation::Delete(_) => "delete",
            Operation::SetStatus(..) => "change_status",
            Operation::IncrementViews(_) => "increment_views",
            Operation::UploadFile(..) => "upload",
            Operation::ExtractProducts(_) => "extract_products",
        }
    }

    fn is_write(&self) -> bool {
        !matches!(self, Operation::List | Operation::Get(_))
    }

    /// Record that reflects the write once a tier has accepted it
    fn written_id(&self, kind: EntityKind) -> Option<&str> {
        match self {
            Operation::Insert(record) => tier::record_id(kind, record),
            Operation::Update(id, _) | Operation::SetStatus(id, _) | Operation::IncrementViews(id) => Some(*id),
            _ => None,
        }
    }
}

enum Reply {
    Records(Vec<Value>),
    Record(Value),
    Done,
}

async fn dispatch(tier: &dyn Tier, kind: EntityKind, op: &Operation<'_>) -> TierResult<Reply> {
    match op {
        Operation::List => tier.list(kind).await.map(Reply::Records),
        Operation::Get(id) => tier.get(kind, id).await.map(Reply::Record),
        Operation::Insert(record) => tier.insert(kind, record.clone()).await.map(Reply::Record),
        Operation::Update(id, patch) => tier.update(kind, id, patch.clone()).await.map(Reply::Record),
        Operation::Delete(id) => tier.delete(kind, id).await.map(|_| Reply::Done),
        Operation::SetStatus(id, status) => tier.set_status(kind, id, status).await.map(Reply::Record),
        Operation::IncrementViews(id) => tier.increment_views(id).await.map(Reply::Record),
        Operation::UploadFile(upload, id) => tier.upload_file(upload, id).await.map(Reply::Record),
        Operation::ExtractProducts(id) => tier.extract_products(id).await.map(Reply::Record),
    }
}

fn decode_records<E: DeserializeOwned>(reply: Reply) -> Result<Vec<E>, String> {
    match reply {
        Reply::Records(records) => {
            serde_json::from_value(Value::Array(records)).map_err(|e| e.to_string())
        }
        _ => Err("expected a list of records".to_string()),
    }
}

fn decode_record<E: DeserializeOwned>(reply: Reply) -> Result<E, String> {
    match reply {
        Reply::Record(record) => serde_json::from_value(record).map_err(|e| e.to_string()),
        _ => Err("expected a single record".to_string()),
    }
}

fn decode_done(_reply: Reply) -> Result<(), String> {
    Ok(())
}

/// Never falls through: the write already happened on `tier`
async fn reread<T>(
    tier: &dyn Tier,
    kind: EntityKind,
    op: &Operation<'_>,
    decode: fn(Reply) -> Result<T, String>,
    reason: String,
) -> Result<T, DataAccessError> {
    let unusable = |reason: String| {
        DataAccessError::Transport(format!("{}: {} accepted, reply unusable: {}", tier.name(), op.name(), reason))
    };
    let Some(id) = op.written_id(kind) else {
        return Err(unusable(reason));
    };
    let record = tier.get(kind, id).await?;
    decode(Reply::Record(record)).map_err(unusable)
}

fn validate_id(id: &str) -> Result<(), DataAccessError> {
    if id.trim().is_empty() {
        return Err(DataAccessError::Validation("id is required".to_string()));
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, DataAccessError> {
    serde_json::to_value(value).map_err(|e| DataAccessError::Validation(e.to_string()))
}

pub struct DataAccessFacade {
    tiers: Vec<Arc<dyn Tier>>,
}

impl DataAccessFacade {
    /// Facade over an explicit chain, tried in the given order
    pub fn new(tiers: Vec<Arc<dyn Tier>>) -> Self {
        Self { tiers }
    }

    /// Standard chain: remote, mock, local. Mock only when `use_mock_api`.
    pub fn from_config(
        config: &Config,
        tokens: Arc<TokenStore>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ConfigError> {
        let mock: Arc<dyn Tier> = Arc::new(MockTier::new(config.mock_latency));
        if config.use_mock_api {
            info!("Mock API mode: remote and local tiers disabled");
            return Ok(Self::new(vec![mock]));
        }

        let remote = RemoteTier::new(RemoteClient::new(
            &config.api_base_url,
            config.request_timeout,
            tokens,
        )?);
        let local = LocalTier::new(store);
        info!(base_url = %config.api_base_url, "Data access chain: remote -> mock -> local");

        Ok(Self::new(vec![Arc::new(remote), mock, Arc::new(local)]))
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|tier| tier.name()).collect()
    }

    pub fn customers(&self) -> EntityApi<'_, Customer> {
        EntityApi::new(self)
    }

    pub fn traders(&self) -> EntityApi<'_, Trader> {
        EntityApi::new(self)
    }

    pub fn files(&self) -> EntityApi<'_, File> {
        EntityApi::new(self)
    }

    pub fn products(&self) -> EntityApi<'_, Product> {
        EntityApi::new(self)
    }

    async fn resolve<T>(
        &self,
        kind: EntityKind,
        op: Operation<'_>,
        decode: fn(Reply) -> Result<T, String>,
    ) -> Result<T, DataAccessError> {
        let mut last_failure: Option<String> = None;

        for tier in &self.tiers {
            match dispatch(tier.as_ref(), kind, &op).await {
                Ok(reply) => match decode(reply) {
                    Ok(value) => {
                        debug!(entity = %kind, op = op.name(), tier = tier.name(), "Served");
                        return Ok(value);
                    }
                    Err(reason) if op.is_write() => {
                        warn!(
                            entity = %kind,
                            op = op.name(),
                            tier = tier.name(),
                            error = %reason,
                            "Write accepted but reply unusable, re-reading from the same tier"
                        );
                        return reread(tier.as_ref(), kind, &op, decode, reason).await;
                    }
                    Err(reason) => {
                        warn!(
                            entity = %kind,
                            op = op.name(),
                            tier = tier.name(),
                            error = %reason,
                            "Unusable response, falling back to next tier"
                        );
                        last_failure = Some(format!("{}: {}", tier.name(), reason));
                    }
                },
                Err(TierError::Transport(reason)) => {
                    warn!(
                        entity = %kind,
                        op = op.name(),
                        tier = tier.name(),
                        error = %reason,
                        "Tier unavailable, falling back to next tier"
                    );
                    last_failure = Some(format!("{}: {}", tier.name(), reason));
                }
                Err(terminal) => {
                    debug!(
                        entity = %kind,
                        op = op.name(),
                        tier = tier.name(),
                        error = %terminal,
                        "Terminal failure"
                    );
                    return Err(terminal.into());
                }
            }
        }

        Err(DataAccessError::Transport(
            last_failure.unwrap_or_else(|| "no backend tiers configured".to_string()),
        ))
    }

    pub async fn list<E: Entity>(&self) -> Result<Vec<E>, DataAccessError> {
        self.resolve(E::KIND, Operation::List, decode_records::<E>)
            .await
    }

    pub async fn get<E: Entity>(&self, id: &str) -> Result<E, DataAccessError> {
        validate_id(id)?;
        self.resolve(E::KIND, Operation::Get(id), decode_record::<E>)
            .await
    }

    /// Validate, assign a fresh UUID and the creation time, then store
    pub async fn create<E: Entity>(&self, draft: E::Draft) -> Result<E, DataAccessError> {
        E::validate_draft(&draft).map_err(DataAccessError::Validation)?;
        let record = E::from_draft(draft, Uuid::new_v4().to_string(), Utc::now());
        let value = to_json(&record)?;
        self.resolve(E::KIND, Operation::Insert(value), decode_record::<E>)
            .await
    }

    pub async fn update<E: Entity>(&self, id: &str, patch: E::Patch) -> Result<E, DataAccessError> {
        validate_id(id)?;
        E::validate_patch(&patch).map_err(DataAccessError::Validation)?;
        let value = to_json(&patch)?;
        self.resolve(E::KIND, Operation::Update(id, value), decode_record::<E>)
            .await
    }

    pub async fn delete<E: Entity>(&self, id: &str) -> Result<(), DataAccessError> {
        validate_id(id)?;
        self.resolve(E::KIND, Operation::Delete(id), decode_done)
            .await
    }

    /// `status` must name a member of the entity's status enumeration;
    /// otherwise no tier is called
    pub async fn change_status<E: HasStatus>(&self, id: &str, status: &str) -> Result<E, DataAccessError> {
        validate_id(id)?;
        let parsed: E::Status = status.parse().map_err(DataAccessError::Validation)?;
        let canonical = parsed.to_string();
        self.resolve(E::KIND, Operation::SetStatus(id, &canonical), decode_record::<E>)
            .await
    }

    pub async fn increment_file_views(&self, id: &str) -> Result<File, DataAccessError> {
        validate_id(id)?;
        self.resolve(EntityKind::File, Operation::IncrementViews(id), decode_record::<File>)
            .await
    }

    /// Store an uploaded file's metadata; the content itself stays with the backend
    pub async fn upload_file(&self, upload: FileUpload) -> Result<File, DataAccessError> {
        upload.validate().map_err(DataAccessError::Validation)?;
        let id = Uuid::new_v4().to_string();
        self.resolve(EntityKind::File, Operation::UploadFile(&upload, &id), decode_record::<File>)
            .await
    }

    pub async fn extract_products(&self, id: &str) -> Result<ExtractionResult, DataAccessError> {
        validate_id(id)?;
        self.resolve(
            EntityKind::File,
            Operation::ExtractProducts(id),
            decode_record::<ExtractionResult>,
        )
        .await
    }

    pub async fn add_customer_document(&self, id: &str, reference: &str) -> Result<Customer, DataAccessError> {
        validation::required("document", reference).map_err(DataAccessError::Validation)?;
        let customer: Customer = self.get(id).await?;
        let mut documents = customer.documents;
        documents.push(reference.to_string());
        self.store_documents(id, &documents).await
    }

    /// Removes the first matching reference; the remaining order is kept
    pub async fn remove_customer_document(&self, id: &str, reference: &str) -> Result<Customer, DataAccessError> {
        let customer: Customer = self.get(id).await?;
        let mut documents = customer.documents;
        let Some(idx) = documents.iter().position(|doc| doc == reference) else {
            return Err(DataAccessError::Validation(format!(
                "document '{}' is not attached to customer {}",
                reference, id
            )));
        };
        documents.remove(idx);
        self.store_documents(id, &documents).await
    }

    async fn store_documents(&self, id: &str, documents: &[String]) -> Result<Customer, DataAccessError> {
        let patch = to_json(&DocumentsPatch { documents })?;
        self.resolve(EntityKind::Customer, Operation::Update(id, patch), decode_record::<Customer>)
            .await
    }
}

/// Per-entity view of the facade: `facade.traders().delete("TRD002")`
pub struct EntityApi<'a, E> {
    facade: &'a DataAccessFacade,
    _entity: PhantomData<E>,
}

impl<'a, E: Entity> EntityApi<'a, E> {
    fn new(facade: &'a DataAccessFacade) -> Self {
        Self {
            facade,
            _entity: PhantomData,
        }
    }

    pub async fn list(&self) -> Result<Vec<E>, DataAccessError> {
        self.facade.list::<E>().await
    }

    pub async fn get(&self, id: &str) -> Result<E, DataAccessError> {
        self.facade.get::<E>(id).await
    }

    pub async fn create(&self, draft: E::Draft) -> Result<E, DataAccessError> {
        self.facade.create::<E>(draft).await
    }

    pub async fn update(&self, id: &str, patch: E::Patch) -> Result<E, DataAccessError> {
        self.facade.update::<E>(id, patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), DataAccessError> {
        self.facade.delete::<E>(id).await
    }
}

impl<E: HasStatus> EntityApi<'_, E> {
    pub async fn change_status(&self, id: &str, status: &str) -> Result<E, DataAccessError> {
        self.facade.change_status::<E>(id, status).await
    }
}

impl EntityApi<'_, File> {
    pub async fn increment_views(&self, id: &str) -> Result<File, DataAccessError> {
        self.facade.increment_file_views(id).await
    }

    pub async fn upload(&self, upload: FileUpload) -> Result<File, DataAccessError> {
        self.facade.upload_file(upload).await
    }

    pub async fn extract_products(&self, id: &str) -> Result<ExtractionResult, DataAccessError> {
        self.facade.extract_products(id).await
    }
}

impl EntityApi<'_, Customer> {
    pub async fn add_document(&self, id: &str, reference: &str) -> Result<Customer, DataAccessError> {
        self.facade.add_customer_document(id, reference).await
    }

    pub async fn remove_document(&self, id: &str, reference: &str) -> Result<Customer, DataAccessError> {
        self.facade.remove_customer_document(id, reference).await
    }
}
