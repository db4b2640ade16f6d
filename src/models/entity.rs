//! Entity traits shared by the four admin collections.
//!
//! Records cross tier boundaries as JSON; these traits are what the facade
//! uses to turn them back into typed records and to validate input before
//! any tier sees it.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The collections managed by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Customer,
    Trader,
    File,
    Product,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Customer,
        EntityKind::Trader,
        EntityKind::File,
        EntityKind::Product,
    ];

    /// REST path segment and local storage key
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Customer => "customers",
            EntityKind::Trader => "traders",
            EntityKind::File => "files",
            EntityKind::Product => "products",
        }
    }

    /// Name of the identifier field on the wire
    pub fn id_field(self) -> &'static str {
        match self {
            EntityKind::Customer => "_id",
            _ => "id",
        }
    }

    /// Name of the creation timestamp/date field on the wire
    pub fn created_field(self) -> &'static str {
        match self {
            EntityKind::Customer => "createdAt",
            EntityKind::Trader => "joinedDate",
            EntityKind::File | EntityKind::Product => "createdDate",
        }
    }

    /// Fields a merge must never overwrite
    pub fn immutable_fields(self) -> [&'static str; 2] {
        [self.id_field(), self.created_field()]
    }

    /// Whether the creation field holds a full timestamp (vs a calendar date)
    pub fn created_is_timestamp(self) -> bool {
        matches!(self, EntityKind::Customer)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Customer => "Customer",
            EntityKind::Trader => "Trader",
            EntityKind::File => "File",
            EntityKind::Product => "Product",
        };
        f.write_str(label)
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.collection() == s)
            .ok_or_else(|| format!("unknown collection '{}'", s))
    }
}

/// A typed record stored in one of the collections
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Create input; required vs optional fields are spelled out per entity
    type Draft: Send + Sync;

    /// Partial update; `None` fields are skipped on serialization so the
    /// merge in every tier stays shallow
    type Patch: Serialize + Default + Send + Sync;

    fn id(&self) -> &str;

    fn validate_draft(draft: &Self::Draft) -> Result<(), String>;

    fn validate_patch(patch: &Self::Patch) -> Result<(), String>;

    /// Build the record a create stores: assigned id, creation time and
    /// initial status
    fn from_draft(draft: Self::Draft, id: String, now: DateTime<Utc>) -> Self;
}

/// Entities carrying a status enumeration
pub trait HasStatus: Entity {
    type Status: FromStr<Err = String>
        + Serialize
        + fmt::Display
        + Copy
        + PartialEq
        + Send
        + Sync;

    fn status(&self) -> Self::Status;
}

pub(crate) fn unknown_variant(field: &str, value: &str, allowed: &[&str]) -> String {
    format!(
        "unknown {} '{}', expected one of: {}",
        field,
        value,
        allowed.join(", ")
    )
}
