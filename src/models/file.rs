use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::entity::{unknown_variant, Entity, EntityKind, HasStatus};
use crate::services::validation::{self, when_some};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FileStatus {
    #[default]
    Active,
    Archived,
    Draft,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Active => f.write_str("Active"),
            FileStatus::Archived => f.write_str("Archived"),
            FileStatus::Draft => f.write_str("Draft"),
        }
    }
}

impl FromStr for FileStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(FileStatus::Active),
            "Archived" => Ok(FileStatus::Archived),
            "Draft" => Ok(FileStatus::Draft),
            other => Err(unknown_variant("status", other, &["Active", "Archived", "Draft"])),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Security {
    Public,
    #[default]
    Protected,
    Private,
}

impl FromStr for Security {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Public" => Ok(Security::Public),
            "Protected" => Ok(Security::Protected),
            "Private" => Ok(Security::Private),
            other => Err(unknown_variant(
                "security",
                other,
                &["Public", "Protected", "Private"],
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub id: String,
    pub file_name: String,
    pub created_date: NaiveDate,
    pub last_updated_date: NaiveDate,
    pub items_count: u32,
    pub uploaded_by: String,
    pub security: Security,
    pub status: FileStatus,
    pub total_views: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDraft {
    pub file_name: String,
    pub uploaded_by: String,
    #[serde(default)]
    pub security: Security,
    /// Populated by product extraction
    #[serde(default)]
    pub items_count: u32,
    #[serde(default)]
    pub file_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Security>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FileStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_link: Option<String>,
}

impl Entity for File {
    const KIND: EntityKind = EntityKind::File;
    type Draft = FileDraft;
    type Patch = FilePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_draft(draft: &FileDraft) -> Result<(), String> {
        validation::required("fileName", &draft.file_name)?;
        validation::required("uploadedBy", &draft.uploaded_by)?;
        Ok(())
    }

    fn validate_patch(patch: &FilePatch) -> Result<(), String> {
        when_some(&patch.file_name, |v| validation::required("fileName", v))?;
        when_some(&patch.uploaded_by, |v| validation::required("uploadedBy", v))?;
        Ok(())
    }

    fn from_draft(draft: FileDraft, id: String, now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        Self {
            id,
            file_name: draft.file_name,
            created_date: today,
            last_updated_date: today,
            items_count: draft.items_count,
            uploaded_by: draft.uploaded_by,
            security: draft.security,
            status: FileStatus::Active,
            total_views: 0,
            file_link: draft.file_link,
        }
    }
}

impl HasStatus for File {
    type Status = FileStatus;

    fn status(&self) -> FileStatus {
        self.status
    }
}

pub const DEFAULT_UPLOADER: &str = "Current User";
pub const EXTRACTION_MESSAGE: &str = "Products extracted successfully";

/// A spreadsheet handed to `upload`; the record is created from its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content: Vec<u8>,
    /// Trader the file belongs to; the current user when absent
    pub trader_id: Option<String>,
}

impl FileUpload {
    pub fn validate(&self) -> Result<(), String> {
        validation::required("fileName", &self.file_name)?;
        when_some(&self.trader_id, |v| validation::required("traderId", v))?;
        Ok(())
    }

    /// Record stored for a fresh upload: protected, active, nothing extracted yet
    pub fn to_record(&self, id: &str, today: NaiveDate) -> File {
        File {
            id: id.to_string(),
            file_name: self.file_name.trim().to_string(),
            created_date: today,
            last_updated_date: today,
            items_count: 0,
            uploaded_by: self
                .trader_id
                .clone()
                .unwrap_or_else(|| DEFAULT_UPLOADER.to_string()),
            security: Security::Protected,
            status: FileStatus::Active,
            total_views: 0,
            file_link: Some(format!("https://example.com/files/{}", id)),
        }
    }
}

/// Answer of a product extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub message: String,
    pub items_count: u32,
}

/// Item count reported by the simulated extractor, always within 50..150
pub fn simulated_item_count(id: &str) -> u32 {
    let sum = id.bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    50 + sum % 100
}
