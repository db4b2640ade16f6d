use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::entity::{unknown_variant, Entity, EntityKind, HasStatus};
use crate::services::validation::{self, when_some};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    #[default]
    Active,
    Inactive,
}

impl CustomerStatus {
    pub fn toggled(self) -> Self {
        match self {
            CustomerStatus::Active => CustomerStatus::Inactive,
            CustomerStatus::Inactive => CustomerStatus::Active,
        }
    }
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomerStatus::Active => f.write_str("active"),
            CustomerStatus::Inactive => f.write_str("inactive"),
        }
    }
}

impl FromStr for CustomerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CustomerStatus::Active),
            "inactive" => Ok(CustomerStatus::Inactive),
            other => Err(unknown_variant("status", other, &["active", "inactive"])),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub company_name: String,
    pub phone_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    pub gender: String,
    pub country: String,
    #[serde(default)]
    pub state: String,
    pub is_subscribed: bool,
    pub address: String,
    #[serde(default)]
    pub notes: String,
    /// File references, in upload order
    #[serde(default)]
    pub documents: Vec<String>,
    pub status: CustomerStatus,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a customer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDraft {
    pub name: String,
    pub email: String,
    pub company_name: String,
    pub phone_no: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    pub gender: String,
    pub country: String,
    pub state: String,
    #[serde(default)]
    pub is_subscribed: bool,
    pub address: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub documents: Vec<String>,
}

/// Partial customer update. Documents change only through the dedicated
/// add/remove operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_subscribed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CustomerStatus>,
}

/// Patch carrying the whole document list, used by the document operations
#[derive(Debug, Clone, Serialize)]
pub(crate) struct DocumentsPatch<'a> {
    pub documents: &'a [String],
}

impl Entity for Customer {
    const KIND: EntityKind = EntityKind::Customer;
    type Draft = CustomerDraft;
    type Patch = CustomerPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_draft(draft: &CustomerDraft) -> Result<(), String> {
        validation::min_chars("name", &draft.name, 2)?;
        validation::email("email", &draft.email)?;
        validation::required("companyName", &draft.company_name)?;
        validation::phone("phoneNo", &draft.phone_no)?;
        validation::required("gender", &draft.gender)?;
        validation::required("country", &draft.country)?;
        validation::required("state", &draft.state)?;
        validation::min_chars("address", &draft.address, 5)?;
        validation::max_chars("notes", &draft.notes, 500)?;
        for document in &draft.documents {
            validation::required("documents[]", document)?;
        }
        Ok(())
    }

    fn validate_patch(patch: &CustomerPatch) -> Result<(), String> {
        when_some(&patch.name, |v| validation::min_chars("name", v, 2))?;
        when_some(&patch.email, |v| validation::email("email", v))?;
        when_some(&patch.company_name, |v| validation::required("companyName", v))?;
        when_some(&patch.phone_no, |v| validation::phone("phoneNo", v))?;
        when_some(&patch.gender, |v| validation::required("gender", v))?;
        when_some(&patch.country, |v| validation::required("country", v))?;
        when_some(&patch.state, |v| validation::required("state", v))?;
        when_some(&patch.address, |v| validation::min_chars("address", v, 5))?;
        when_some(&patch.notes, |v| validation::max_chars("notes", v, 500))?;
        Ok(())
    }

    fn from_draft(draft: CustomerDraft, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            company_name: draft.company_name,
            phone_no: draft.phone_no,
            profile_image: draft.profile_image,
            gender: draft.gender,
            country: draft.country,
            state: draft.state,
            is_subscribed: draft.is_subscribed,
            address: draft.address,
            notes: draft.notes,
            documents: draft.documents,
            status: CustomerStatus::Active,
            created_at: now,
        }
    }
}

impl HasStatus for Customer {
    type Status = CustomerStatus;

    fn status(&self) -> CustomerStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> CustomerDraft {
        CustomerDraft {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            company_name: "Analytical Engines Ltd".to_string(),
            phone_no: "+44 20 7946 0000".to_string(),
            gender: "female".to_string(),
            country: "uk".to_string(),
            state: "LDN".to_string(),
            address: "12 St James's Square, London".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_wire_format_uses_underscore_id() {
        let customer = Customer::from_draft(draft(), "c-1".to_string(), Utc::now());
        let json = serde_json::to_value(&customer).unwrap();
        assert_eq!(json["_id"], "c-1");
        assert_eq!(json["companyName"], "Analytical Engines Ltd");
        assert_eq!(json["status"], "active");
        assert!(json.get("profileImage").is_none());
    }

    #[test]
    fn test_accepts_plain_id_alias() {
        let json = serde_json::json!({
            "id": "7",
            "name": "Jane Smith",
            "email": "jane@example.com",
            "companyName": "Global Marketing Co.",
            "phoneNo": "+1 (555) 987-6543",
            "gender": "female",
            "country": "us",
            "isSubscribed": false,
            "address": "456 Market Ave, New York, NY",
            "status": "inactive",
            "createdAt": "2025-01-20T11:45:00.000Z"
        });
        let customer: Customer = serde_json::from_value(json).unwrap();
        assert_eq!(customer.id, "7");
        assert_eq!(customer.status, CustomerStatus::Inactive);
        assert!(customer.documents.is_empty());
        assert!(customer.notes.is_empty());
    }

    #[test]
    fn test_validate_draft() {
        assert!(Customer::validate_draft(&draft()).is_ok());

        let mut bad = draft();
        bad.name = "A".to_string();
        assert!(Customer::validate_draft(&bad).is_err());

        let mut bad = draft();
        bad.phone_no = "not a phone".to_string();
        assert!(Customer::validate_draft(&bad).is_err());

        let mut bad = draft();
        bad.notes = "n".repeat(501);
        assert!(Customer::validate_draft(&bad).is_err());
    }

    #[test]
    fn test_empty_patch_serializes_to_empty_object() {
        let json = serde_json::to_value(CustomerPatch::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
        assert!(Customer::validate_patch(&CustomerPatch::default()).is_ok());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("inactive".parse::<CustomerStatus>(), Ok(CustomerStatus::Inactive));
        assert!("Inactive".parse::<CustomerStatus>().is_err());
        assert_eq!(CustomerStatus::Active.toggled(), CustomerStatus::Inactive);
    }
}
