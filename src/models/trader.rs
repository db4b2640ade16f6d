use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::entity::{unknown_variant, Entity, EntityKind, HasStatus};
use crate::services::validation::{self, when_some};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TraderStatus {
    #[default]
    Active,
    Inactive,
}

impl fmt::Display for TraderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraderStatus::Active => f.write_str("Active"),
            TraderStatus::Inactive => f.write_str("Inactive"),
        }
    }
}

impl FromStr for TraderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(TraderStatus::Active),
            "Inactive" => Ok(TraderStatus::Inactive),
            other => Err(unknown_variant("status", other, &["Active", "Inactive"])),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TradingTier {
    #[default]
    Basic,
    Silver,
    Gold,
    Platinum,
}

impl FromStr for TradingTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Basic" => Ok(TradingTier::Basic),
            "Silver" => Ok(TradingTier::Silver),
            "Gold" => Ok(TradingTier::Gold),
            "Platinum" => Ok(TradingTier::Platinum),
            other => Err(unknown_variant(
                "tradingTier",
                other,
                &["Basic", "Silver", "Gold", "Platinum"],
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RiskCategory {
    #[default]
    Low,
    Medium,
    High,
}

impl FromStr for RiskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(RiskCategory::Low),
            "Medium" => Ok(RiskCategory::Medium),
            "High" => Ok(RiskCategory::High),
            other => Err(unknown_variant("riskCategory", other, &["Low", "Medium", "High"])),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trader {
    pub id: String,
    pub trader_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: TraderStatus,
    pub trading_tier: TradingTier,
    #[serde(default)]
    pub risk_category: RiskCategory,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub account_balance: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub credit_limit: Decimal,
    #[serde(default)]
    pub region: String,
    pub joined_date: NaiveDate,
    #[serde(default)]
    pub total_files: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraderDraft {
    /// Human-facing trader code; derived from the id when absent
    #[serde(default)]
    pub trader_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub trading_tier: TradingTier,
    #[serde(default)]
    pub risk_category: RiskCategory,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub account_balance: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub credit_limit: Decimal,
    #[serde(default)]
    pub region: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TraderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trading_tier: Option<TradingTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_category: Option<RiskCategory>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub account_balance: Option<Decimal>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub credit_limit: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// `TRD` followed by the first eight alphanumerics of the record id
fn derive_trader_code(id: &str) -> String {
    let suffix: String = id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(8)
        .collect();
    format!("TRD{}", suffix.to_uppercase())
}

impl Entity for Trader {
    const KIND: EntityKind = EntityKind::Trader;
    type Draft = TraderDraft;
    type Patch = TraderPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_draft(draft: &TraderDraft) -> Result<(), String> {
        when_some(&draft.trader_id, |v| validation::required("traderId", v))?;
        validation::min_chars("name", &draft.name, 2)?;
        validation::email("email", &draft.email)?;
        validation::phone("phone", &draft.phone)?;
        validation::non_negative("accountBalance", draft.account_balance)?;
        validation::non_negative("creditLimit", draft.credit_limit)?;
        Ok(())
    }

    fn validate_patch(patch: &TraderPatch) -> Result<(), String> {
        when_some(&patch.name, |v| validation::min_chars("name", v, 2))?;
        when_some(&patch.email, |v| validation::email("email", v))?;
        when_some(&patch.phone, |v| validation::phone("phone", v))?;
        when_some(&patch.account_balance, |v| {
            validation::non_negative("accountBalance", *v)
        })?;
        when_some(&patch.credit_limit, |v| validation::non_negative("creditLimit", *v))?;
        Ok(())
    }

    fn from_draft(draft: TraderDraft, id: String, now: DateTime<Utc>) -> Self {
        let trader_id = draft
            .trader_id
            .unwrap_or_else(|| derive_trader_code(&id));
        Self {
            id,
            trader_id,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            status: TraderStatus::Active,
            trading_tier: draft.trading_tier,
            risk_category: draft.risk_category,
            account_balance: draft.account_balance,
            credit_limit: draft.credit_limit,
            region: draft.region,
            joined_date: now.date_naive(),
            total_files: 0,
        }
    }
}

impl HasStatus for Trader {
    type Status = TraderStatus;

    fn status(&self) -> TraderStatus {
        self.status
    }
}
