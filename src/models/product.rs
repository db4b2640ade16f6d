use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::entity::{Entity, EntityKind};
use crate::services::validation::{self, when_some};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub trader_name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub retail_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_price: Decimal,
    pub quantity: u32,
    pub created_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    /// Catalogue code; derived from the id when absent
    #[serde(default)]
    pub product_id: Option<String>,
    pub product_name: String,
    pub trader_name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub retail_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_price: Decimal,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trader_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub retail_price: Option<Decimal>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub net_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl Entity for Product {
    const KIND: EntityKind = EntityKind::Product;
    type Draft = ProductDraft;
    type Patch = ProductPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_draft(draft: &ProductDraft) -> Result<(), String> {
        when_some(&draft.product_id, |v| validation::required("productId", v))?;
        validation::required("productName", &draft.product_name)?;
        validation::required("traderName", &draft.trader_name)?;
        validation::required("category", &draft.category)?;
        validation::non_negative("retailPrice", draft.retail_price)?;
        validation::non_negative("netPrice", draft.net_price)?;
        Ok(())
    }

    fn validate_patch(patch: &ProductPatch) -> Result<(), String> {
        when_some(&patch.product_name, |v| validation::required("productName", v))?;
        when_some(&patch.trader_name, |v| validation::required("traderName", v))?;
        when_some(&patch.category, |v| validation::required("category", v))?;
        when_some(&patch.retail_price, |v| validation::non_negative("retailPrice", *v))?;
        when_some(&patch.net_price, |v| validation::non_negative("netPrice", *v))?;
        Ok(())
    }

    fn from_draft(draft: ProductDraft, id: String, now: DateTime<Utc>) -> Self {
        let product_id = draft.product_id.unwrap_or_else(|| {
            let suffix: String = id
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .take(8)
                .collect();
            format!("PRD{}", suffix.to_uppercase())
        });
        Self {
            id,
            product_id,
            product_name: draft.product_name,
            trader_name: draft.trader_name,
            description: draft.description,
            category: draft.category,
            retail_price: draft.retail_price,
            net_price: draft.net_price,
            quantity: draft.quantity,
            created_date: now.date_naive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft() -> ProductDraft {
        ProductDraft {
            product_id: None,
            product_name: "Desk Lamp".to_string(),
            trader_name: "Emily Davis".to_string(),
            description: "LED lamp with dimmer".to_string(),
            category: "Home Appliances".to_string(),
            retail_price: dec!(45),
            net_price: dec!(38.5),
            quantity: 12,
        }
    }

    #[test]
    fn test_product_code_derived_from_id() {
        let product = Product::from_draft(draft(), "p-9f8e7d6c".to_string(), Utc::now());
        assert_eq!(product.product_id, "PRDP9F8E7D6");
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut bad = draft();
        bad.net_price = dec!(-3);
        assert!(Product::validate_draft(&bad).is_err());
        assert!(Product::validate_draft(&draft()).is_ok());
    }

    #[test]
    fn test_prices_deserialize_from_numbers() {
        let json = serde_json::json!({
            "id": "p1",
            "productId": "PRD001",
            "productName": "Wireless Headphones",
            "traderName": "John Smith",
            "category": "Electronics",
            "retailPrice": 199.99,
            "netPrice": 159.99,
            "quantity": 50,
            "createdDate": "2023-10-15"
        });
        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.quantity, 50);
        assert!(product.retail_price > product.net_price);
        assert!(product.description.is_empty());
    }
}
