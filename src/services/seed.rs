//! Default records the in-memory mock and the local store start from.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;
use serde::Serialize;
use serde_json::Value;

use crate::models::customer::{Customer, CustomerStatus};
use crate::models::entity::EntityKind;
use crate::models::file::{File, FileStatus, Security};
use crate::models::product::Product;
use crate::models::trader::{RiskCategory, Trader, TraderStatus, TradingTier};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn timestamp(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, 0)
        .single()
        .unwrap_or_default()
}

fn to_values<T: Serialize>(records: Vec<T>) -> Vec<Value> {
    records
        .into_iter()
        .filter_map(|record| serde_json::to_value(record).ok())
        .collect()
}

struct CustomerSeed {
    name: &'static str,
    email: &'static str,
    company: &'static str,
    phone: &'static str,
    gender: &'static str,
    country: &'static str,
    state: &'static str,
    subscribed: bool,
    address: &'static str,
    notes: &'static str,
    status: CustomerStatus,
}

const CUSTOMER_SEEDS: [CustomerSeed; 3] = [
    CustomerSeed {
        name: "John Doe",
        email: "john@example.com",
        company: "Tech Solutions Inc.",
        phone: "+1 (555) 123-4567",
        gender: "male",
        country: "us",
        state: "CA",
        subscribed: true,
        address: "123 Tech St, San Francisco, CA",
        notes: "Regular customer",
        status: CustomerStatus::Active,
    },
    CustomerSeed {
        name: "Jane Smith",
        email: "jane@example.com",
        company: "Global Marketing Co.",
        phone: "+1 (555) 987-6543",
        gender: "female",
        country: "us",
        state: "NY",
        subscribed: false,
        address: "456 Market Ave, New York, NY",
        notes: "VIP customer",
        status: CustomerStatus::Active,
    },
    CustomerSeed {
        name: "Robert Johnson",
        email: "robert@example.com",
        company: "Innovative Designs LLC",
        phone: "+1 (555) 456-7890",
        gender: "other",
        country: "in",
        state: "MA",
        subscribed: true,
        address: "789 Design Blvd, Los Angeles, CA",
        notes: "New customer",
        status: CustomerStatus::Inactive,
    },
];

fn customer_from_seed(seed: &CustomerSeed, id: String, created_at: DateTime<Utc>) -> Customer {
    Customer {
        id,
        name: seed.name.to_string(),
        email: seed.email.to_string(),
        company_name: seed.company.to_string(),
        phone_no: seed.phone.to_string(),
        profile_image: Some("https://via.placeholder.com/100".to_string()),
        gender: seed.gender.to_string(),
        country: seed.country.to_string(),
        state: seed.state.to_string(),
        is_subscribed: seed.subscribed,
        address: seed.address.to_string(),
        notes: seed.notes.to_string(),
        documents: Vec::new(),
        status: seed.status,
        created_at,
    }
}

/// The three customers the local store starts with; ids "1".."3"
pub fn local_customers(now: DateTime<Utc>) -> Vec<Customer> {
    CUSTOMER_SEEDS
        .iter()
        .enumerate()
        .map(|(idx, seed)| customer_from_seed(seed, (idx + 1).to_string(), now))
        .collect()
}

/// Customers served by the mock backend, with backend-style ids
pub fn mock_customers() -> Vec<Customer> {
    let created = [
        timestamp(2025, 1, 15, 10, 30),
        timestamp(2025, 1, 20, 11, 45),
        timestamp(2025, 2, 1, 9, 15),
    ];
    CUSTOMER_SEEDS
        .iter()
        .zip(created)
        .enumerate()
        .map(|(idx, (seed, created_at))| {
            let mut customer =
                customer_from_seed(seed, format!("690b1a2b4e7e8d12345abcde{}", idx + 1), created_at);
            customer.documents = vec!["https://via.placeholder.com/150".to_string()];
            customer
        })
        .collect()
}

pub fn traders() -> Vec<Trader> {
    let rows = [
        ("TRD001", "John Smith", "john.smith@example.com", "+1 (555) 123-4567", TraderStatus::Active, TradingTier::Gold, RiskCategory::Low, dec!(125000.00), dec!(50000.00), "New York", date(2023, 5, 15), 12),
        ("TRD002", "Sarah Johnson", "sarah.j@example.com", "+1 (555) 987-6543", TraderStatus::Active, TradingTier::Silver, RiskCategory::Medium, dec!(48250.50), dec!(20000.00), "California", date(2023, 6, 20), 8),
        ("TRD003", "Michael Brown", "m.brown@example.com", "+1 (555) 456-7890", TraderStatus::Inactive, TradingTier::Basic, RiskCategory::High, dec!(3100.00), dec!(1000.00), "Texas", date(2023, 7, 10), 5),
        ("TRD004", "Emily Davis", "emily.davis@example.com", "+1 (555) 321-0987", TraderStatus::Active, TradingTier::Platinum, RiskCategory::Low, dec!(410000.00), dec!(150000.00), "Florida", date(2023, 8, 5), 20),
        ("TRD005", "Robert Wilson", "rob.w@example.com", "+1 (555) 654-3210", TraderStatus::Active, TradingTier::Gold, RiskCategory::Medium, dec!(97500.25), dec!(40000.00), "Washington", date(2023, 9, 12), 15),
    ];
    rows.into_iter()
        .map(
            |(id, name, email, phone, status, tier, risk, balance, credit, region, joined, files)| Trader {
                id: id.to_string(),
                trader_id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
                status,
                trading_tier: tier,
                risk_category: risk,
                account_balance: balance,
                credit_limit: credit,
                region: region.to_string(),
                joined_date: joined,
                total_files: files,
            },
        )
        .collect()
}

pub fn files() -> Vec<File> {
    let rows = [
        ("f1", "Product Catalog Q3.xlsx", date(2023, 10, 15), date(2023, 10, 15), 250, "John Smith", Security::Protected, 42, FileStatus::Active),
        ("f2", "Inventory List.csv", date(2023, 9, 20), date(2023, 9, 22), 180, "Sarah Johnson", Security::Public, 28, FileStatus::Active),
        ("f3", "Summer Products.xlsx", date(2023, 8, 5), date(2023, 8, 5), 320, "Michael Brown", Security::Protected, 15, FileStatus::Archived),
        ("f4", "Winter Collection.xlsx", date(2023, 11, 1), date(2023, 11, 1), 150, "Emily Davis", Security::Protected, 8, FileStatus::Active),
        ("f5", "Electronics Inventory.csv", date(2023, 7, 12), date(2023, 10, 30), 420, "Robert Wilson", Security::Public, 65, FileStatus::Active),
    ];
    rows.into_iter()
        .enumerate()
        .map(
            |(idx, (id, name, created, updated, items, uploader, security, views, status))| File {
                id: id.to_string(),
                file_name: name.to_string(),
                created_date: created,
                last_updated_date: updated,
                items_count: items,
                uploaded_by: uploader.to_string(),
                security,
                status,
                total_views: views,
                file_link: Some(format!("https://example.com/file{}", idx + 1)),
            },
        )
        .collect()
}

pub fn products() -> Vec<Product> {
    let rows = [
        ("p1", "PRD001", "Wireless Headphones", "John Smith", "High-quality wireless headphones with noise cancellation", "Electronics", dec!(199.99), dec!(159.99), 50, date(2023, 10, 15)),
        ("p2", "PRD002", "Smart Watch", "Sarah Johnson", "Feature-rich smartwatch with health tracking", "Electronics", dec!(299.99), dec!(249.99), 30, date(2023, 9, 20)),
        ("p3", "PRD003", "Coffee Maker", "Michael Brown", "Programmable coffee maker with thermal carafe", "Home Appliances", dec!(89.99), dec!(69.99), 25, date(2023, 8, 5)),
        ("p4", "PRD004", "Yoga Mat", "Emily Davis", "Non-slip eco-friendly yoga mat", "Fitness", dec!(29.99), dec!(24.99), 100, date(2023, 11, 1)),
        ("p5", "PRD005", "Bluetooth Speaker", "Robert Wilson", "Portable waterproof Bluetooth speaker", "Electronics", dec!(79.99), dec!(64.99), 40, date(2023, 7, 12)),
    ];
    rows.into_iter()
        .map(
            |(id, code, name, trader, description, category, retail, net, quantity, created)| Product {
                id: id.to_string(),
                product_id: code.to_string(),
                product_name: name.to_string(),
                trader_name: trader.to_string(),
                description: description.to_string(),
                category: category.to_string(),
                retail_price: retail,
                net_price: net,
                quantity,
                created_date: created,
            },
        )
        .collect()
}

/// Initial contents of a mock-backend collection
pub fn mock_records(kind: EntityKind) -> Vec<Value> {
    match kind {
        EntityKind::Customer => to_values(mock_customers()),
        EntityKind::Trader => to_values(traders()),
        EntityKind::File => to_values(files()),
        EntityKind::Product => to_values(products()),
    }
}

/// Initial contents of a local-store collection, written on first access
pub fn local_records(kind: EntityKind, now: DateTime<Utc>) -> Vec<Value> {
    match kind {
        EntityKind::Customer => to_values(local_customers(now)),
        EntityKind::Trader => to_values(traders()),
        EntityKind::File => to_values(files()),
        EntityKind::Product => to_values(products()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entity::Entity;
    use std::collections::HashSet;

    #[test]
    fn test_local_customers_are_three_with_numeric_ids() {
        let customers = local_customers(Utc::now());
        let ids: Vec<_> = customers.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(customers[2].status, CustomerStatus::Inactive);
    }

    #[test]
    fn test_seed_ids_unique_per_collection() {
        for kind in EntityKind::ALL {
            let records = mock_records(kind);
            assert_eq!(records.len(), if kind == EntityKind::Customer { 3 } else { 5 });
            let ids: HashSet<_> = records
                .iter()
                .filter_map(|r| r.get(kind.id_field()).and_then(Value::as_str))
                .collect();
            assert_eq!(ids.len(), records.len(), "duplicate ids in {}", kind);
        }
    }

    #[test]
    fn test_seeds_deserialize_back() {
        let traders: Vec<Trader> =
            serde_json::from_value(Value::Array(mock_records(EntityKind::Trader))).unwrap();
        assert_eq!(traders[1].id(), "TRD002");
        let files: Vec<File> =
            serde_json::from_value(Value::Array(mock_records(EntityKind::File))).unwrap();
        assert_eq!(files[2].status, FileStatus::Archived);
    }
}
