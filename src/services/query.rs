//! Search, filtering and pagination over already-fetched records.

use serde::Serialize;

use crate::models::customer::{Customer, CustomerStatus};
use crate::models::file::{File, FileStatus, Security};
use crate::models::product::Product;
use crate::models::trader::{Trader, TradingTier};

pub const DEFAULT_PER_PAGE: usize = 10;

/// Fields a free-text search looks at
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;

    /// Case-insensitive substring match; a blank term matches everything
    fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
    }
}

impl Searchable for Customer {
    fn search_fields(&self) -> Vec<&str> {
        [&self.name, &self.email, &self.company_name]
            .into_iter()
            .map(String::as_str)
            .collect()
    }
}

impl Searchable for Trader {
    fn search_fields(&self) -> Vec<&str> {
        [&self.name, &self.email, &self.trader_id, &self.region]
            .into_iter()
            .map(String::as_str)
            .collect()
    }
}

impl Searchable for File {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.file_name.as_str(), self.uploaded_by.as_str()]
    }
}

impl Searchable for Product {
    fn search_fields(&self) -> Vec<&str> {
        [
            &self.product_name,
            &self.product_id,
            &self.description,
            &self.trader_name,
        ]
        .into_iter()
        .map(String::as_str)
        .collect()
    }
}

pub fn search<'a, T: Searchable>(records: &'a [T], term: &str) -> Vec<&'a T> {
    records.iter().filter(|record| record.matches(term)).collect()
}

/// Criteria narrowing a list; unset criteria match everything
pub trait Filter<T> {
    fn accepts(&self, record: &T) -> bool;

    fn apply<'a>(&self, records: &'a [T]) -> Vec<&'a T> {
        records.iter().filter(|record| self.accepts(record)).collect()
    }
}

fn same_text(expected: &Option<String>, actual: &str) -> bool {
    expected
        .as_deref()
        .is_none_or(|expected| expected.trim().eq_ignore_ascii_case(actual.trim()))
}

#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub status: Option<CustomerStatus>,
}

impl Filter<Customer> for CustomerFilter {
    fn accepts(&self, customer: &Customer) -> bool {
        self.status.is_none_or(|status| customer.status == status)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TraderFilter {
    pub tier: Option<TradingTier>,
    pub region: Option<String>,
}

impl Filter<Trader> for TraderFilter {
    fn accepts(&self, trader: &Trader) -> bool {
        self.tier.is_none_or(|tier| trader.trading_tier == tier) && same_text(&self.region, &trader.region)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub status: Option<FileStatus>,
    pub security: Option<Security>,
    pub uploaded_by: Option<String>,
}

impl Filter<File> for FileFilter {
    fn accepts(&self, file: &File) -> bool {
        self.status.is_none_or(|status| file.status == status)
            && self.security.is_none_or(|security| file.security == security)
            && same_text(&self.uploaded_by, &file.uploaded_by)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub trader_name: Option<String>,
}

impl Filter<Product> for ProductFilter {
    fn accepts(&self, product: &Product) -> bool {
        same_text(&self.category, &product.category) && same_text(&self.trader_name, &product.trader_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// 1-based pagination. Page 0 is treated as page 1, and a page past the end
/// comes back empty with the totals intact.
pub fn paginate<T: Clone>(records: &[T], page: usize, per_page: usize) -> Page<T> {
    let page = page.max(1);
    let per_page = if per_page == 0 { DEFAULT_PER_PAGE } else { per_page };
    let total_items = records.len();
    let total_pages = total_items.div_ceil(per_page);

    let start = (page - 1).saturating_mul(per_page);
    let items = records
        .iter()
        .skip(start)
        .take(per_page)
        .cloned()
        .collect();

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}
