pub mod auth;
pub mod customer;
pub mod entity;
pub mod file;
pub mod product;
pub mod trader;

pub use customer::{Customer, CustomerDraft, CustomerPatch, CustomerStatus};
pub use entity::{Entity, EntityKind, HasStatus};
pub use file::{ExtractionResult, File, FileDraft, FilePatch, FileStatus, FileUpload, Security};
pub use product::{Product, ProductDraft, ProductPatch};
pub use trader::{RiskCategory, Trader, TraderDraft, TraderPatch, TraderStatus, TradingTier};
