//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations, hiding
//! the `SeaORM` implementation details from the rest of the application.
//! The transfer engine and lifecycle manager live here too: every one of
//! their operations is a single database transaction that locks the cells
//! it touches, keeps card/category totals in step with subcard balances,
//! and appends the audit rows before committing.

pub mod card;
pub mod category;
pub mod error;
pub mod ledger_log;
pub mod lifecycle;
pub mod subcard;
pub mod template;
pub mod transfer;
pub mod user;

pub(crate) mod aggregate;

pub use card::CardRepository;
pub use category::CategoryRepository;
pub use error::LedgerError;
pub use ledger_log::TransactionLogRepository;
pub use lifecycle::LifecycleManager;
pub use subcard::SubcardRepository;
pub use template::TemplateRepository;
pub use transfer::{MergeOutcome, MergeTarget, TransferEngine};
pub use user::UserRepository;
