//! Client-side domain models.
//!
//! Every model is hydrated from a loosely-typed API payload through
//! `TryFrom<&serde_json::Value>`, with a fail-soft `from_json` returning
//! `Option` and an `is_*` shape predicate for callers that only need to check.

pub mod address;
pub mod billing;
pub mod catalog;
pub mod company;
pub mod ledger;
pub mod order;
pub mod user;

pub use address::{Address, is_address};
pub use billing::{Billing, PaymentMethod, is_billing, is_payment_method};
pub use catalog::{CatalogItem, CatalogProduct, UserReview, is_product};
pub use company::{Company, is_company};
pub use ledger::{InvoiceEntry, InvoiceInput, InvoiceLedger};
pub use order::{Order, OrderStatus, is_order};
pub use user::{ANONYMOUS_USER_ID, User, UserType, is_user};
