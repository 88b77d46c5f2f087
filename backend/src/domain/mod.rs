//! # Domain Module
//!
//! Business logic for the household service, independent of HTTP and of the
//! storage backend.
//!
//! ## Module Organization
//!
//! - **money**: fixed-point cents type used for every amount
//! - **split_allocator**: pure bill split calculation (equal, percentage,
//!   shares, custom, by item) with exact reconciliation to the total
//! - **bill_service**: validating, saving, listing and settling bills
//! - **balance_service**: per-member outstanding balances
//! - **task_assignment**: random round-robin chore assignment
//! - **session**: explicit caller identity
//!
//! ## Business Rules
//!
//! - Allocated parts always add up to the total to the cent, except custom
//!   splits, which are validated (one cent of tolerance) but never corrected
//! - Bills belong to one household and are invisible to others
//! - The payer's own share is settled when the bill is created

pub mod balance_service;
pub mod bill_service;
pub mod commands;
pub mod errors;
pub mod models;
pub mod money;
pub mod session;
pub mod split_allocator;
pub mod task_assignment;

pub use balance_service::BalanceService;
pub use bill_service::BillService;
pub use errors::{BillError, DeserializationError, SplitError};
pub use money::Money;
pub use session::SessionContext;
