//! # Storage Traits
//!
//! Storage abstraction used by the domain layer, so services can be handed
//! any backend that knows how to persist bills.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::bill::{Bill, UnpaidShare};

/// Trait defining the interface for bill storage operations
#[async_trait]
pub trait BillStorage: Send + Sync {
    /// Store a new bill together with its shares, atomically
    async fn store_bill(&self, bill: &Bill) -> Result<()>;

    /// Retrieve a bill by ID, scoped to a household
    async fn get_bill(&self, household_id: &str, bill_id: &str) -> Result<Option<Bill>>;

    /// List bills newest first, optionally filtered by a description search
    /// and starting after the given bill ID
    async fn list_bills(
        &self,
        household_id: &str,
        search: Option<&str>,
        limit: u32,
        after_id: Option<&str>,
    ) -> Result<Vec<Bill>>;

    /// Mark a share as paid
    /// Returns true if an unpaid share was found and updated
    async fn mark_share_paid(&self, bill_id: &str, member_id: &str, paid_at: &str) -> Result<bool>;

    /// All unpaid shares in a household, joined with the payer of each bill
    async fn list_unpaid_shares(&self, household_id: &str) -> Result<Vec<UnpaidShare>>;
}
