//! Domain model for a saved bill.
use serde::{Deserialize, Serialize};

use crate::domain::money::Money;
use crate::domain::split_allocator::SplitMethod;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillShare {
    pub member_id: String,
    pub amount: Money,
    pub is_paid: bool,
    pub paid_at: Option<String>, // RFC 3339 timestamp
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: String,
    pub household_id: String,
    pub description: String,
    pub payer_id: String,
    pub total: Money,
    pub split: SplitMethod,
    pub shares: Vec<BillShare>,
    pub created_by: String,
    pub created_at: String, // RFC 3339 timestamp
}

impl Bill {
    pub fn generate_id() -> String {
        format!("bill::{}", uuid::Uuid::new_v4())
    }

    pub fn share_for(&self, member_id: &str) -> Option<&BillShare> {
        self.shares.iter().find(|share| share.member_id == member_id)
    }

    /// Sum of shares not yet settled
    pub fn outstanding(&self) -> Money {
        self.shares
            .iter()
            .filter(|share| !share.is_paid)
            .map(|share| share.amount)
            .sum()
    }
}

/// An unpaid share joined with the payer of its bill, used for balances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpaidShare {
    pub bill_id: String,
    pub payer_id: String,
    pub member_id: String,
    pub amount: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_prefix_and_uniqueness() {
        let first = Bill::generate_id();
        let second = Bill::generate_id();

        assert!(first.starts_with("bill::"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_outstanding_skips_paid_shares() {
        let bill = Bill {
            id: "bill::1".to_string(),
            household_id: "home".to_string(),
            description: "Pizza".to_string(),
            payer_id: "ana".to_string(),
            total: Money::from_cents(3000),
            split: SplitMethod::Equal { member_ids: vec!["ana".to_string(), "ben".to_string()] },
            shares: vec![
                BillShare { member_id: "ana".to_string(), amount: Money::from_cents(1500), is_paid: true, paid_at: None },
                BillShare { member_id: "ben".to_string(), amount: Money::from_cents(1500), is_paid: false, paid_at: None },
            ],
            created_by: "ana".to_string(),
            created_at: "2025-06-12T20:00:00Z".to_string(),
        };

        assert_eq!(bill.outstanding(), Money::from_cents(1500));
        assert!(bill.share_for("ben").is_some());
        assert!(bill.share_for("cy").is_none());
    }
}
