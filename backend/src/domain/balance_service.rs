//! Who owes whom inside a household.
//!
//! Balances are derived on demand from unpaid bill shares; nothing is stored.

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::commands::balances::{HouseholdBalancesResult, MemberBalance};
use crate::domain::models::bill::UnpaidShare;
use crate::domain::money::Money;
use crate::domain::session::SessionContext;
use crate::storage::BillStorage;

#[derive(Clone)]
pub struct BalanceService {
    storage: Arc<dyn BillStorage>,
}

impl BalanceService {
    pub fn new(storage: Arc<dyn BillStorage>) -> Self {
        Self { storage }
    }

    pub async fn household_balances(&self, ctx: &SessionContext) -> Result<HouseholdBalancesResult> {
        info!("Calculating balances for household {}", ctx.household_id);

        let unpaid = self.storage.list_unpaid_shares(&ctx.household_id).await?;
        let balances = compute_balances(&unpaid);

        info!("Found {} members with outstanding balances", balances.len());
        Ok(HouseholdBalancesResult { balances })
    }
}

/// Fold unpaid shares into per-member totals, sorted by member id.
pub fn compute_balances(unpaid: &[UnpaidShare]) -> Vec<MemberBalance> {
    let mut totals: BTreeMap<&str, (Money, Money)> = BTreeMap::new();

    for share in unpaid {
        if share.member_id == share.payer_id {
            continue;
        }
        totals.entry(share.member_id.as_str()).or_default().0 += share.amount;
        totals.entry(share.payer_id.as_str()).or_default().1 += share.amount;
    }

    totals
        .into_iter()
        .map(|(member_id, (owes, owed))| MemberBalance {
            member_id: member_id.to_string(),
            owes,
            owed,
            net: owed - owes,
        })
        .collect()
}
