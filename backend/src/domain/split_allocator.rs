//! Bill split allocation.
//!
//! Turns a total and a split method into a per-member owed amount. Every
//! method except `custom` reconciles to the total exactly: amounts are
//! computed in cents, floored, and the leftover cents are handed out one at a
//! time in input order.
//!
//! Sums of caller-supplied amounts are checked; an overflow is invalid input.
//!
//! Custom amounts are an explicit user intent, so they are checked against
//! the total (one cent of tolerance) and returned untouched rather than
//! corrected.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::errors::SplitError;
use crate::domain::money::Money;

/// Allowed gap between the percentage sum and 100.
const PERCENTAGE_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentageAllocation {
    pub member_id: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareAllocation {
    pub member_id: String,
    pub shares: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedAllocation {
    pub member_id: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitItem {
    #[serde(default)]
    pub description: Option<String>,
    pub amount: Money,
    pub member_ids: Vec<String>,
}

/// A split method together with its per-member inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SplitMethod {
    Equal { member_ids: Vec<String> },
    Percentage { allocations: Vec<PercentageAllocation> },
    Shares { allocations: Vec<ShareAllocation> },
    Custom { allocations: Vec<FixedAllocation> },
    ByItem { items: Vec<SplitItem>, tax_and_tip: Money },
}

impl SplitMethod {
    pub fn kind(&self) -> &'static str {
        match self {
            SplitMethod::Equal { .. } => "equal",
            SplitMethod::Percentage { .. } => "percentage",
            SplitMethod::Shares { .. } => "shares",
            SplitMethod::Custom { .. } => "custom",
            SplitMethod::ByItem { .. } => "by_item",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantShare {
    pub member_id: String,
    pub amount: Money,
}

/// Owed amount per member, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitResult {
    shares: Vec<ParticipantShare>,
}

impl SplitResult {
    fn from_parts(member_ids: impl IntoIterator<Item = String>, cents: Vec<i64>) -> Self {
        let shares = member_ids
            .into_iter()
            .zip(cents)
            .map(|(member_id, amount)| ParticipantShare {
                member_id,
                amount: Money::from_cents(amount),
            })
            .collect();
        Self { shares }
    }

    pub fn shares(&self) -> &[ParticipantShare] {
        &self.shares
    }

    pub fn into_shares(self) -> Vec<ParticipantShare> {
        self.shares
    }

    pub fn amount_for(&self, member_id: &str) -> Option<Money> {
        self.shares
            .iter()
            .find(|share| share.member_id == member_id)
            .map(|share| share.amount)
    }

    pub fn total(&self) -> Money {
        self.shares.iter().map(|share| share.amount).sum()
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}

/// Split `total` evenly. The first `total % n` members pay one extra cent.
pub fn allocate_equal(total: Money, member_ids: &[String]) -> Result<SplitResult, SplitError> {
    ensure_non_negative(total, "Total")?;
    ensure_participants(member_ids.iter())?;

    let weights = vec![1; member_ids.len()];
    let cents = distribute(total.cents(), &weights);
    Ok(SplitResult::from_parts(member_ids.iter().cloned(), cents))
}

/// Split `total` by percentage. Percentages must each lie in 0..=100 and add
/// up to 100 within 0.01.
///
/// Each member's raw amount is `total * pct / 100` at full precision, floored
/// to the cent, then reconciled to the total. When the percentages add up to
/// exactly 100 every amount stays within one cent of its raw value.
pub fn allocate_by_percentage(
    total: Money,
    allocations: &[PercentageAllocation],
) -> Result<SplitResult, SplitError> {
    ensure_non_negative(total, "Total")?;
    ensure_participants(allocations.iter().map(|a| &a.member_id))?;

    for allocation in allocations {
        let pct = allocation.percentage;
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(SplitError::Validation(format!(
                "Percentage for {} must be between 0 and 100, got {}",
                allocation.member_id, pct
            )));
        }
    }

    let sum: f64 = allocations.iter().map(|a| a.percentage).sum();
    if (sum - 100.0).abs() > PERCENTAGE_TOLERANCE {
        return Err(SplitError::Validation(format!(
            "Percentages must add up to 100, got {:.2}",
            sum
        )));
    }

    let total_cents = total.cents();
    let mut cents: Vec<i64> = allocations
        .iter()
        .map(|a| (total_cents as f64 * a.percentage / 100.0).floor() as i64)
        .collect();
    let eligible: Vec<bool> = allocations.iter().map(|a| a.percentage > 0.0).collect();
    reconcile(total_cents, &mut cents, &eligible);

    Ok(SplitResult::from_parts(
        allocations.iter().map(|a| a.member_id.clone()),
        cents,
    ))
}

/// Split `total` in proportion to share counts. At least one count must be
/// non-zero; members with zero shares owe nothing.
pub fn allocate_by_shares(
    total: Money,
    allocations: &[ShareAllocation],
) -> Result<SplitResult, SplitError> {
    ensure_non_negative(total, "Total")?;
    ensure_participants(allocations.iter().map(|a| &a.member_id))?;

    if allocations.iter().all(|a| a.shares == 0) {
        return Err(SplitError::Validation(
            "At least one member must have a share".to_string(),
        ));
    }

    let weights: Vec<u64> = allocations.iter().map(|a| u64::from(a.shares)).collect();
    let cents = distribute(total.cents(), &weights);
    Ok(SplitResult::from_parts(
        allocations.iter().map(|a| a.member_id.clone()),
        cents,
    ))
}

/// Accept caller-chosen amounts as long as they add up to `total` within
/// one cent. Amounts are returned exactly as given.
pub fn allocate_custom(
    total: Money,
    allocations: &[FixedAllocation],
) -> Result<SplitResult, SplitError> {
    ensure_non_negative(total, "Total")?;
    ensure_participants(allocations.iter().map(|a| &a.member_id))?;

    for allocation in allocations {
        ensure_non_negative(allocation.amount, &format!("Amount for {}", allocation.member_id))?;
    }

    let actual = checked_sum(allocations.iter().map(|a| a.amount))?;
    if actual.abs_diff(total) > Money::from_cents(1) {
        return Err(SplitError::Mismatch { expected: total, actual });
    }

    Ok(SplitResult {
        shares: allocations
            .iter()
            .map(|a| ParticipantShare {
                member_id: a.member_id.clone(),
                amount: a.amount,
            })
            .collect(),
    })
}

/// Split an itemized bill. Each item is divided evenly among its members,
/// then `tax_and_tip` is spread in proportion to each member's item total.
///
/// Members appear in the result in order of first appearance across items.
pub fn allocate_by_item(items: &[SplitItem], tax_and_tip: Money) -> Result<SplitResult, SplitError> {
    ensure_non_negative(tax_and_tip, "Tax and tip")?;
    if items.is_empty() {
        return Err(SplitError::InvalidInput("At least one item is required".to_string()));
    }

    let mut member_ids: Vec<String> = Vec::new();
    let mut item_totals: Vec<i64> = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let label = item
            .description
            .clone()
            .unwrap_or_else(|| format!("item {}", index + 1));
        ensure_non_negative(item.amount, &format!("Amount for {}", label))?;
        if item.member_ids.is_empty() {
            return Err(SplitError::InvalidInput(format!("{} has no members", label)));
        }

        let item_split = allocate_equal(item.amount, &item.member_ids)?;
        for share in item_split.into_shares() {
            match member_ids.iter().position(|id| *id == share.member_id) {
                Some(position) => {
                    item_totals[position] = item_totals[position]
                        .checked_add(share.amount.cents())
                        .ok_or_else(too_large)?;
                }
                None => {
                    member_ids.push(share.member_id);
                    item_totals.push(share.amount.cents());
                }
            }
        }
    }

    let item_sum = checked_sum(item_totals.iter().map(|cents| Money::from_cents(*cents)))?;
    checked_sum([item_sum, tax_and_tip])?;
    let total_item_amount = item_sum.cents();
    if total_item_amount == 0 {
        return Err(SplitError::InvalidInput(
            "Cannot proportion tax and tip when the items total zero".to_string(),
        ));
    }

    let weights: Vec<u64> = item_totals.iter().map(|cents| *cents as u64).collect();
    let tax_cents = distribute(tax_and_tip.cents(), &weights);
    let owed: Vec<i64> = item_totals
        .iter()
        .zip(tax_cents)
        .map(|(items, tax)| items + tax)
        .collect();

    Ok(SplitResult::from_parts(member_ids, owed))
}

/// Run the allocator for any method.
///
/// A total is required except for itemized splits, where it is derived from
/// the items plus tax and tip; a stated total that disagrees with the derived
/// one by more than a cent is reported as a mismatch.
pub fn allocate(total: Option<Money>, method: &SplitMethod) -> Result<SplitResult, SplitError> {
    let require_total = || {
        total.ok_or_else(|| {
            SplitError::InvalidInput(format!("A total is required for {} splits", method.kind()))
        })
    };

    match method {
        SplitMethod::Equal { member_ids } => allocate_equal(require_total()?, member_ids),
        SplitMethod::Percentage { allocations } => allocate_by_percentage(require_total()?, allocations),
        SplitMethod::Shares { allocations } => allocate_by_shares(require_total()?, allocations),
        SplitMethod::Custom { allocations } => allocate_custom(require_total()?, allocations),
        SplitMethod::ByItem { items, tax_and_tip } => {
            let result = allocate_by_item(items, *tax_and_tip)?;
            if let Some(expected) = total {
                let actual = result.total();
                if actual.abs_diff(expected) > Money::from_cents(1) {
                    return Err(SplitError::Mismatch { expected, actual });
                }
            }
            Ok(result)
        }
    }
}

/// Floor `total * w / sum(w)` per weight, then hand the leftover cents out
/// one at a time in input order, skipping zero weights.
///
/// Callers guarantee `total >= 0` and at least one non-zero weight. The
/// leftover is always smaller than the number of non-zero weights.
fn distribute(total: i64, weights: &[u64]) -> Vec<i64> {
    let weight_sum: u128 = weights.iter().map(|w| u128::from(*w)).sum();
    if weight_sum == 0 {
        return vec![0; weights.len()];
    }

    let total_wide = total as u128;
    let mut cents: Vec<i64> = weights
        .iter()
        .map(|w| (total_wide * u128::from(*w) / weight_sum) as i64)
        .collect();

    let allocated: i64 = cents.iter().sum();
    let remainder = (total - allocated) as usize;

    let eligible: Vec<usize> = (0..weights.len()).filter(|i| weights[*i] > 0).collect();
    for index in eligible.iter().cycle().take(remainder) {
        cents[*index] += 1;
    }

    cents
}

/// Bring floored amounts up or down to `total`.
///
/// Missing cents are spread evenly over the `eligible` members, with the odd
/// cents going one at a time in input order. Excess cents come off in
/// proportion to the current amounts, so nobody goes below zero.
fn reconcile(total: i64, cents: &mut [i64], eligible: &[bool]) {
    let allocated: i128 = cents.iter().map(|c| i128::from(*c)).sum();
    let drift = i128::from(total) - allocated;

    if drift > 0 {
        let weights: Vec<u64> = eligible.iter().map(|e| u64::from(*e)).collect();
        for (amount, extra) in cents.iter_mut().zip(distribute(drift as i64, &weights)) {
            *amount += extra;
        }
    } else if drift < 0 {
        let weights: Vec<u64> = cents.iter().map(|c| (*c).max(0) as u64).collect();
        for (amount, excess) in cents.iter_mut().zip(distribute((-drift) as i64, &weights)) {
            *amount -= excess;
        }
    }
}

fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Result<Money, SplitError> {
    amounts
        .into_iter()
        .try_fold(Money::ZERO, |sum, amount| sum.checked_add(amount))
        .ok_or_else(too_large)
}

fn too_large() -> SplitError {
    SplitError::InvalidInput("Amounts are too large to add up".to_string())
}

fn ensure_non_negative(amount: Money, what: &str) -> Result<(), SplitError> {
    if amount.is_negative() {
        return Err(SplitError::InvalidInput(format!("{} cannot be negative", what)));
    }
    Ok(())
}

fn ensure_participants<'a>(member_ids: impl Iterator<Item = &'a String>) -> Result<(), SplitError> {
    let mut seen = HashSet::new();
    for member_id in member_ids {
        if member_id.trim().is_empty() {
            return Err(SplitError::InvalidInput("Member id cannot be empty".to_string()));
        }
        if !seen.insert(member_id.as_str()) {
            return Err(SplitError::InvalidInput(format!("{} appears more than once", member_id)));
        }
    }
    if seen.is_empty() {
        return Err(SplitError::InvalidInput("At least one participant is required".to_string()));
    }
    Ok(())
}
