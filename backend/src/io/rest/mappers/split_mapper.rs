//! Mappers between split DTOs (decimal amounts) and the domain split types
//! (cents). Amount conversion failures surface as invalid input.

use crate::domain::errors::SplitError;
use crate::domain::money::Money;
use crate::domain::split_allocator::{
    FixedAllocation, PercentageAllocation, ShareAllocation, SplitItem, SplitMethod, SplitResult,
};
use shared::{
    BillItem, MemberAmount, MemberPercentage, MemberShares, ShareAmount,
    SplitMethod as SharedSplitMethod,
};

pub struct SplitMapper;

impl SplitMapper {
    /// Convert a decimal amount from a request, naming the field on failure
    pub fn money_from_dto(value: f64, what: &str) -> Result<Money, SplitError> {
        Money::try_from_major(value).map_err(|e| SplitError::InvalidInput(format!("{}: {}", what, e)))
    }

    pub fn to_domain(dto: SharedSplitMethod) -> Result<SplitMethod, SplitError> {
        let method = match dto {
            SharedSplitMethod::Equal { member_ids } => SplitMethod::Equal { member_ids },
            SharedSplitMethod::Percentage { allocations } => SplitMethod::Percentage {
                allocations: allocations
                    .into_iter()
                    .map(|a| PercentageAllocation {
                        member_id: a.member_id,
                        percentage: a.percentage,
                    })
                    .collect(),
            },
            SharedSplitMethod::Shares { allocations } => SplitMethod::Shares {
                allocations: allocations
                    .into_iter()
                    .map(|a| ShareAllocation {
                        member_id: a.member_id,
                        shares: a.shares,
                    })
                    .collect(),
            },
            SharedSplitMethod::Custom { allocations } => SplitMethod::Custom {
                allocations: allocations
                    .into_iter()
                    .map(|a| {
                        let amount = Self::money_from_dto(a.amount, &format!("Amount for {}", a.member_id))?;
                        Ok(FixedAllocation { member_id: a.member_id, amount })
                    })
                    .collect::<Result<_, SplitError>>()?,
            },
            SharedSplitMethod::ByItem { items, tax_and_tip } => SplitMethod::ByItem {
                items: items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| {
                        let label = item
                            .description
                            .clone()
                            .unwrap_or_else(|| format!("item {}", index + 1));
                        Ok(SplitItem {
                            amount: Self::money_from_dto(item.amount, &format!("Amount for {}", label))?,
                            description: item.description,
                            member_ids: item.member_ids,
                        })
                    })
                    .collect::<Result<_, SplitError>>()?,
                tax_and_tip: Self::money_from_dto(tax_and_tip, "Tax and tip")?,
            },
        };
        Ok(method)
    }

    pub fn to_dto(domain: &SplitMethod) -> SharedSplitMethod {
        match domain {
            SplitMethod::Equal { member_ids } => SharedSplitMethod::Equal {
                member_ids: member_ids.clone(),
            },
            SplitMethod::Percentage { allocations } => SharedSplitMethod::Percentage {
                allocations: allocations
                    .iter()
                    .map(|a| MemberPercentage {
                        member_id: a.member_id.clone(),
                        percentage: a.percentage,
                    })
                    .collect(),
            },
            SplitMethod::Shares { allocations } => SharedSplitMethod::Shares {
                allocations: allocations
                    .iter()
                    .map(|a| MemberShares {
                        member_id: a.member_id.clone(),
                        shares: a.shares,
                    })
                    .collect(),
            },
            SplitMethod::Custom { allocations } => SharedSplitMethod::Custom {
                allocations: allocations
                    .iter()
                    .map(|a| MemberAmount {
                        member_id: a.member_id.clone(),
                        amount: a.amount.to_major(),
                    })
                    .collect(),
            },
            SplitMethod::ByItem { items, tax_and_tip } => SharedSplitMethod::ByItem {
                items: items
                    .iter()
                    .map(|item| BillItem {
                        description: item.description.clone(),
                        amount: item.amount.to_major(),
                        member_ids: item.member_ids.clone(),
                    })
                    .collect(),
                tax_and_tip: tax_and_tip.to_major(),
            },
        }
    }

    pub fn to_share_amounts(result: &SplitResult, currency_symbol: &str) -> Vec<ShareAmount> {
        result
            .shares()
            .iter()
            .map(|share| ShareAmount {
                member_id: share.member_id.clone(),
                amount: share.amount.to_major(),
                formatted_amount: share.amount.format_with_symbol(currency_symbol),
            })
            .collect()
    }
}
