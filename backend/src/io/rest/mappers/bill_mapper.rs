//! Mappers for converting bill and balance domain models into shared DTOs.

use crate::domain::commands::balances::MemberBalance as DomainMemberBalance;
use crate::domain::models::bill::{Bill as DomainBill, BillShare as DomainBillShare};
use crate::io::rest::mappers::split_mapper::SplitMapper;
use shared::{Bill as SharedBill, BillShare as SharedBillShare, MemberBalance as SharedMemberBalance};

pub struct BillMapper;

impl BillMapper {
    pub fn to_dto(domain: DomainBill) -> SharedBill {
        SharedBill {
            split: SplitMapper::to_dto(&domain.split),
            id: domain.id,
            household_id: domain.household_id,
            description: domain.description,
            payer_id: domain.payer_id,
            total: domain.total.to_major(),
            shares: domain.shares.into_iter().map(Self::share_to_dto).collect(),
            created_by: domain.created_by,
            created_at: domain.created_at,
        }
    }

    fn share_to_dto(domain: DomainBillShare) -> SharedBillShare {
        SharedBillShare {
            member_id: domain.member_id,
            amount: domain.amount.to_major(),
            is_paid: domain.is_paid,
            paid_at: domain.paid_at,
        }
    }

    pub fn balance_to_dto(domain: DomainMemberBalance) -> SharedMemberBalance {
        SharedMemberBalance {
            member_id: domain.member_id,
            owes: domain.owes.to_major(),
            owed: domain.owed.to_major(),
            net: domain.net.to_major(),
        }
    }
}
