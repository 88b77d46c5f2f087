//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer is responsible for mapping the
//! public DTOs defined in the `shared` crate to these internal types.

pub mod splits {
    use crate::domain::money::Money;
    use crate::domain::split_allocator::SplitMethod;

    /// Input for computing a split without saving anything.
    #[derive(Debug, Clone)]
    pub struct PreviewSplitCommand {
        pub total: Option<Money>,
        pub split: SplitMethod,
    }
}

pub mod bills {
    use crate::domain::models::bill::Bill;
    use crate::domain::money::Money;
    use crate::domain::split_allocator::SplitMethod;

    /// Input for creating and saving a bill.
    #[derive(Debug, Clone)]
    pub struct CreateBillCommand {
        pub description: String,
        pub payer_id: Option<String>,
        pub total: Option<Money>,
        pub split: SplitMethod,
    }

    /// Result of creating a bill.
    #[derive(Debug, Clone)]
    pub struct CreateBillResult {
        pub bill: Bill,
        pub success_message: String,
    }

    /// Query parameters for listing bills.
    #[derive(Debug, Clone, Default)]
    pub struct BillListQuery {
        pub search: Option<String>,
        pub limit: Option<u32>,
        pub after: Option<String>,
    }

    /// Generic pagination info returned by list queries.
    #[derive(Debug, Clone)]
    pub struct PaginationInfo {
        pub has_more: bool,
        pub next_cursor: Option<String>,
    }

    /// Result of listing bills.
    #[derive(Debug, Clone)]
    pub struct BillListResult {
        pub bills: Vec<Bill>,
        pub pagination: PaginationInfo,
    }

    /// Command for marking one member's share as paid.
    #[derive(Debug, Clone)]
    pub struct SettleShareCommand {
        pub bill_id: String,
        pub member_id: String,
    }

    /// Result of settling a share.
    #[derive(Debug, Clone)]
    pub struct SettleShareResult {
        pub bill: Bill,
        pub success_message: String,
    }
}

pub mod balances {
    use crate::domain::money::Money;

    /// Outstanding money for one member. Amounts are non-negative; `net` is
    /// signed.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct MemberBalance {
        pub member_id: String,
        pub owes: Money,
        pub owed: Money,
        pub net: Money,
    }

    #[derive(Debug, Clone)]
    pub struct HouseholdBalancesResult {
        pub balances: Vec<MemberBalance>,
    }
}
