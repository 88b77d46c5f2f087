use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::BillSettings;
use crate::domain::commands::bills::{
    BillListQuery, BillListResult, CreateBillCommand, CreateBillResult, PaginationInfo,
    SettleShareCommand, SettleShareResult,
};
use crate::domain::commands::splits::PreviewSplitCommand;
use crate::domain::errors::BillError;
use crate::domain::models::bill::{Bill, BillShare};
use crate::domain::money::Money;
use crate::domain::session::SessionContext;
use crate::domain::split_allocator::{self, SplitResult};
use crate::storage::BillStorage;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

/// Service for computing splits and managing saved bills
#[derive(Clone)]
pub struct BillService {
    storage: Arc<dyn BillStorage>,
    settings: BillSettings,
}

impl BillService {
    pub fn new(storage: Arc<dyn BillStorage>, settings: BillSettings) -> Self {
        Self { storage, settings }
    }

    pub fn settings(&self) -> &BillSettings {
        &self.settings
    }

    /// Compute a split without saving it. Called on every edit in the bill form.
    pub fn preview_split(&self, command: PreviewSplitCommand) -> Result<SplitResult> {
        let result = split_allocator::allocate(command.total, &command.split)?;
        self.ensure_within_limit(command.total.unwrap_or_else(|| result.total()))?;
        Ok(result)
    }

    /// Validate, allocate and persist a bill.
    pub async fn create_bill(&self, ctx: &SessionContext, command: CreateBillCommand) -> Result<CreateBillResult> {
        info!(
            "Creating {} bill in household {} for user {}",
            command.split.kind(),
            ctx.household_id,
            ctx.user_id
        );

        let description = self.validate_description(&command.description)?;
        let payer_id = command
            .payer_id
            .as_deref()
            .unwrap_or(&ctx.user_id)
            .trim()
            .to_string();
        if payer_id.is_empty() {
            return Err(BillError::EmptyPayer.into());
        }

        let split = split_allocator::allocate(command.total, &command.split).map_err(BillError::from)?;
        let total = command.total.unwrap_or_else(|| split.total());
        self.ensure_within_limit(total)?;

        let created_at = Utc::now().to_rfc3339();
        let shares = split
            .into_shares()
            .into_iter()
            .map(|share| {
                // The payer has already covered their own part
                let is_paid = share.member_id == payer_id;
                BillShare {
                    paid_at: is_paid.then(|| created_at.clone()),
                    member_id: share.member_id,
                    amount: share.amount,
                    is_paid,
                }
            })
            .collect::<Vec<_>>();

        let bill = Bill {
            id: Bill::generate_id(),
            household_id: ctx.household_id.clone(),
            description,
            payer_id,
            total,
            split: command.split,
            shares,
            created_by: ctx.user_id.clone(),
            created_at,
        };

        self.storage.store_bill(&bill).await?;

        let success_message = format!(
            "Bill '{}' saved: {} split {} ways",
            bill.description,
            bill.total.format_with_symbol(&self.settings.currency_symbol),
            bill.shares.len()
        );
        info!("Created bill {} ({})", bill.id, success_message);

        Ok(CreateBillResult { bill, success_message })
    }

    pub async fn get_bill(&self, ctx: &SessionContext, bill_id: &str) -> Result<Bill> {
        info!("Getting bill {} in household {}", bill_id, ctx.household_id);

        match self.storage.get_bill(&ctx.household_id, bill_id).await? {
            Some(bill) => Ok(bill),
            None => {
                warn!("Bill {} not found in household {}", bill_id, ctx.household_id);
                Err(BillError::NotFound(bill_id.to_string()).into())
            }
        }
    }

    /// List bills newest first with cursor pagination and optional search
    pub async fn list_bills(&self, ctx: &SessionContext, query: BillListQuery) -> Result<BillListResult> {
        info!("Listing bills in household {} with query: {:?}", ctx.household_id, query);

        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty());

        // Query one extra record to determine if there are more results
        let mut bills = self
            .storage
            .list_bills(&ctx.household_id, search, limit + 1, query.after.as_deref())
            .await?;

        let has_more = bills.len() > limit as usize;
        if has_more {
            bills.truncate(limit as usize);
        }
        let next_cursor = if has_more {
            bills.last().map(|bill| bill.id.clone())
        } else {
            None
        };

        info!("Returning {} bills, has_more: {}", bills.len(), has_more);
        Ok(BillListResult {
            bills,
            pagination: PaginationInfo { has_more, next_cursor },
        })
    }

    /// Mark one member's share as paid. Allowed for that member or the payer.
    pub async fn settle_share(&self, ctx: &SessionContext, command: SettleShareCommand) -> Result<SettleShareResult> {
        info!(
            "User {} settling share of {} on bill {}",
            ctx.user_id, command.member_id, command.bill_id
        );

        let bill = self.get_bill(ctx, &command.bill_id).await?;
        let share = bill
            .share_for(&command.member_id)
            .ok_or_else(|| BillError::ShareNotFound {
                bill_id: command.bill_id.clone(),
                member_id: command.member_id.clone(),
            })?;

        if ctx.user_id != command.member_id && ctx.user_id != bill.payer_id {
            warn!("User {} may not settle share of {}", ctx.user_id, command.member_id);
            return Err(BillError::Forbidden.into());
        }
        if share.is_paid {
            return Err(BillError::AlreadySettled(command.member_id).into());
        }

        let amount = share.amount;
        let paid_at = Utc::now().to_rfc3339();
        let updated = self
            .storage
            .mark_share_paid(&bill.id, &command.member_id, &paid_at)
            .await?;
        if !updated {
            return Err(BillError::AlreadySettled(command.member_id).into());
        }

        let bill = self.get_bill(ctx, &command.bill_id).await?;
        let success_message = format!(
            "{} settled {} for '{}'",
            command.member_id,
            amount.format_with_symbol(&self.settings.currency_symbol),
            bill.description
        );

        Ok(SettleShareResult { bill, success_message })
    }

    fn validate_description(&self, description: &str) -> Result<String, BillError> {
        let trimmed = description.trim();
        if trimmed.is_empty() {
            return Err(BillError::EmptyDescription);
        }
        let length = trimmed.chars().count();
        if length > self.settings.max_description_length {
            return Err(BillError::DescriptionTooLong(length, self.settings.max_description_length));
        }
        Ok(trimmed.to_string())
    }

    fn ensure_within_limit(&self, total: Money) -> Result<(), BillError> {
        if total > self.settings.max_bill_amount {
            return Err(BillError::AmountTooLarge(self.settings.max_bill_amount));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::SplitError;
    use crate::domain::split_allocator::{FixedAllocation, SplitItem, SplitMethod};
    use crate::storage::{BillRepository, DbConnection};

    async fn create_test_service() -> BillService {
        let db = DbConnection::in_memory().await.expect("Failed to create test database");
        BillService::new(Arc::new(BillRepository::new(db)), BillSettings::default())
    }

    fn ctx(user_id: &str) -> SessionContext {
        SessionContext::new(user_id, "home").unwrap()
    }

    fn equal_split(ids: &[&str]) -> SplitMethod {
        SplitMethod::Equal { member_ids: ids.iter().map(|id| id.to_string()).collect() }
    }

    fn create_command(description: &str, total: i64, ids: &[&str]) -> CreateBillCommand {
        CreateBillCommand {
            description: description.to_string(),
            payer_id: None,
            total: Some(Money::from_cents(total)),
            split: equal_split(ids),
        }
    }

    #[tokio::test]
    async fn test_preview_split_does_not_need_storage_state() {
        let service = create_test_service().await;

        let result = service
            .preview_split(PreviewSplitCommand {
                total: Some(Money::from_cents(1000)),
                split: equal_split(&["ana", "ben", "cy"]),
            })
            .unwrap();

        assert_eq!(result.total(), Money::from_cents(1000));
        assert_eq!(result.amount_for("ana"), Some(Money::from_cents(334)));
    }

    #[tokio::test]
    async fn test_preview_split_reports_split_errors() {
        let service = create_test_service().await;

        let error = service
            .preview_split(PreviewSplitCommand { total: None, split: equal_split(&["ana"]) })
            .unwrap_err();

        assert!(matches!(error.downcast_ref::<SplitError>(), Some(SplitError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_create_bill_marks_payer_share_paid() {
        let service = create_test_service().await;

        let result = service
            .create_bill(&ctx("ana"), create_command("  Groceries ", 1000, &["ana", "ben", "cy"]))
            .await
            .unwrap();

        let bill = result.bill;
        assert_eq!(bill.description, "Groceries");
        assert_eq!(bill.payer_id, "ana");
        assert_eq!(bill.created_by, "ana");
        assert_eq!(bill.total, Money::from_cents(1000));
        assert!(bill.share_for("ana").unwrap().is_paid);
        assert!(bill.share_for("ana").unwrap().paid_at.is_some());
        assert!(!bill.share_for("ben").unwrap().is_paid);
        assert_eq!(bill.outstanding(), Money::from_cents(666));
        assert_eq!(result.success_message, "Bill 'Groceries' saved: $10.00 split 3 ways");

        let stored = service.get_bill(&ctx("ben"), &bill.id).await.unwrap();
        assert_eq!(stored, bill);
    }

    #[tokio::test]
    async fn test_create_bill_with_explicit_payer() {
        let service = create_test_service().await;
        let mut command = create_command("Rent", 120000, &["ana", "ben"]);
        command.payer_id = Some("ben".to_string());

        let bill = service.create_bill(&ctx("ana"), command).await.unwrap().bill;

        assert_eq!(bill.payer_id, "ben");
        assert_eq!(bill.created_by, "ana");
        assert!(bill.share_for("ben").unwrap().is_paid);
        assert!(!bill.share_for("ana").unwrap().is_paid);
    }

    #[tokio::test]
    async fn test_create_bill_by_item_derives_total() {
        let service = create_test_service().await;
        let command = CreateBillCommand {
            description: "Dinner".to_string(),
            payer_id: None,
            total: None,
            split: SplitMethod::ByItem {
                items: vec![
                    SplitItem { description: Some("Pasta".to_string()), amount: Money::from_cents(3000), member_ids: vec!["A".to_string(), "B".to_string()] },
                    SplitItem { description: Some("Wine".to_string()), amount: Money::from_cents(2000), member_ids: vec!["B".to_string(), "C".to_string()] },
                ],
                tax_and_tip: Money::from_cents(500),
            },
        };

        let bill = service.create_bill(&ctx("A"), command).await.unwrap().bill;

        assert_eq!(bill.total, Money::from_cents(5500));
        assert_eq!(bill.share_for("B").unwrap().amount, Money::from_cents(2750));
    }

    #[tokio::test]
    async fn test_create_bill_validation() {
        let service = create_test_service().await;

        let error = service.create_bill(&ctx("ana"), create_command("   ", 1000, &["ana"])).await.unwrap_err();
        assert!(matches!(error.downcast_ref::<BillError>(), Some(BillError::EmptyDescription)));

        let long = "x".repeat(257);
        let error = service.create_bill(&ctx("ana"), create_command(&long, 1000, &["ana"])).await.unwrap_err();
        assert!(matches!(error.downcast_ref::<BillError>(), Some(BillError::DescriptionTooLong(257, 256))));

        let error = service
            .create_bill(&ctx("ana"), create_command("Yacht", 100_000_001, &["ana"]))
            .await
            .unwrap_err();
        assert!(matches!(error.downcast_ref::<BillError>(), Some(BillError::AmountTooLarge(_))));

        let command = CreateBillCommand {
            description: "Utilities".to_string(),
            payer_id: None,
            total: Some(Money::from_cents(1000)),
            split: SplitMethod::Custom {
                allocations: vec![FixedAllocation { member_id: "ana".to_string(), amount: Money::from_cents(900) }],
            },
        };
        let error = service.create_bill(&ctx("ana"), command).await.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<BillError>(),
            Some(BillError::Split(SplitError::Mismatch { .. }))
        ));
    }

    #[tokio::test]
    async fn test_get_bill_from_other_household_is_not_found() {
        let service = create_test_service().await;
        let bill = service.create_bill(&ctx("ana"), create_command("Groceries", 1000, &["ana", "ben"])).await.unwrap().bill;

        let outsider = SessionContext::new("zed", "other-home").unwrap();
        let error = service.get_bill(&outsider, &bill.id).await.unwrap_err();

        assert!(matches!(error.downcast_ref::<BillError>(), Some(BillError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_bills_pagination_and_search() {
        let service = create_test_service().await;
        for i in 1..=5 {
            service
                .create_bill(&ctx("ana"), create_command(&format!("Groceries week {}", i), 1000, &["ana", "ben"]))
                .await
                .unwrap();
        }
        service.create_bill(&ctx("ana"), create_command("Internet", 5000, &["ana", "ben"])).await.unwrap();

        let first = service
            .list_bills(&ctx("ana"), BillListQuery { search: Some("groceries".to_string()), limit: Some(3), after: None })
            .await
            .unwrap();
        assert_eq!(first.bills.len(), 3);
        assert!(first.pagination.has_more);
        assert_eq!(first.bills[0].description, "Groceries week 5");

        let second = service
            .list_bills(
                &ctx("ana"),
                BillListQuery { search: Some("groceries".to_string()), limit: Some(3), after: first.pagination.next_cursor },
            )
            .await
            .unwrap();
        assert_eq!(second.bills.len(), 2);
        assert!(!second.pagination.has_more);
        assert!(second.pagination.next_cursor.is_none());

        let everything = service.list_bills(&ctx("ana"), BillListQuery::default()).await.unwrap();
        assert_eq!(everything.bills.len(), 6);
        assert_eq!(everything.bills[0].description, "Internet");
    }

    #[tokio::test]
    async fn test_settle_share_rules() {
        let service = create_test_service().await;
        let bill = service
            .create_bill(&ctx("ana"), create_command("Groceries", 900, &["ana", "ben", "cy"]))
            .await
            .unwrap()
            .bill;

        // Someone else's share cannot be settled by a third member
        let error = service
            .settle_share(&ctx("cy"), SettleShareCommand { bill_id: bill.id.clone(), member_id: "ben".to_string() })
            .await
            .unwrap_err();
        assert!(matches!(error.downcast_ref::<BillError>(), Some(BillError::Forbidden)));

        // The member settles their own share
        let result = service
            .settle_share(&ctx("ben"), SettleShareCommand { bill_id: bill.id.clone(), member_id: "ben".to_string() })
            .await
            .unwrap();
        assert!(result.bill.share_for("ben").unwrap().is_paid);
        assert_eq!(result.success_message, "ben settled $3.00 for 'Groceries'");

        // The payer settles on behalf of a member
        service
            .settle_share(&ctx("ana"), SettleShareCommand { bill_id: bill.id.clone(), member_id: "cy".to_string() })
            .await
            .unwrap();

        let error = service
            .settle_share(&ctx("ben"), SettleShareCommand { bill_id: bill.id.clone(), member_id: "ben".to_string() })
            .await
            .unwrap_err();
        assert!(matches!(error.downcast_ref::<BillError>(), Some(BillError::AlreadySettled(_))));

        let error = service
            .settle_share(&ctx("ana"), SettleShareCommand { bill_id: bill.id.clone(), member_id: "dee".to_string() })
            .await
            .unwrap_err();
        assert!(matches!(error.downcast_ref::<BillError>(), Some(BillError::ShareNotFound { .. })));
    }
}
