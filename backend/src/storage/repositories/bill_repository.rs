use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::errors::DeserializationError;
use crate::domain::models::bill::{Bill, BillShare, UnpaidShare};
use crate::domain::money::Money;
use crate::domain::split_allocator::SplitMethod;
use crate::storage::connection::DbConnection;
use crate::storage::traits::BillStorage;

/// Repository for bill and bill share operations
#[derive(Clone)]
pub struct BillRepository {
    db: DbConnection,
}

impl BillRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    async fn load_shares(&self, bill_id: &str) -> Result<Vec<BillShare>> {
        let rows = sqlx::query(
            r#"
            SELECT member_id, amount_cents, is_paid, paid_at
            FROM bill_shares
            WHERE bill_id = ?
            ORDER BY position ASC
            "#,
        )
        .bind(bill_id)
        .fetch_all(self.db.pool())
        .await?;

        let shares = rows
            .iter()
            .map(|row| BillShare {
                member_id: row.get("member_id"),
                amount: Money::from_cents(row.get("amount_cents")),
                is_paid: row.get("is_paid"),
                paid_at: row.get("paid_at"),
            })
            .collect();

        Ok(shares)
    }

    async fn with_shares(&self, mut bill: Bill) -> Result<Bill> {
        bill.shares = self.load_shares(&bill.id).await?;
        Ok(bill)
    }
}

/// Build a bill from its row. Shares are loaded separately.
fn bill_from_row(row: &SqliteRow) -> Result<Bill, DeserializationError> {
    let id: String = row.get("id");
    let split = decode_split(&id, row.get("split_method"), row.get("split_details"))?;

    Ok(Bill {
        household_id: row.get("household_id"),
        description: row.get("description"),
        payer_id: row.get("payer_id"),
        total: Money::from_cents(row.get("total_cents")),
        split,
        shares: Vec::new(),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        id,
    })
}

/// Decode the stored split inputs, checking them against the method column.
fn decode_split(bill_id: &str, method: &str, details: &str) -> Result<SplitMethod, DeserializationError> {
    let split: SplitMethod = serde_json::from_str(details)
        .map_err(|e| DeserializationError::new(format!("split details of {}", bill_id), e.to_string()))?;

    if split.kind() != method {
        return Err(DeserializationError::new(
            format!("split details of {}", bill_id),
            format!("stored as '{}' but details describe '{}'", method, split.kind()),
        ));
    }

    Ok(split)
}

/// Turn a user search term into a LIKE pattern, escaping wildcards.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl BillStorage for BillRepository {
    async fn store_bill(&self, bill: &Bill) -> Result<()> {
        let split_details = serde_json::to_string(&bill.split)?;
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO bills (id, household_id, description, payer_id, total_cents, split_method, split_details, created_by, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&bill.id)
        .bind(&bill.household_id)
        .bind(&bill.description)
        .bind(&bill.payer_id)
        .bind(bill.total.cents())
        .bind(bill.split.kind())
        .bind(&split_details)
        .bind(&bill.created_by)
        .bind(&bill.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, share) in bill.shares.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO bill_shares (bill_id, member_id, position, amount_cents, is_paid, paid_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&bill.id)
            .bind(&share.member_id)
            .bind(position as i64)
            .bind(share.amount.cents())
            .bind(share.is_paid)
            .bind(&share.paid_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_bill(&self, household_id: &str, bill_id: &str) -> Result<Option<Bill>> {
        let row = sqlx::query(
            r#"
            SELECT id, household_id, description, payer_id, total_cents, split_method, split_details, created_by, created_at
            FROM bills
            WHERE household_id = ? AND id = ?
            "#,
        )
        .bind(household_id)
        .bind(bill_id)
        .fetch_optional(self.db.pool())
        .await?;

        let bill = match row {
            Some(r) => bill_from_row(&r)?,
            None => return Ok(None),
        };

        Ok(Some(self.with_shares(bill).await?))
    }

    async fn list_bills(
        &self,
        household_id: &str,
        search: Option<&str>,
        limit: u32,
        after_id: Option<&str>,
    ) -> Result<Vec<Bill>> {
        let pattern = search.map(like_pattern);

        let rows = sqlx::query(
            r#"
            SELECT id, household_id, description, payer_id, total_cents, split_method, split_details, created_by, created_at
            FROM bills
            WHERE household_id = ?
              AND (? IS NULL OR description LIKE ? ESCAPE '\')
              AND (? IS NULL OR ROWID < (SELECT ROWID FROM bills WHERE id = ?))
            ORDER BY ROWID DESC
            LIMIT ?
            "#,
        )
        .bind(household_id)
        .bind(pattern.as_deref())
        .bind(pattern.as_deref())
        .bind(after_id)
        .bind(after_id)
        .bind(limit as i64)
        .fetch_all(self.db.pool())
        .await?;

        let headers = rows.iter().map(bill_from_row).collect::<Result<Vec<_>, _>>()?;

        let mut bills = Vec::with_capacity(headers.len());
        for bill in headers {
            bills.push(self.with_shares(bill).await?);
        }

        Ok(bills)
    }

    async fn mark_share_paid(&self, bill_id: &str, member_id: &str, paid_at: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE bill_shares
            SET is_paid = TRUE, paid_at = ?
            WHERE bill_id = ? AND member_id = ? AND is_paid = FALSE
            "#,
        )
        .bind(paid_at)
        .bind(bill_id)
        .bind(member_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_unpaid_shares(&self, household_id: &str) -> Result<Vec<UnpaidShare>> {
        let rows = sqlx::query(
            r#"
            SELECT s.bill_id, b.payer_id, s.member_id, s.amount_cents
            FROM bill_shares s
            JOIN bills b ON b.id = s.bill_id
            WHERE b.household_id = ? AND s.is_paid = FALSE
            ORDER BY b.ROWID ASC, s.position ASC
            "#,
        )
        .bind(household_id)
        .fetch_all(self.db.pool())
        .await?;

        let shares = rows
            .iter()
            .map(|row| UnpaidShare {
                bill_id: row.get("bill_id"),
                payer_id: row.get("payer_id"),
                member_id: row.get("member_id"),
                amount: Money::from_cents(row.get("amount_cents")),
            })
            .collect();

        Ok(shares)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test() -> BillRepository {
        let db = DbConnection::in_memory().await.expect("Failed to create test database");
        BillRepository::new(db)
    }

    fn make_bill(id: &str, household_id: &str, description: &str) -> Bill {
        Bill {
            id: id.to_string(),
            household_id: household_id.to_string(),
            description: description.to_string(),
            payer_id: "ana".to_string(),
            total: Money::from_cents(1000),
            split: SplitMethod::Equal { member_ids: vec!["ana".to_string(), "ben".to_string()] },
            shares: vec![
                BillShare {
                    member_id: "ana".to_string(),
                    amount: Money::from_cents(500),
                    is_paid: true,
                    paid_at: Some("2025-06-12T20:00:00+00:00".to_string()),
                },
                BillShare {
                    member_id: "ben".to_string(),
                    amount: Money::from_cents(500),
                    is_paid: false,
                    paid_at: None,
                },
            ],
            created_by: "ana".to_string(),
            created_at: "2025-06-12T20:00:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_and_get_bill() {
        let repo = setup_test().await;
        let bill = make_bill("bill::1", "home", "Groceries");

        repo.store_bill(&bill).await.expect("Failed to store bill");
        let loaded = repo.get_bill("home", "bill::1").await.expect("Failed to get bill");

        assert_eq!(loaded, Some(bill));
    }

    #[tokio::test]
    async fn test_get_bill_is_scoped_to_household() {
        let repo = setup_test().await;
        repo.store_bill(&make_bill("bill::1", "home", "Groceries")).await.unwrap();

        let loaded = repo.get_bill("other-home", "bill::1").await.unwrap();

        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_list_bills_newest_first_with_cursor() {
        let repo = setup_test().await;
        for i in 1..=4 {
            repo.store_bill(&make_bill(&format!("bill::{}", i), "home", &format!("Bill {}", i)))
                .await
                .unwrap();
        }

        let first_page = repo.list_bills("home", None, 2, None).await.unwrap();
        let ids: Vec<&str> = first_page.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["bill::4", "bill::3"]);

        let second_page = repo.list_bills("home", None, 2, Some("bill::3")).await.unwrap();
        let ids: Vec<&str> = second_page.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["bill::2", "bill::1"]);
    }

    #[tokio::test]
    async fn test_list_bills_search_is_case_insensitive_and_literal() {
        let repo = setup_test().await;
        repo.store_bill(&make_bill("bill::1", "home", "Weekly groceries")).await.unwrap();
        repo.store_bill(&make_bill("bill::2", "home", "Electricity")).await.unwrap();
        repo.store_bill(&make_bill("bill::3", "home", "100% juice")).await.unwrap();

        let found = repo.list_bills("home", Some("GROCER"), 10, None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "bill::1");

        let percent = repo.list_bills("home", Some("0%"), 10, None).await.unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].id, "bill::3");
    }

    #[tokio::test]
    async fn test_mark_share_paid_only_once() {
        let repo = setup_test().await;
        repo.store_bill(&make_bill("bill::1", "home", "Groceries")).await.unwrap();

        let updated = repo.mark_share_paid("bill::1", "ben", "2025-06-13T08:00:00+00:00").await.unwrap();
        assert!(updated);

        let again = repo.mark_share_paid("bill::1", "ben", "2025-06-13T09:00:00+00:00").await.unwrap();
        assert!(!again);

        let bill = repo.get_bill("home", "bill::1").await.unwrap().unwrap();
        let share = bill.share_for("ben").unwrap();
        assert!(share.is_paid);
        assert_eq!(share.paid_at.as_deref(), Some("2025-06-13T08:00:00+00:00"));
    }

    #[tokio::test]
    async fn test_list_unpaid_shares_joins_payer() {
        let repo = setup_test().await;
        repo.store_bill(&make_bill("bill::1", "home", "Groceries")).await.unwrap();
        repo.store_bill(&make_bill("bill::2", "elsewhere", "Rent")).await.unwrap();

        let unpaid = repo.list_unpaid_shares("home").await.unwrap();

        assert_eq!(
            unpaid,
            vec![UnpaidShare {
                bill_id: "bill::1".to_string(),
                payer_id: "ana".to_string(),
                member_id: "ben".to_string(),
                amount: Money::from_cents(500),
            }]
        );
    }

    #[tokio::test]
    async fn test_corrupt_split_details_are_reported() {
        let repo = setup_test().await;
        let mut bill = make_bill("bill::1", "home", "Groceries");
        bill.shares.clear();
        repo.store_bill(&bill).await.unwrap();

        sqlx::query("UPDATE bills SET split_method = 'shares' WHERE id = 'bill::1'")
            .execute(repo.db.pool())
            .await
            .unwrap();

        let error = repo.get_bill("home", "bill::1").await.unwrap_err();
        assert!(error.downcast_ref::<DeserializationError>().is_some());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
