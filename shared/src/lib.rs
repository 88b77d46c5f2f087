use serde::{Deserialize, Serialize};

/// How a bill total is divided among household members.
///
/// Serialized as a tagged object, e.g.
/// `{"method": "shares", "allocations": [{"member_id": "ana", "shares": 2}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SplitMethod {
    /// Everyone pays the same amount
    Equal { member_ids: Vec<String> },
    /// Each member pays a percentage of the total (must add up to 100)
    Percentage { allocations: Vec<MemberPercentage> },
    /// Each member pays in proportion to a share count
    Shares { allocations: Vec<MemberShares> },
    /// Each member pays a fixed amount (must add up to the total)
    Custom { allocations: Vec<MemberAmount> },
    /// Members pay for the items they were party to, plus a proportional cut of tax and tip
    ByItem {
        items: Vec<BillItem>,
        #[serde(default)]
        tax_and_tip: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberPercentage {
    pub member_id: String,
    /// Percentage in the range 0..=100
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberShares {
    pub member_id: String,
    pub shares: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberAmount {
    pub member_id: String,
    pub amount: f64,
}

/// A single line on an itemized bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    /// Members who share this item
    pub member_ids: Vec<String>,
}

/// One member's part of a split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareAmount {
    pub member_id: String,
    pub amount: f64,
    /// Amount formatted for display, e.g. "$3.34"
    pub formatted_amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitPreviewRequest {
    /// Bill total; optional for itemized splits where it is derived from the items
    #[serde(default)]
    pub total: Option<f64>,
    pub split: SplitMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitPreviewResponse {
    pub total: f64,
    pub shares: Vec<ShareAmount>,
}

/// A member's part of a saved bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillShare {
    pub member_id: String,
    pub amount: f64,
    pub is_paid: bool,
    /// RFC 3339 timestamp of settlement
    pub paid_at: Option<String>,
}

/// Bill ID in format: "bill::<uuid>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: String,
    pub household_id: String,
    /// Description of the bill (max 256 characters by default)
    pub description: String,
    /// Member who paid the bill up front
    pub payer_id: String,
    pub total: f64,
    pub split: SplitMethod,
    pub shares: Vec<BillShare>,
    pub created_by: String,
    /// RFC 3339 timestamp
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBillRequest {
    pub description: String,
    /// Defaults to the requesting user
    #[serde(default)]
    pub payer_id: Option<String>,
    #[serde(default)]
    pub total: Option<f64>,
    pub split: SplitMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBillResponse {
    pub bill: Bill,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BillListRequest {
    /// Case-insensitive substring match on the description
    pub search: Option<String>,
    /// Maximum number of bills to return
    pub limit: Option<u32>,
    /// Cursor for pagination - bill ID to start after
    pub after: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillListResponse {
    pub bills: Vec<Bill>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettleShareResponse {
    pub bill: Bill,
    pub success_message: String,
}

/// Outstanding money for one household member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub member_id: String,
    /// Unpaid shares on bills someone else paid
    pub owes: f64,
    /// Unpaid shares of others on bills this member paid
    pub owed: f64,
    /// owed - owes
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdBalancesResponse {
    pub balances: Vec<MemberBalance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignTasksRequest {
    pub task_ids: Vec<String>,
    pub member_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub task_id: String,
    pub member_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignTasksResponse {
    pub assignments: Vec<TaskAssignment>,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error category, e.g. "validation" or "not_found"
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_method_tagged_json() {
        let json = r#"{"method":"shares","allocations":[{"member_id":"ana","shares":2}]}"#;
        let method: SplitMethod = serde_json::from_str(json).unwrap();

        assert_eq!(
            method,
            SplitMethod::Shares {
                allocations: vec![MemberShares { member_id: "ana".to_string(), shares: 2 }],
            }
        );
    }

    #[test]
    fn test_by_item_tax_defaults_to_zero() {
        let json = r#"{"method":"by_item","items":[{"amount":12.5,"member_ids":["ana","ben"]}]}"#;
        let method: SplitMethod = serde_json::from_str(json).unwrap();

        match method {
            SplitMethod::ByItem { items, tax_and_tip } => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].description, None);
                assert_eq!(tax_and_tip, 0.0);
            }
            other => panic!("unexpected split method: {:?}", other),
        }
    }

    #[test]
    fn test_create_bill_request_optional_fields() {
        let json = r#"{"description":"Groceries","split":{"method":"equal","member_ids":["ana"]}}"#;
        let request: CreateBillRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.payer_id, None);
        assert_eq!(request.total, None);
        assert_eq!(request.description, "Groceries");
    }
}
