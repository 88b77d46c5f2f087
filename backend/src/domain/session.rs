//! Identity of the caller.
//!
//! Passed explicitly to every service call that needs to know who is acting
//! and on which household.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: String,
    pub household_id: String,
}

impl SessionContext {
    /// Build a context, rejecting blank identifiers.
    pub fn new(user_id: impl Into<String>, household_id: impl Into<String>) -> Option<Self> {
        let user_id = user_id.into().trim().to_string();
        let household_id = household_id.into().trim().to_string();
        if user_id.is_empty() || household_id.is_empty() {
            return None;
        }
        Some(Self { user_id, household_id })
    }
}
