//! Random round-robin chore assignment.
//!
//! Members are shuffled once, then tasks are dealt out in order like cards,
//! so no member gets more than one task above anyone else.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskAssignmentError {
    #[error("At least one member is required to assign tasks")]
    NoMembers,
    #[error("Ids cannot be empty")]
    EmptyId,
    #[error("{0} appears more than once")]
    Duplicate(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskAssignment {
    pub task_id: String,
    pub member_id: String,
}

pub fn assign_round_robin<R: Rng + ?Sized>(
    task_ids: &[String],
    member_ids: &[String],
    rng: &mut R,
) -> Result<Vec<TaskAssignment>, TaskAssignmentError> {
    if member_ids.is_empty() {
        return Err(TaskAssignmentError::NoMembers);
    }
    ensure_unique(member_ids)?;
    ensure_unique(task_ids)?;

    let mut order: Vec<&String> = member_ids.iter().collect();
    order.shuffle(rng);

    Ok(task_ids
        .iter()
        .zip(order.iter().cycle())
        .map(|(task_id, member_id)| TaskAssignment {
            task_id: task_id.clone(),
            member_id: (*member_id).clone(),
        })
        .collect())
}

fn ensure_unique(ids: &[String]) -> Result<(), TaskAssignmentError> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(TaskAssignmentError::EmptyId);
        }
        if !seen.insert(id.as_str()) {
            return Err(TaskAssignmentError::Duplicate(id.clone()));
        }
    }
    Ok(())
}
