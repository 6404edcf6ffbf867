//! Error taxonomy of the work plan service
//!
//! Every failure is returned as a typed [`WorkPlanError`]; the service never
//! retries or recovers on its own. The request layer turns these into MCP
//! errors visible to the client.

use crate::keys::{KeyError, Letter, ScopeKind};
use crate::plan::{EntityId, EntityKind};
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum WorkPlanError {
    /// Empty or malformed required field
    #[error("{0}")]
    Validation(String),

    /// Goal letter or objective number already held by a sibling
    #[error("{scope} '{key}' is already used in this {context}.")]
    DuplicateKey {
        scope: ScopeKind,
        key: String,
        context: EntityKind,
    },

    /// Output letters repeated inside one objective
    #[error("Output letters used more than once: {}", join_letters(.0))]
    DuplicateOutputLetter(Vec<Letter>),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A child was created under a parent that has not been saved yet
    #[error("The {parent} must be saved before adding a {child}.")]
    ParentNotSaved { parent: EntityKind, child: EntityKind },

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: EntityId },

    /// Cascading goal delete that stopped part way
    ///
    /// `deleted` lists the objectives already gone, `failed` the entity ids
    /// whose step failed with the reason. `goal_removed` tells whether the
    /// goal itself left the store.
    #[error("{}", describe_partial_delete(.goal_id, .goal_removed, .deleted, .failed))]
    PartialDelete {
        goal_id: EntityId,
        goal_removed: bool,
        deleted: Vec<EntityId>,
        failed: Vec<(EntityId, String)>,
    },

    /// More than 26 letter-keyed siblings
    #[error("Each {parent} can hold at most 26 {kind}s.")]
    CapacityExceeded { kind: &'static str, parent: EntityKind },

    #[error("Work plan {0} is locked and cannot be edited.")]
    Locked(EntityId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, WorkPlanError>;

impl From<KeyError> for WorkPlanError {
    fn from(err: KeyError) -> Self {
        WorkPlanError::Validation(err.to_string())
    }
}

impl WorkPlanError {
    pub(crate) fn not_found(kind: EntityKind, id: EntityId) -> Self {
        WorkPlanError::NotFound { kind, id }
    }

    pub(crate) fn denied(message: impl Into<String>) -> Self {
        WorkPlanError::PermissionDenied(message.into())
    }
}

fn join_letters(letters: &[Letter]) -> String {
    letters
        .iter()
        .map(Letter::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_partial_delete(
    goal_id: &EntityId,
    goal_removed: &bool,
    deleted: &[EntityId],
    failed: &[(EntityId, String)],
) -> String {
    let failures = failed
        .iter()
        .map(|(id, reason)| format!("{} ({})", id, reason))
        .collect::<Vec<_>>()
        .join("; ");
    if *goal_removed {
        format!(
            "Goal {} deleted, but {} item(s) could not be removed: {}",
            goal_id,
            failed.len(),
            failures
        )
    } else {
        format!(
            "Goal {} was not deleted after removing {} objective(s): {}",
            goal_id,
            deleted.len(),
            failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_message() {
        let err = WorkPlanError::DuplicateKey {
            scope: ScopeKind::GoalLetter,
            key: "B".to_string(),
            context: EntityKind::WorkPlan,
        };
        assert_eq!(
            err.to_string(),
            "Goal letter 'B' is already used in this work plan."
        );
    }

    #[test]
    fn test_duplicate_output_letter_message() {
        let err = WorkPlanError::DuplicateOutputLetter(vec![
            Letter::new('a').unwrap(),
            Letter::new('C').unwrap(),
        ]);
        assert_eq!(err.to_string(), "Output letters used more than once: A, C");
    }

    #[test]
    fn test_partial_delete_message() {
        let err = WorkPlanError::PartialDelete {
            goal_id: 4,
            goal_removed: true,
            deleted: vec![5],
            failed: vec![(6, "disk full".to_string())],
        };
        assert_eq!(
            err.to_string(),
            "Goal 4 deleted, but 1 item(s) could not be removed: 6 (disk full)"
        );

        let err = WorkPlanError::PartialDelete {
            goal_id: 4,
            goal_removed: false,
            deleted: vec![5, 6],
            failed: vec![(4, "refused".to_string())],
        };
        assert_eq!(
            err.to_string(),
            "Goal 4 was not deleted after removing 2 objective(s): 4 (refused)"
        );
    }

    #[test]
    fn test_key_error_becomes_validation() {
        let err: WorkPlanError = KeyError::Empty(ScopeKind::GoalLetter).into();
        assert!(matches!(err, WorkPlanError::Validation(ref m) if m == "Goal letter is required"));
    }
}
