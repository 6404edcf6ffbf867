use std::collections::BTreeSet;

use tracing::debug;

use super::WorkPlanService;
use crate::error::{Result, WorkPlanError};
use crate::keys::{self, Letter, ScopeKind, parse_objective_number};
use crate::plan::{EntityId, EntityKind, is_saved};
use crate::store::HierarchyStore;

/// Outcome of a duplicate-key lookup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DuplicateCheck {
    pub is_duplicate: bool,
    pub message: Option<String>,
}

impl DuplicateCheck {
    fn free() -> Self {
        Self::default()
    }

    fn taken(message: String) -> Self {
        Self {
            is_duplicate: true,
            message: Some(message),
        }
    }
}

impl<S: HierarchyStore> WorkPlanService<S> {
    pub fn suggest_next_goal_letter(&self, workplan_id: EntityId) -> Result<Letter> {
        self.require_workplan(workplan_id)?;
        let used: BTreeSet<Letter> = self
            .goals_of(workplan_id)?
            .into_iter()
            .map(|g| g.letter)
            .collect();
        Ok(keys::suggest_next_letter(&used))
    }

    pub fn suggest_next_objective_number(&self, goal_id: EntityId) -> Result<u32> {
        self.require_goal(goal_id)?;
        let used: BTreeSet<u32> = self
            .objectives_of(goal_id)?
            .into_iter()
            .map(|o| o.number)
            .collect();
        Ok(keys::suggest_next_number(&used))
    }

    pub fn suggest_next_output_letter(&self, objective_id: EntityId) -> Result<Letter> {
        let objective = self.require_objective(objective_id)?;
        let used: BTreeSet<Letter> = objective.outputs.iter().filter_map(|o| o.letter).collect();
        Ok(keys::suggest_next_letter(&used))
    }

    /// Look up whether `value` is already taken in a scope
    ///
    /// `context_id` is the work plan (goal letters), goal (objective numbers) or
    /// objective (output letters) whose children are compared. An unsaved
    /// context or blank value is never a duplicate. Output letters are taken
    /// when the stored objective already lists the letter more than once.
    pub fn check_duplicate(
        &self,
        scope: ScopeKind,
        value: &str,
        context_id: EntityId,
        exclude_id: Option<EntityId>,
    ) -> Result<DuplicateCheck> {
        if !is_saved(context_id) || value.trim().is_empty() {
            return Ok(DuplicateCheck::free());
        }
        let exclude = exclude_id.filter(|id| is_saved(*id));

        let check = match scope {
            ScopeKind::GoalLetter => {
                let letter: Letter = value.parse()?;
                self.require_workplan(context_id)?;
                let siblings = self.goals_of(context_id)?;
                if keys::is_unique(&letter, siblings.iter().map(|g| (g.id, g.letter)), exclude) {
                    DuplicateCheck::free()
                } else {
                    DuplicateCheck::taken(duplicate_message(scope, &letter, EntityKind::WorkPlan))
                }
            }
            ScopeKind::ObjectiveNumber => {
                let number = parse_objective_number(value)?;
                self.require_goal(context_id)?;
                let siblings = self.objectives_of(context_id)?;
                if keys::is_unique(&number, siblings.iter().map(|o| (o.id, o.number)), exclude) {
                    DuplicateCheck::free()
                } else {
                    DuplicateCheck::taken(duplicate_message(scope, &number, EntityKind::Goal))
                }
            }
            ScopeKind::OutputLetter => {
                let letter: Letter = value.parse()?;
                let objective = self.require_objective(context_id)?;
                let count = objective
                    .outputs
                    .iter()
                    .filter(|o| o.letter == Some(letter))
                    .count();
                if count > 1 {
                    DuplicateCheck::taken(format!(
                        "Output letter '{}' is used multiple times in this objective.",
                        letter
                    ))
                } else {
                    DuplicateCheck::free()
                }
            }
        };
        debug!(scope = scope.as_str(), value, context_id, duplicate = check.is_duplicate, "duplicate check");
        Ok(check)
    }
}

fn duplicate_message(scope: ScopeKind, key: &dyn std::fmt::Display, context: EntityKind) -> String {
    WorkPlanError::DuplicateKey {
        scope,
        key: key.to_string(),
        context,
    }
    .to_string()
}
