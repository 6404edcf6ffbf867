use std::collections::BTreeSet;

use tracing::{info, warn};

use super::{WorkPlanService, copy_title, require_title};
use crate::access::ActorContext;
use crate::error::{Result, WorkPlanError};
use crate::keys::{self, KeyError, LETTER_CAPACITY, Letter, ScopeKind};
use crate::plan::{EntityId, EntityKind, Goal, GoalInput, UNSAVED_ID, is_saved};
use crate::store::{HierarchyStore, Parent};

impl<S: HierarchyStore> WorkPlanService<S> {
    /// Create or update a goal under a saved work plan
    ///
    /// The goal's group tag is always taken from the work plan.
    pub fn save_goal(
        &mut self,
        actor: &ActorContext,
        workplan_id: EntityId,
        input: GoalInput,
    ) -> Result<EntityId> {
        if !is_saved(workplan_id) {
            return Err(WorkPlanError::ParentNotSaved {
                parent: EntityKind::WorkPlan,
                child: EntityKind::Goal,
            });
        }
        let workplan = self.require_workplan(workplan_id)?;
        self.authorize_edit(actor, &workplan)?;
        self.ensure_unlocked(&workplan)?;

        let existing = if is_saved(input.id) {
            let goal = self.require_goal(input.id)?;
            if goal.workplan_id != workplan_id {
                return Err(WorkPlanError::not_found(EntityKind::Goal, input.id));
            }
            Some(goal)
        } else {
            None
        };

        let title = require_title(&input.title, EntityKind::Goal)?;
        let letter = input
            .letter
            .ok_or(KeyError::Empty(ScopeKind::GoalLetter))?;

        let siblings = self.goals_of(workplan_id)?;
        if existing.is_none() && siblings.len() >= LETTER_CAPACITY {
            return Err(WorkPlanError::CapacityExceeded {
                kind: "goal",
                parent: EntityKind::WorkPlan,
            });
        }
        if !keys::is_unique(
            &letter,
            siblings.iter().map(|g| (g.id, g.letter)),
            existing.as_ref().map(|g| g.id),
        ) {
            return Err(WorkPlanError::DuplicateKey {
                scope: ScopeKind::GoalLetter,
                key: letter.to_string(),
                context: EntityKind::WorkPlan,
            });
        }

        let id = match existing {
            Some(goal) => {
                let id = goal.id;
                self.store.update_goal(Goal {
                    title,
                    letter,
                    description: input.description,
                    group: workplan.group.clone(),
                    ..goal
                })?;
                info!(goal = id, workplan = workplan_id, %letter, "goal updated");
                id
            }
            None => {
                let id = self.store.create_goal(Goal {
                    id: UNSAVED_ID,
                    workplan_id,
                    title,
                    letter,
                    description: input.description,
                    objective_ids: Vec::new(),
                    group: workplan.group.clone(),
                })?;
                info!(goal = id, workplan = workplan_id, %letter, "goal created");
                id
            }
        };

        self.store.append_child(Parent::WorkPlan(workplan_id), id)?;
        self.resort_goals(workplan_id)?;
        Ok(id)
    }

    /// Delete a goal and every objective under it
    ///
    /// Objectives are taken from the goal's list and from their
    /// back-references, then deleted one by one. Every step runs even when an
    /// earlier one failed; any failure comes back as `PartialDelete`. A goal
    /// that survives is linked back into its work plan and keeps only the
    /// objectives that are left. On success the ids of the deleted
    /// objectives are returned.
    pub fn delete_goal(&mut self, actor: &ActorContext, goal_id: EntityId) -> Result<Vec<EntityId>> {
        let goal = self.require_goal(goal_id)?;
        let workplan = self.require_workplan(goal.workplan_id)?;
        self.authorize_delete(actor, &workplan)?;
        self.ensure_unlocked(&workplan)?;

        let mut targets = self.store.children(Parent::Goal(goal_id))?;
        for id in self.store.list_children(Parent::Goal(goal_id))? {
            if !targets.contains(&id) {
                targets.push(id);
            }
        }

        let mut deleted = Vec::new();
        let mut failed = Vec::new();
        for objective_id in targets {
            match self.store.delete_objective(objective_id) {
                Ok(()) => deleted.push(objective_id),
                Err(e) => {
                    warn!(goal = goal_id, objective = objective_id, error = %e, "objective delete failed");
                    failed.push((objective_id, e.to_string()));
                }
            }
        }

        let unlinked = match self.store.remove_child(Parent::WorkPlan(workplan.id), goal_id) {
            Ok(()) => true,
            Err(e) => {
                warn!(goal = goal_id, workplan = workplan.id, error = %e, "goal unlink failed");
                failed.push((goal_id, format!("unlink from work plan {}: {}", workplan.id, e)));
                false
            }
        };
        let goal_removed = match self.store.delete_goal(goal_id) {
            Ok(()) => true,
            Err(e) => {
                warn!(goal = goal_id, error = %e, "goal delete failed");
                failed.push((goal_id, e.to_string()));
                false
            }
        };
        if !goal_removed {
            self.restore_goal_links(workplan.id, goal_id, unlinked, &deleted);
        }

        if !failed.is_empty() {
            return Err(WorkPlanError::PartialDelete {
                goal_id,
                goal_removed,
                deleted,
                failed,
            });
        }
        info!(goal = goal_id, objectives = deleted.len(), "goal deleted");
        Ok(deleted)
    }

    /// Drop deleted objective ids from a surviving goal and list it under its work plan again
    fn restore_goal_links(
        &mut self,
        workplan_id: EntityId,
        goal_id: EntityId,
        relink: bool,
        deleted: &[EntityId],
    ) {
        match self.store.children(Parent::Goal(goal_id)) {
            Ok(mut remaining) => {
                remaining.retain(|id| !deleted.contains(id));
                if let Err(e) = self.store.set_children(Parent::Goal(goal_id), remaining) {
                    warn!(goal = goal_id, error = %e, "could not prune objective list");
                }
            }
            Err(e) => warn!(goal = goal_id, error = %e, "could not read objective list"),
        }
        if relink {
            if let Err(e) = self.store.append_child(Parent::WorkPlan(workplan_id), goal_id) {
                warn!(goal = goal_id, workplan = workplan_id, error = %e, "could not relink goal");
            } else if let Err(e) = self.resort_goals(workplan_id) {
                warn!(workplan = workplan_id, error = %e, "could not resort goals");
            }
        }
    }

    /// Unsaved copy of a goal under the next free letter
    ///
    /// Nothing is persisted; pass the result to [`Self::save_goal`].
    pub fn duplicate_goal(&self, actor: &ActorContext, goal_id: EntityId) -> Result<GoalInput> {
        let goal = self.require_goal(goal_id)?;
        let workplan = self.require_workplan(goal.workplan_id)?;
        self.authorize_edit(actor, &workplan)?;

        let used: BTreeSet<Letter> = self
            .goals_of(workplan.id)?
            .into_iter()
            .map(|g| g.letter)
            .collect();
        if used.len() >= LETTER_CAPACITY {
            return Err(WorkPlanError::CapacityExceeded {
                kind: "goal",
                parent: EntityKind::WorkPlan,
            });
        }

        Ok(GoalInput {
            id: UNSAVED_ID,
            title: copy_title(&goal.title),
            letter: Some(keys::suggest_next_letter(&used)),
            description: goal.description,
        })
    }
}
