//! Work plan orchestration
//!
//! `WorkPlanService` combines the key allocator, the access resolver and a
//! [`HierarchyStore`] into the save/delete/duplicate operations. It is the one
//! place where hierarchy invariants are enforced:
//! - `workplan`: work plan saves, listing, tree and completion
//! - `goal`: goal save/delete/duplicate
//! - `objective`: objective save/delete/duplicate
//! - `keys`: next-key suggestions and duplicate checks

mod goal;
mod keys;
mod objective;
mod workplan;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::access::{AccessResolver, ActorContext, Capability};
use crate::error::{Result, WorkPlanError};
use crate::plan::{EntityId, EntityKind, Goal, InternalStatus, Objective, WorkPlan};
use crate::store::{HierarchyStore, Parent};

pub use keys::DuplicateCheck;

/// Behavior toggles that the source data never settled on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicePolicy {
    /// Reject goal/objective edits and plan updates while a plan is Locked
    pub reject_edits_when_locked: bool,
}

/// Invariant-preserving operations over a hierarchy store
pub struct WorkPlanService<S: HierarchyStore> {
    store: S,
    resolver: AccessResolver,
    policy: ServicePolicy,
}

impl<S: HierarchyStore> WorkPlanService<S> {
    pub fn new(store: S, resolver: AccessResolver, policy: ServicePolicy) -> Self {
        Self {
            store,
            resolver,
            policy,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn require_workplan(&self, id: EntityId) -> Result<WorkPlan> {
        self.store
            .workplan(id)?
            .ok_or_else(|| WorkPlanError::not_found(EntityKind::WorkPlan, id))
    }

    fn require_goal(&self, id: EntityId) -> Result<Goal> {
        self.store
            .goal(id)?
            .ok_or_else(|| WorkPlanError::not_found(EntityKind::Goal, id))
    }

    fn require_objective(&self, id: EntityId) -> Result<Objective> {
        self.store
            .objective(id)?
            .ok_or_else(|| WorkPlanError::not_found(EntityKind::Objective, id))
    }

    fn require_capability(&self, actor: &ActorContext, capability: Capability) -> Result<()> {
        if actor.can(capability) {
            Ok(())
        } else {
            warn!(actor = actor.id, %capability, "missing capability");
            Err(WorkPlanError::denied(format!(
                "{} lacks the '{}' capability",
                actor.name, capability
            )))
        }
    }

    fn authorize_edit(&self, actor: &ActorContext, workplan: &WorkPlan) -> Result<()> {
        if self.resolver.can_edit_workplan(actor, workplan) {
            Ok(())
        } else {
            warn!(actor = actor.id, workplan = workplan.id, "edit denied");
            Err(WorkPlanError::denied(format!(
                "{} may not edit work plan {}",
                actor.name, workplan.id
            )))
        }
    }

    fn authorize_delete(&self, actor: &ActorContext, workplan: &WorkPlan) -> Result<()> {
        if self.resolver.can_delete_in_workplan(actor, workplan) {
            Ok(())
        } else {
            warn!(actor = actor.id, workplan = workplan.id, "delete denied");
            Err(WorkPlanError::denied(format!(
                "{} may not delete from work plan {}",
                actor.name, workplan.id
            )))
        }
    }

    fn ensure_unlocked(&self, workplan: &WorkPlan) -> Result<()> {
        if self.policy.reject_edits_when_locked && workplan.status == InternalStatus::Locked {
            Err(WorkPlanError::Locked(workplan.id))
        } else {
            Ok(())
        }
    }

    /// Goals listed under a work plan, in stored order
    fn goals_of(&self, workplan_id: EntityId) -> Result<Vec<Goal>> {
        let mut goals = Vec::new();
        for id in self.store.children(Parent::WorkPlan(workplan_id))? {
            match self.store.goal(id)? {
                Some(goal) => goals.push(goal),
                None => warn!(workplan = workplan_id, goal = id, "dangling goal id"),
            }
        }
        Ok(goals)
    }

    /// Objectives listed under a goal, in stored order
    fn objectives_of(&self, goal_id: EntityId) -> Result<Vec<Objective>> {
        let mut objectives = Vec::new();
        for id in self.store.children(Parent::Goal(goal_id))? {
            match self.store.objective(id)? {
                Some(objective) => objectives.push(objective),
                None => warn!(goal = goal_id, objective = id, "dangling objective id"),
            }
        }
        Ok(objectives)
    }

    /// Rewrite a work plan's goal list in letter order
    fn resort_goals(&mut self, workplan_id: EntityId) -> Result<()> {
        let mut goals = self.goals_of(workplan_id)?;
        goals.sort_by_key(|g| g.letter);
        let ids = goals.into_iter().map(|g| g.id).collect();
        self.store.set_children(Parent::WorkPlan(workplan_id), ids)?;
        Ok(())
    }

    /// Rewrite a goal's objective list in number order
    fn resort_objectives(&mut self, goal_id: EntityId) -> Result<()> {
        let mut objectives = self.objectives_of(goal_id)?;
        objectives.sort_by_key(|o| o.number);
        let ids = objectives.into_iter().map(|o| o.id).collect();
        self.store.set_children(Parent::Goal(goal_id), ids)?;
        Ok(())
    }
}

pub(crate) fn require_title(title: &str, kind: EntityKind) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        Err(WorkPlanError::Validation(format!("A {} title is required", kind)))
    } else {
        Ok(trimmed.to_string())
    }
}

pub(crate) fn copy_title(title: &str) -> String {
    format!("{} (Copy)", title)
}
