use tracing::{debug, info};

use super::{WorkPlanService, require_title};
use crate::access::{ActorContext, Capability};
use crate::error::{Result, WorkPlanError};
use crate::plan::{
    CompletionStatus, EntityId, EntityKind, GoalNode, InternalStatus, UNSAVED_ID, WorkPlan,
    WorkPlanInput, WorkPlanTree, is_saved, local_date_today,
};
use crate::store::{HierarchyStore, Parent};

impl<S: HierarchyStore> WorkPlanService<S> {
    /// Create or update a work plan and return its id
    ///
    /// Creation only needs `edit_workplans`; updates also go through the
    /// group check. A changed group tag is pushed down to every goal and
    /// objective of the plan.
    pub fn save_workplan(&mut self, actor: &ActorContext, input: WorkPlanInput) -> Result<EntityId> {
        self.require_capability(actor, Capability::EditWorkplans)?;
        let title = require_title(&input.title, EntityKind::WorkPlan)?;

        if !is_saved(input.id) {
            let workplan = WorkPlan {
                id: UNSAVED_ID,
                title,
                author: actor.id,
                publish_date: Some(input.publish_date.unwrap_or_else(local_date_today)),
                grant_year: input.grant_year,
                group: input.group,
                status: input.status.unwrap_or_default(),
                goal_ids: Vec::new(),
            };
            let id = self.store.create_workplan(workplan)?;
            info!(workplan = id, actor = actor.id, "work plan created");
            return Ok(id);
        }

        let existing = self.require_workplan(input.id)?;
        self.authorize_edit(actor, &existing)?;

        let status = input.status.unwrap_or(existing.status);
        if self.policy.reject_edits_when_locked && existing.status == InternalStatus::Locked {
            let unlocking = actor.is_administrator() && status != InternalStatus::Locked;
            if !unlocking {
                return Err(WorkPlanError::Locked(existing.id));
            }
        }

        let group_changed = input.group.is_some() && input.group != existing.group;
        let updated = WorkPlan {
            id: existing.id,
            title,
            author: existing.author,
            publish_date: input.publish_date.or(existing.publish_date),
            grant_year: input.grant_year.or(existing.grant_year),
            group: input.group.or(existing.group),
            status,
            goal_ids: existing.goal_ids,
        };
        let id = updated.id;
        let group = updated.group.clone();
        self.store.update_workplan(updated)?;

        if group_changed {
            self.propagate_group(id, group.as_deref())?;
        }
        info!(workplan = id, actor = actor.id, group_changed, "work plan updated");
        Ok(id)
    }

    /// Overwrite the group tag of every goal and objective below a work plan
    fn propagate_group(&mut self, workplan_id: EntityId, group: Option<&str>) -> Result<()> {
        for goal_id in self.store.children(Parent::WorkPlan(workplan_id))? {
            self.store.set_group(EntityKind::Goal, goal_id, group)?;
            for objective_id in self.store.children(Parent::Goal(goal_id))? {
                self.store
                    .set_group(EntityKind::Objective, objective_id, group)?;
            }
        }
        debug!(workplan = workplan_id, ?group, "group propagated");
        Ok(())
    }

    /// Work plans the actor may see, sorted by title
    pub fn list_workplans(&self, actor: &ActorContext) -> Result<Vec<WorkPlan>> {
        let all = self.store.workplans()?;
        let mut visible = self.resolver.filter_visible_workplans(actor, all);
        visible.sort_by_key(|w| w.title.to_lowercase());
        Ok(visible)
    }

    /// Nested view of a work plan with every level ordered by key
    pub fn workplan_tree(&self, actor: &ActorContext, workplan_id: EntityId) -> Result<WorkPlanTree> {
        self.require_capability(actor, Capability::EditWorkplans)?;
        let workplan = self.require_workplan(workplan_id)?;
        self.authorize_edit(actor, &workplan)?;

        let mut nodes = Vec::new();
        for goal in self.goals_of(workplan_id)? {
            let objectives = self.objectives_of(goal.id)?;
            nodes.push(GoalNode { goal, objectives });
        }
        debug!(workplan = workplan_id, goals = nodes.len(), "tree built");
        Ok(WorkPlanTree::new(workplan, nodes))
    }

    pub fn completion_status(
        &self,
        actor: &ActorContext,
        workplan_id: EntityId,
    ) -> Result<CompletionStatus> {
        Ok(self.workplan_tree(actor, workplan_id)?.completion())
    }
}
