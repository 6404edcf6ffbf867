use std::collections::BTreeSet;

use tracing::info;

use super::{WorkPlanService, copy_title, require_title};
use crate::access::ActorContext;
use crate::error::{Result, WorkPlanError};
use crate::keys::{self, KeyError, LETTER_CAPACITY, ScopeKind};
use crate::plan::{
    EntityId, EntityKind, Objective, ObjectiveInput, UNSAVED_ID, is_saved, sort_outputs,
};
use crate::store::{HierarchyStore, Parent};

impl<S: HierarchyStore> WorkPlanService<S> {
    /// Create or update an objective under a saved goal
    ///
    /// `workplan_id` must be the goal's work plan, or 0 to derive it from the
    /// goal. Output letters are checked for repeats; unset letters are skipped.
    pub fn save_objective(
        &mut self,
        actor: &ActorContext,
        goal_id: EntityId,
        workplan_id: EntityId,
        input: ObjectiveInput,
    ) -> Result<EntityId> {
        if !is_saved(goal_id) {
            return Err(WorkPlanError::ParentNotSaved {
                parent: EntityKind::Goal,
                child: EntityKind::Objective,
            });
        }
        let goal = self.require_goal(goal_id)?;
        if is_saved(workplan_id) && goal.workplan_id != workplan_id {
            return Err(WorkPlanError::not_found(EntityKind::WorkPlan, workplan_id));
        }
        let workplan = self.require_workplan(goal.workplan_id)?;
        self.authorize_edit(actor, &workplan)?;
        self.ensure_unlocked(&workplan)?;

        let existing = if is_saved(input.id) {
            let objective = self.require_objective(input.id)?;
            if objective.goal_id != goal_id {
                return Err(WorkPlanError::not_found(EntityKind::Objective, input.id));
            }
            Some(objective)
        } else {
            None
        };

        let title = require_title(&input.title, EntityKind::Objective)?;
        let number = input
            .number
            .filter(|n| *n > 0)
            .ok_or(KeyError::Empty(ScopeKind::ObjectiveNumber))?;

        if input.outputs.len() > LETTER_CAPACITY {
            return Err(WorkPlanError::CapacityExceeded {
                kind: "output",
                parent: EntityKind::Objective,
            });
        }

        let siblings = self.objectives_of(goal_id)?;
        if !keys::is_unique(
            &number,
            siblings.iter().map(|o| (o.id, o.number)),
            existing.as_ref().map(|o| o.id),
        ) {
            return Err(WorkPlanError::DuplicateKey {
                scope: ScopeKind::ObjectiveNumber,
                key: number.to_string(),
                context: EntityKind::Goal,
            });
        }

        let repeated = keys::duplicate_letters(input.outputs.iter().map(|o| o.letter));
        if !repeated.is_empty() {
            return Err(WorkPlanError::DuplicateOutputLetter(repeated));
        }

        let mut outputs = input.outputs;
        sort_outputs(&mut outputs);

        let id = match existing {
            Some(objective) => {
                let id = objective.id;
                self.store.update_objective(Objective {
                    title,
                    number,
                    description: input.description,
                    timeline: input.timeline,
                    measurable_outcomes: input.measurable_outcomes,
                    outputs,
                    group: workplan.group.clone(),
                    ..objective
                })?;
                info!(objective = id, goal = goal_id, number, "objective updated");
                id
            }
            None => {
                let id = self.store.create_objective(Objective {
                    id: UNSAVED_ID,
                    goal_id,
                    title,
                    number,
                    description: input.description,
                    timeline: input.timeline,
                    measurable_outcomes: input.measurable_outcomes,
                    outputs,
                    group: workplan.group.clone(),
                })?;
                info!(objective = id, goal = goal_id, number, "objective created");
                id
            }
        };

        self.store.append_child(Parent::Goal(goal_id), id)?;
        self.resort_objectives(goal_id)?;
        Ok(id)
    }

    /// Delete one objective and its outputs
    pub fn delete_objective(&mut self, actor: &ActorContext, objective_id: EntityId) -> Result<()> {
        let objective = self.require_objective(objective_id)?;
        let goal = self.require_goal(objective.goal_id)?;
        let workplan = self.require_workplan(goal.workplan_id)?;
        self.authorize_delete(actor, &workplan)?;
        self.ensure_unlocked(&workplan)?;

        self.store.remove_child(Parent::Goal(goal.id), objective_id)?;
        self.store.delete_objective(objective_id)?;
        info!(objective = objective_id, goal = goal.id, "objective deleted");
        Ok(())
    }

    /// Unsaved copy of an objective under the next free number
    ///
    /// Outputs are copied as they are. Nothing is persisted; pass the result
    /// to [`Self::save_objective`].
    pub fn duplicate_objective(
        &self,
        actor: &ActorContext,
        objective_id: EntityId,
    ) -> Result<ObjectiveInput> {
        let objective = self.require_objective(objective_id)?;
        let goal = self.require_goal(objective.goal_id)?;
        let workplan = self.require_workplan(goal.workplan_id)?;
        self.authorize_edit(actor, &workplan)?;

        let used: BTreeSet<u32> = self
            .objectives_of(goal.id)?
            .into_iter()
            .map(|o| o.number)
            .collect();

        Ok(ObjectiveInput {
            id: UNSAVED_ID,
            title: copy_title(&objective.title),
            number: Some(keys::suggest_next_number(&used)),
            description: objective.description,
            timeline: objective.timeline,
            measurable_outcomes: objective.measurable_outcomes,
            outputs: objective.outputs,
        })
    }
}
