//! Objective handlers

use crate::WorkPlanServerHandler;
use crate::plan::{EntityId, ObjectiveInput, UNSAVED_ID};
use crate::validation;
use mcp_attr::{Result as McpResult, bail_public};

impl WorkPlanServerHandler {
    /// Create or update an objective
    ///
    /// On update, omitted fields keep their stored values. `outputs` replaces
    /// the whole output list when given.
    #[allow(clippy::too_many_arguments)]
    pub async fn handle_save_objective(
        &self,
        goal_id: EntityId,
        workplan_id: Option<EntityId>,
        id: Option<EntityId>,
        title: Option<String>,
        number: Option<String>,
        description: Option<String>,
        timeline: Option<String>,
        measurable_outcomes: Option<String>,
        outputs: Option<Vec<String>>,
    ) -> McpResult<String> {
        let number = match number.as_deref() {
            Some(raw) => validation::parse_objective_number(raw)?,
            None => None,
        };
        let outputs = outputs
            .as_deref()
            .map(validation::parse_outputs)
            .transpose()?;

        let mut service = self.lock_service()?;
        let id = id.unwrap_or(UNSAVED_ID);
        let stored = service.store().find_objective(id).cloned();

        let input = match stored {
            Some(o) => ObjectiveInput {
                id,
                title: title.unwrap_or(o.title),
                number: number.or(Some(o.number)),
                description: description.unwrap_or(o.description),
                timeline: timeline.unwrap_or(o.timeline),
                measurable_outcomes: measurable_outcomes.unwrap_or(o.measurable_outcomes),
                outputs: outputs.unwrap_or(o.outputs),
            },
            None => ObjectiveInput {
                id,
                title: title.unwrap_or_default(),
                number,
                description: description.unwrap_or_default(),
                timeline: timeline.unwrap_or_default(),
                measurable_outcomes: measurable_outcomes.unwrap_or_default(),
                outputs: outputs.unwrap_or_default(),
            },
        };
        let saved = service
            .save_objective(&self.actor, goal_id, workplan_id.unwrap_or(UNSAVED_ID), input)
            .map_err(validation::to_mcp_error)?;

        let verb = if id == UNSAVED_ID { "created" } else { "updated" };
        self.persist(&service, &format!("Objective {} {}", saved, verb))?;
        Ok(format!("Objective {} with ID: {}", verb, saved))
    }

    pub async fn handle_delete_objective(&self, id: EntityId) -> McpResult<String> {
        let mut service = self.lock_service()?;
        service
            .delete_objective(&self.actor, id)
            .map_err(validation::to_mcp_error)?;
        self.persist(&service, &format!("Objective {} deleted", id))?;
        Ok(format!("Objective {} deleted", id))
    }

    /// Preview a copy of an objective, or save it when `save` is true
    pub async fn handle_duplicate_objective(&self, id: EntityId, save: bool) -> McpResult<String> {
        let mut service = self.lock_service()?;
        let copy = service
            .duplicate_objective(&self.actor, id)
            .map_err(validation::to_mcp_error)?;
        let number = copy.number.unwrap_or_default();

        if !save {
            return Ok(format!(
                "Copy of objective {}: '{}' with number {} and {} output(s) (not saved)",
                id,
                copy.title,
                number,
                copy.outputs.len()
            ));
        }

        let Some(goal_id) = service.store().find_objective(id).map(|o| o.goal_id) else {
            bail_public!(_, "objective {} not found", id);
        };
        let saved = service
            .save_objective(&self.actor, goal_id, UNSAVED_ID, copy)
            .map_err(validation::to_mcp_error)?;
        self.persist(&service, &format!("Objective {} duplicated as {}", id, saved))?;
        Ok(format!(
            "Objective {} duplicated with ID: {} (number {})",
            id, saved, number
        ))
    }
}
