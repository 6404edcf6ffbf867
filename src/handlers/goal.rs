//! Goal handlers

use crate::WorkPlanServerHandler;
use crate::error::WorkPlanError;
use crate::plan::{EntityId, GoalInput, UNSAVED_ID};
use crate::validation;
use mcp_attr::{Result as McpResult, bail_public};

impl WorkPlanServerHandler {
    /// Create or update a goal
    ///
    /// On update, omitted fields keep their stored values.
    pub async fn handle_save_goal(
        &self,
        workplan_id: EntityId,
        id: Option<EntityId>,
        title: Option<String>,
        letter: Option<String>,
        description: Option<String>,
    ) -> McpResult<String> {
        let letter = match letter.as_deref() {
            Some(raw) => validation::parse_goal_letter(raw)?,
            None => None,
        };

        let mut service = self.lock_service()?;
        let id = id.unwrap_or(UNSAVED_ID);
        let stored = service.store().find_goal(id).cloned();

        let input = match stored {
            Some(g) => GoalInput {
                id,
                title: title.unwrap_or(g.title),
                letter: letter.or(Some(g.letter)),
                description: description.unwrap_or(g.description),
            },
            None => GoalInput {
                id,
                title: title.unwrap_or_default(),
                letter,
                description: description.unwrap_or_default(),
            },
        };
        let saved = service
            .save_goal(&self.actor, workplan_id, input)
            .map_err(validation::to_mcp_error)?;

        let verb = if id == UNSAVED_ID { "created" } else { "updated" };
        self.persist(&service, &format!("Goal {} {}", saved, verb))?;
        Ok(format!("Goal {} with ID: {}", verb, saved))
    }

    /// Delete a goal together with its objectives
    pub async fn handle_delete_goal(&self, id: EntityId) -> McpResult<String> {
        let mut service = self.lock_service()?;
        match service.delete_goal(&self.actor, id) {
            Ok(deleted) => {
                self.persist(&service, &format!("Goal {} deleted", id))?;
                Ok(format!(
                    "Goal {} deleted with {} objective(s)",
                    id,
                    deleted.len()
                ))
            }
            Err(err @ WorkPlanError::PartialDelete { .. }) => {
                // Part of the cascade already ran; keep the file in step with memory
                self.persist(&service, &format!("Goal {} partially deleted", id))?;
                bail_public!(_, "{}", err);
            }
            Err(err) => Err(validation::to_mcp_error(err)),
        }
    }

    /// Preview a copy of a goal, or save it when `save` is true
    pub async fn handle_duplicate_goal(&self, id: EntityId, save: bool) -> McpResult<String> {
        let mut service = self.lock_service()?;
        let copy = service
            .duplicate_goal(&self.actor, id)
            .map_err(validation::to_mcp_error)?;
        let letter = copy.letter.map(|l| l.to_string()).unwrap_or_default();

        if !save {
            return Ok(format!(
                "Copy of goal {}: '{}' with letter {} (not saved)",
                id, copy.title, letter
            ));
        }

        let Some(workplan_id) = service.store().find_goal(id).map(|g| g.workplan_id) else {
            bail_public!(_, "goal {} not found", id);
        };
        let saved = service
            .save_goal(&self.actor, workplan_id, copy)
            .map_err(validation::to_mcp_error)?;
        self.persist(&service, &format!("Goal {} duplicated as {}", id, saved))?;
        Ok(format!(
            "Goal {} duplicated with ID: {} (letter {})",
            id, saved, letter
        ))
    }
}
