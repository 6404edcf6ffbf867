//! Work plan handlers

use crate::WorkPlanServerHandler;
use crate::formatting;
use crate::plan::{EntityId, UNSAVED_ID, WorkPlanInput};
use crate::validation;
use mcp_attr::Result as McpResult;

impl WorkPlanServerHandler {
    /// List the work plans the configured actor may see
    pub async fn handle_list_workplans(&self) -> McpResult<String> {
        let service = self.lock_service()?;
        let workplans = service
            .list_workplans(&self.actor)
            .map_err(validation::to_mcp_error)?;
        Ok(formatting::format_workplan_list(&workplans))
    }

    /// Show one work plan as an outline followed by its completion status
    pub async fn handle_get_workplan(&self, id: EntityId) -> McpResult<String> {
        let service = self.lock_service()?;
        let tree = service
            .workplan_tree(&self.actor, id)
            .map_err(validation::to_mcp_error)?;
        let mut text = formatting::format_tree(&tree);
        text.push('\n');
        text.push_str(&formatting::format_completion(&tree.completion()));
        Ok(text)
    }

    /// Create (id omitted or 0) or update a work plan
    #[allow(clippy::too_many_arguments)]
    pub async fn handle_save_workplan(
        &self,
        id: Option<EntityId>,
        title: Option<String>,
        publish_date: Option<String>,
        grant_year: Option<String>,
        group: Option<String>,
        status: Option<String>,
    ) -> McpResult<String> {
        let publish_date = publish_date
            .as_deref()
            .map(validation::parse_date)
            .transpose()?;
        let status = status
            .as_deref()
            .map(validation::parse_status)
            .transpose()?;

        let mut service = self.lock_service()?;
        let id = id.unwrap_or(UNSAVED_ID);
        let title = match title {
            Some(title) => title,
            None => service
                .store()
                .find_workplan(id)
                .map(|w| w.title.clone())
                .unwrap_or_default(),
        };

        let input = WorkPlanInput {
            id,
            title,
            publish_date,
            grant_year,
            group,
            status,
        };
        let saved = service
            .save_workplan(&self.actor, input)
            .map_err(validation::to_mcp_error)?;

        let verb = if id == UNSAVED_ID { "created" } else { "updated" };
        self.persist(&service, &format!("Work plan {} {}", saved, verb))?;
        Ok(format!("Work plan {} with ID: {}", verb, saved))
    }
}
