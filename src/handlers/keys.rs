//! Key suggestion and duplicate check handlers

use crate::WorkPlanServerHandler;
use crate::keys::ScopeKind;
use crate::plan::EntityId;
use crate::validation;
use mcp_attr::Result as McpResult;

impl WorkPlanServerHandler {
    /// Next free key in a scope; `context_id` is the parent whose children are keyed
    pub async fn handle_suggest_key(&self, scope: String, context_id: EntityId) -> McpResult<String> {
        let scope = validation::parse_scope(&scope)?;
        let service = self.lock_service()?;
        let key = match scope {
            ScopeKind::GoalLetter => service
                .suggest_next_goal_letter(context_id)
                .map(|l| l.to_string()),
            ScopeKind::ObjectiveNumber => service
                .suggest_next_objective_number(context_id)
                .map(|n| n.to_string()),
            ScopeKind::OutputLetter => service
                .suggest_next_output_letter(context_id)
                .map(|l| l.to_string()),
        }
        .map_err(validation::to_mcp_error)?;
        Ok(key)
    }

    pub async fn handle_check_duplicate(
        &self,
        scope: String,
        value: String,
        context_id: EntityId,
        exclude_id: Option<EntityId>,
    ) -> McpResult<String> {
        let scope = validation::parse_scope(&scope)?;
        let service = self.lock_service()?;
        let check = service
            .check_duplicate(scope, &value, context_id, exclude_id)
            .map_err(validation::to_mcp_error)?;
        Ok(match check.message {
            Some(message) => format!("Duplicate: {}", message),
            None => format!("{} '{}' is available", scope, value.trim()),
        })
    }
}
