//! Work Plan MCP Server Library
//!
//! This library provides a Model Context Protocol (MCP) server for entering
//! hierarchical work plans: lettered Goals, numbered Objectives under each
//! goal, and lettered Outputs under each objective. Keys stay unique among
//! siblings, siblings stay ordered by key, and access is decided per work
//! plan through group membership.
//!
//! # Architecture
//!
//! The library follows a 3-layer architecture:
//! - **MCP Layer**: `WorkPlanServerHandler` - Handles MCP protocol communication
//! - **Domain Layer**: `keys`, `access` and `service` - Key allocation, access
//!   control and invariant-preserving operations over a `HierarchyStore`
//! - **Persistence Layer**: `storage` module - TOML file with optional git history
//!
//! # Example
//!
//! ```no_run
//! use workplan_mcp::{Config, WorkPlanServerHandler};
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let handler = WorkPlanServerHandler::new("workplans.toml", Config::default(), false)?;
//!     // Use handler with MCP server...
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod config;
pub mod error;
pub mod formatting;
pub mod handlers;
mod history;
pub mod keys;
pub mod plan;
pub mod service;
mod storage;
pub mod store;
pub mod validation;

use anyhow::Result;
use mcp_attr::server::{McpServer, mcp_server};
use mcp_attr::{Result as McpResult, bail_public};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

// Re-export commonly used types
pub use access::{AccessResolver, AccessibleGroups, ActorContext, Capability, GroupMappings, Role};
pub use config::Config;
pub use error::WorkPlanError;
pub use keys::{LETTER_CAPACITY, Letter, ScopeKind};
pub use plan::{
    EntityId, EntityKind, Goal, GoalInput, InternalStatus, Objective, ObjectiveInput, Output, PlanData,
    WorkPlan, WorkPlanInput, WorkPlanTree,
};
pub use service::{DuplicateCheck, ServicePolicy, WorkPlanService};
pub use storage::Storage;
pub use store::{HierarchyStore, Parent, StoreError};

/// MCP Server handler for work plan data entry
///
/// Holds the in-memory store behind the service, the configured actor and
/// the storage that every successful change is written to.
pub struct WorkPlanServerHandler {
    pub(crate) service: Mutex<WorkPlanService<PlanData>>,
    pub(crate) actor: ActorContext,
    pub(crate) storage: Storage,
}

impl WorkPlanServerHandler {
    /// Create a new work plan server handler
    ///
    /// # Arguments
    /// * `storage_path` - Path to the work plan data file (TOML format)
    /// * `config` - Acting user, group mappings and policy
    /// * `record_history` - Commit every change to the git repository holding the file
    pub fn new(storage_path: impl AsRef<Path>, config: Config, record_history: bool) -> Result<Self> {
        let storage = Storage::new(storage_path, record_history);
        let data = storage.load()?;
        let actor = config.actor.to_context();
        info!(
            path = %storage.file_path().display(),
            actor = actor.id,
            workplans = data.workplan_count(),
            "work plan data loaded"
        );
        let service = WorkPlanService::new(data, AccessResolver::new(config.groups), config.policy);
        Ok(Self {
            service: Mutex::new(service),
            actor,
            storage,
        })
    }

    pub fn actor(&self) -> &ActorContext {
        &self.actor
    }

    pub(crate) fn lock_service(&self) -> McpResult<MutexGuard<'_, WorkPlanService<PlanData>>> {
        match self.service.lock() {
            Ok(guard) => Ok(guard),
            Err(_) => bail_public!(_, "Work plan data is unavailable after an earlier failure"),
        }
    }

    /// Write the store to disk and record the change
    pub(crate) fn persist(&self, service: &WorkPlanService<PlanData>, message: &str) -> McpResult<()> {
        if let Err(e) = self
            .storage
            .save_with_message(service.store(), &self.actor, message)
        {
            bail_public!(_, "Failed to save: {:#}", e);
        }
        Ok(())
    }
}

/// Work plan data-entry server.
///
/// A work plan holds Goals keyed by a letter (A-Z), each goal holds Objectives
/// keyed by a positive number, and each objective holds Outputs keyed by a
/// letter. Keys are unique among siblings and siblings are always shown in
/// key order. At most 26 goals per work plan and 26 outputs per objective.
///
/// Goals and objectives inherit the access group of their work plan. Which
/// plans you can see and change depends on the configured actor.
///
/// Typical flow: list_workplans → get_workplan → suggest_key → save_goal /
/// save_objective. IDs are numbers assigned by the server; 0 or omitted means
/// "create new".
#[mcp_server]
impl McpServer for WorkPlanServerHandler {
    /// **List**: Work plans visible to you, sorted by title, with status and group.
    #[tool]
    async fn list_workplans(&self) -> McpResult<String> {
        self.handle_list_workplans().await
    }

    /// **View**: One work plan as an outline (goals by letter, objectives by number, outputs by letter) plus completion percentages.
    #[tool]
    async fn get_workplan(
        &self,
        /// Work plan ID
        id: u64,
    ) -> McpResult<String> {
        self.handle_get_workplan(id).await
    }

    /// **Save work plan**: Create (id omitted/0) or update. Changing the group updates every goal and objective below.
    #[tool]
    async fn save_workplan(
        &self,
        /// Work plan ID; omit or 0 to create
        id: Option<u64>,
        /// Title (required on create)
        title: Option<String>,
        /// Publish date: YYYY-MM-DD (defaults to today on create)
        publish_date: Option<String>,
        /// Grant year tag (e.g., "2024")
        grant_year: Option<String>,
        /// Access group tag (e.g., "Great Lakes ATTC")
        group: Option<String>,
        /// Status: Draft/Submitted/Approved/Locked
        status: Option<String>,
    ) -> McpResult<String> {
        self.handle_save_workplan(id, title, publish_date, grant_year, group, status)
            .await
    }

    /// **Save goal**: Create or update a goal. The letter must be unique in the work plan (use suggest_key with scope=goal_letter).
    #[tool]
    async fn save_goal(
        &self,
        /// Parent work plan ID (must be saved)
        workplan_id: u64,
        /// Goal ID; omit or 0 to create
        id: Option<u64>,
        /// Title (required on create)
        title: Option<String>,
        /// Letter A-Z, case-insensitive (required on create)
        letter: Option<String>,
        /// Description
        description: Option<String>,
    ) -> McpResult<String> {
        self.handle_save_goal(workplan_id, id, title, letter, description)
            .await
    }

    /// **Save objective**: Create or update an objective. The number must be unique in the goal; output letters must not repeat.
    #[tool]
    async fn save_objective(
        &self,
        /// Parent goal ID (must be saved)
        goal_id: u64,
        /// Work plan ID of the goal, for verification (optional)
        workplan_id: Option<u64>,
        /// Objective ID; omit or 0 to create
        id: Option<u64>,
        /// Title (required on create)
        title: Option<String>,
        /// Number: positive integer (required on create)
        number: Option<String>,
        /// Description
        description: Option<String>,
        /// Timeline text
        timeline: Option<String>,
        /// Measurable outcomes text
        measurable_outcomes: Option<String>,
        /// Outputs as "A: description" (": description" for no letter); replaces the list
        outputs: Option<Vec<String>>,
    ) -> McpResult<String> {
        self.handle_save_objective(
            goal_id,
            workplan_id,
            id,
            title,
            number,
            description,
            timeline,
            measurable_outcomes,
            outputs,
        )
        .await
    }

    /// **Delete goal**: Removes the goal and all of its objectives.
    #[tool]
    async fn delete_goal(
        &self,
        /// Goal ID
        id: u64,
    ) -> McpResult<String> {
        self.handle_delete_goal(id).await
    }

    /// **Delete objective**: Removes the objective and its outputs.
    #[tool]
    async fn delete_objective(
        &self,
        /// Objective ID
        id: u64,
    ) -> McpResult<String> {
        self.handle_delete_objective(id).await
    }

    /// **Duplicate goal**: Copy a goal under the next free letter with " (Copy)" appended. Objectives are not copied.
    #[tool]
    async fn duplicate_goal(
        &self,
        /// Goal ID to copy
        id: u64,
        /// Save the copy immediately (default: preview only)
        save: Option<bool>,
    ) -> McpResult<String> {
        self.handle_duplicate_goal(id, save.unwrap_or(false)).await
    }

    /// **Duplicate objective**: Copy an objective (with outputs) under the next free number.
    #[tool]
    async fn duplicate_objective(
        &self,
        /// Objective ID to copy
        id: u64,
        /// Save the copy immediately (default: preview only)
        save: Option<bool>,
    ) -> McpResult<String> {
        self.handle_duplicate_objective(id, save.unwrap_or(false))
            .await
    }

    /// **Suggest key**: Next free goal letter, objective number or output letter.
    #[tool]
    async fn suggest_key(
        &self,
        /// Scope: goal_letter (context=work plan), objective_number (context=goal), output_letter (context=objective)
        scope: String,
        /// Parent ID whose children are keyed
        context_id: u64,
    ) -> McpResult<String> {
        self.handle_suggest_key(scope, context_id).await
    }

    /// **Check duplicate**: Whether a key is already taken before saving.
    #[tool]
    async fn check_duplicate(
        &self,
        /// Scope: goal_letter/objective_number/output_letter
        scope: String,
        /// Proposed key (e.g., "B" or "3")
        value: String,
        /// Parent ID whose children are compared
        context_id: u64,
        /// ID of the entity being edited, so its own key is not reported
        exclude_id: Option<u64>,
    ) -> McpResult<String> {
        self.handle_check_duplicate(scope, value, context_id, exclude_id)
            .await
    }
}
