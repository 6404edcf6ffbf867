//! Work plan domain models
//!
//! This module contains the core data structures of the work plan hierarchy.
//! It is split into submodules:
//! - `entities`: WorkPlan, Goal, Objective, Output and their save inputs
//! - `plan_data`: in-memory document store holding every entity
//! - `tree`: nested read model and completion status
//! - `serde_impl`: Serialization/deserialization implementations

mod entities;
mod plan_data;
mod serde_impl;
mod tree;

// Re-export all public types
pub use entities::{
    EntityId, EntityKind, Goal, GoalInput, InternalStatus, Objective, ObjectiveInput, Output,
    UNSAVED_ID, WorkPlan, WorkPlanInput, is_saved, local_date_today, sort_outputs,
};
pub use plan_data::{FORMAT_VERSION, PlanData};
pub use tree::{
    CompletionStatus, GoalNode, LevelCompletion, WorkPlanTree, goal_is_complete,
    objective_is_complete,
};
