use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::keys::Letter;

/// Identifier of a persisted entity
pub type EntityId = u64;

/// Id carried by an entity that has not been persisted yet
pub const UNSAVED_ID: EntityId = 0;

/// Whether an id refers to a persisted entity
pub fn is_saved(id: EntityId) -> bool {
    id != UNSAVED_ID
}

/// Get the current date in local timezone
pub fn local_date_today() -> NaiveDate {
    Local::now().date_naive()
}

/// The three persisted entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    WorkPlan,
    Goal,
    Objective,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::WorkPlan => "work plan",
            EntityKind::Goal => "goal",
            EntityKind::Objective => "objective",
        };
        f.write_str(label)
    }
}

/// Review state of a work plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InternalStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Locked,
}

impl FromStr for InternalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(InternalStatus::Draft),
            "submitted" => Ok(InternalStatus::Submitted),
            "approved" => Ok(InternalStatus::Approved),
            "locked" => Ok(InternalStatus::Locked),
            _ => Err(format!(
                "Invalid status '{}'. Valid statuses: Draft, Submitted, Approved, Locked",
                s
            )),
        }
    }
}

impl fmt::Display for InternalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InternalStatus::Draft => "Draft",
            InternalStatus::Submitted => "Submitted",
            InternalStatus::Approved => "Approved",
            InternalStatus::Locked => "Locked",
        };
        f.write_str(label)
    }
}

/// Top-level document owning an ordered list of goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkPlan {
    pub id: EntityId,
    pub title: String,
    /// Actor id of the creator
    pub author: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_year: Option<String>,
    /// Access-control group; inherited by every goal and objective below
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub status: InternalStatus,
    #[serde(default)]
    pub goal_ids: Vec<EntityId>,
}

/// A lettered goal under a work plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: EntityId,
    /// Back-reference to the owning work plan
    pub workplan_id: EntityId,
    pub title: String,
    pub letter: Letter,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub objective_ids: Vec<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// A numbered objective under a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: EntityId,
    /// Back-reference to the owning goal
    pub goal_id: EntityId,
    pub title: String,
    pub number: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timeline: String,
    #[serde(default)]
    pub measurable_outcomes: String,
    #[serde(default)]
    pub outputs: Vec<Output>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Output record embedded in an objective
///
/// The letter may be unset; unset letters never take part in duplicate checks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Output {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter: Option<Letter>,
    #[serde(default)]
    pub description: String,
}

impl Output {
    pub fn new(letter: Option<Letter>, description: impl Into<String>) -> Self {
        Self {
            letter,
            description: description.into(),
        }
    }
}

/// Sort outputs by letter; unset letters go last and keep their relative order
pub fn sort_outputs(outputs: &mut [Output]) {
    outputs.sort_by_key(|output| (output.letter.is_none(), output.letter));
}

/// Requested state of a work plan for `save_workplan`
///
/// `id == 0` creates a new plan. Optional fields left as `None` keep the
/// stored value on update; on create the status defaults to Draft and the
/// publish date to today.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkPlanInput {
    pub id: EntityId,
    pub title: String,
    pub publish_date: Option<NaiveDate>,
    pub grant_year: Option<String>,
    pub group: Option<String>,
    pub status: Option<InternalStatus>,
}

/// Requested state of a goal for `save_goal`
///
/// There is no group field: goals always inherit the work plan's group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalInput {
    pub id: EntityId,
    pub title: String,
    pub letter: Option<Letter>,
    pub description: String,
}

/// Requested state of an objective for `save_objective`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectiveInput {
    pub id: EntityId,
    pub title: String,
    pub number: Option<u32>,
    pub description: String,
    pub timeline: String,
    pub measurable_outcomes: String,
    pub outputs: Vec<Output>,
}
