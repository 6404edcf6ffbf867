//! Common test utilities for integration tests
#![allow(dead_code)]

use std::collections::HashSet;

use tempfile::NamedTempFile;
use workplan_mcp::plan::UNSAVED_ID;
use workplan_mcp::*;

pub fn admin() -> ActorContext {
    ActorContext::new(1, "Admin")
        .with_role(Role::Administrator)
        .with_email("admin@example.org")
}

pub fn east_editor() -> ActorContext {
    ActorContext::new(2, "East Editor")
        .with_role(Role::Editor)
        .with_membership("east_editor")
}

pub fn west_editor() -> ActorContext {
    ActorContext::new(3, "West Editor")
        .with_role(Role::Editor)
        .with_membership("west_editor")
}

pub fn test_mappings() -> GroupMappings {
    GroupMappings::from_pairs([
        ("east_editor", "East"),
        ("west_editor", "West"),
        ("north_editor", "North"),
    ])
}

pub fn failing_service() -> WorkPlanService<FailingStore> {
    WorkPlanService::new(
        FailingStore::default(),
        AccessResolver::new(test_mappings()),
        ServicePolicy::default(),
    )
}

pub fn new_service() -> WorkPlanService<PlanData> {
    service_with_policy(ServicePolicy::default())
}

pub fn service_with_policy(policy: ServicePolicy) -> WorkPlanService<PlanData> {
    WorkPlanService::new(PlanData::new(), AccessResolver::new(test_mappings()), policy)
}

pub fn letter(c: char) -> Letter {
    Letter::new(c).unwrap()
}

pub fn output(c: Option<char>, description: &str) -> Output {
    Output::new(c.and_then(Letter::new), description)
}

pub fn create_plan<S: HierarchyStore>(
    service: &mut WorkPlanService<S>,
    actor: &ActorContext,
    title: &str,
    group: Option<&str>,
) -> EntityId {
    service
        .save_workplan(
            actor,
            WorkPlanInput {
                title: title.to_string(),
                group: group.map(str::to_string),
                ..Default::default()
            },
        )
        .unwrap()
}

pub fn goal_input(c: char, title: &str) -> GoalInput {
    GoalInput {
        id: UNSAVED_ID,
        title: title.to_string(),
        letter: Letter::new(c),
        description: format!("{} description", title),
    }
}

pub fn add_goal<S: HierarchyStore>(
    service: &mut WorkPlanService<S>,
    actor: &ActorContext,
    workplan_id: EntityId,
    c: char,
) -> EntityId {
    service
        .save_goal(actor, workplan_id, goal_input(c, &format!("Goal {}", c)))
        .unwrap()
}

pub fn objective_input(number: u32, outputs: Vec<Output>) -> ObjectiveInput {
    ObjectiveInput {
        id: UNSAVED_ID,
        title: format!("Objective {}", number),
        number: Some(number),
        description: "Deliver trainings".to_string(),
        timeline: "Q1-Q2".to_string(),
        measurable_outcomes: String::new(),
        outputs,
    }
}

pub fn add_objective<S: HierarchyStore>(
    service: &mut WorkPlanService<S>,
    actor: &ActorContext,
    goal_id: EntityId,
    number: u32,
) -> EntityId {
    service
        .save_objective(actor, goal_id, UNSAVED_ID, objective_input(number, vec![]))
        .unwrap()
}

/// PlanData wrapper whose objective and goal deletes can be made to fail
#[derive(Default)]
pub struct FailingStore {
    pub inner: PlanData,
    pub pinned_objectives: HashSet<EntityId>,
    pub pinned_goals: HashSet<EntityId>,
}

impl HierarchyStore for FailingStore {
    fn workplan(&self, id: EntityId) -> Result<Option<WorkPlan>, StoreError> {
        self.inner.workplan(id)
    }

    fn goal(&self, id: EntityId) -> Result<Option<Goal>, StoreError> {
        self.inner.goal(id)
    }

    fn objective(&self, id: EntityId) -> Result<Option<Objective>, StoreError> {
        self.inner.objective(id)
    }

    fn workplans(&self) -> Result<Vec<WorkPlan>, StoreError> {
        self.inner.workplans()
    }

    fn create_workplan(&mut self, workplan: WorkPlan) -> Result<EntityId, StoreError> {
        self.inner.create_workplan(workplan)
    }

    fn update_workplan(&mut self, workplan: WorkPlan) -> Result<(), StoreError> {
        self.inner.update_workplan(workplan)
    }

    fn create_goal(&mut self, goal: Goal) -> Result<EntityId, StoreError> {
        self.inner.create_goal(goal)
    }

    fn update_goal(&mut self, goal: Goal) -> Result<(), StoreError> {
        self.inner.update_goal(goal)
    }

    fn delete_goal(&mut self, id: EntityId) -> Result<(), StoreError> {
        if self.pinned_goals.contains(&id) {
            return Err(StoreError::Rejected(format!("goal {} is pinned", id)));
        }
        self.inner.delete_goal(id)
    }

    fn create_objective(&mut self, objective: Objective) -> Result<EntityId, StoreError> {
        self.inner.create_objective(objective)
    }

    fn update_objective(&mut self, objective: Objective) -> Result<(), StoreError> {
        self.inner.update_objective(objective)
    }

    fn delete_objective(&mut self, id: EntityId) -> Result<(), StoreError> {
        if self.pinned_objectives.contains(&id) {
            return Err(StoreError::Rejected(format!("objective {} is pinned", id)));
        }
        self.inner.delete_objective(id)
    }

    fn children(&self, parent: Parent) -> Result<Vec<EntityId>, StoreError> {
        self.inner.children(parent)
    }

    fn list_children(&self, parent: Parent) -> Result<Vec<EntityId>, StoreError> {
        self.inner.list_children(parent)
    }

    fn set_children(&mut self, parent: Parent, ids: Vec<EntityId>) -> Result<(), StoreError> {
        self.inner.set_children(parent, ids)
    }

    fn set_group(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        group: Option<&str>,
    ) -> Result<(), StoreError> {
        self.inner.set_group(kind, id, group)
    }
}

/// Create a handler backed by a temporary data file
pub fn get_test_handler() -> (WorkPlanServerHandler, NamedTempFile) {
    get_test_handler_with(Config::default())
}

pub fn get_test_handler_with(config: Config) -> (WorkPlanServerHandler, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let handler = WorkPlanServerHandler::new(temp_file.path(), config, false).unwrap();
    (handler, temp_file)
}

/// Extract the id from "... with ID: <id>" responses
pub fn extract_id_from_response(response: &str) -> EntityId {
    let start = response.find("ID: ").expect("response has no ID") + 4;
    response[start..]
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .and_then(|digits| digits.parse().ok())
        .expect("ID is not a number")
}
