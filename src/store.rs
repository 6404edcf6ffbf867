//! Hierarchy store interface consumed by the work plan service
//!
//! The service never touches persistence directly. Anything that can read and
//! write entities by id and keep ordered child lists can back it; `PlanData`
//! is the in-memory implementation saved to TOML by [`crate::Storage`].

use crate::plan::{EntityId, EntityKind, Goal, Objective, PlanData, WorkPlan};

/// Errors raised by a hierarchy store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} {id} does not exist in the store")]
    MissingEntity { kind: EntityKind, id: EntityId },
    /// Backend-specific refusal, e.g. a remote store declining a write
    #[error("store rejected the operation: {0}")]
    Rejected(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Owner of an ordered relationship list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// Goal list of a work plan
    WorkPlan(EntityId),
    /// Objective list of a goal
    Goal(EntityId),
}

impl Parent {
    pub fn id(self) -> EntityId {
        match self {
            Parent::WorkPlan(id) | Parent::Goal(id) => id,
        }
    }
}

/// Entity-by-id storage with ordered parent → child lists
///
/// Implementations offer per-entity atomicity at most; multi-step operations
/// are sequenced by the caller.
pub trait HierarchyStore {
    fn workplan(&self, id: EntityId) -> StoreResult<Option<WorkPlan>>;
    fn goal(&self, id: EntityId) -> StoreResult<Option<Goal>>;
    fn objective(&self, id: EntityId) -> StoreResult<Option<Objective>>;
    fn workplans(&self) -> StoreResult<Vec<WorkPlan>>;

    /// Persist a new work plan, ignoring its id field, and return the assigned id
    fn create_workplan(&mut self, workplan: WorkPlan) -> StoreResult<EntityId>;
    fn update_workplan(&mut self, workplan: WorkPlan) -> StoreResult<()>;

    fn create_goal(&mut self, goal: Goal) -> StoreResult<EntityId>;
    fn update_goal(&mut self, goal: Goal) -> StoreResult<()>;
    /// Remove a single goal; children are not touched
    fn delete_goal(&mut self, id: EntityId) -> StoreResult<()>;

    fn create_objective(&mut self, objective: Objective) -> StoreResult<EntityId>;
    fn update_objective(&mut self, objective: Objective) -> StoreResult<()>;
    fn delete_objective(&mut self, id: EntityId) -> StoreResult<()>;

    /// Ordered child ids of a parent
    fn children(&self, parent: Parent) -> StoreResult<Vec<EntityId>>;
    /// Ids of the entities whose back-reference points at `parent`
    ///
    /// Answered from the children themselves, so it works for a deleted
    /// parent and finds children missing from the ordered list. Empty when
    /// nothing refers to the parent.
    fn list_children(&self, parent: Parent) -> StoreResult<Vec<EntityId>>;
    fn set_children(&mut self, parent: Parent, ids: Vec<EntityId>) -> StoreResult<()>;

    /// Overwrite the group tag of a goal or objective
    fn set_group(&mut self, kind: EntityKind, id: EntityId, group: Option<&str>)
    -> StoreResult<()>;

    /// Append a child id unless it is already listed
    fn append_child(&mut self, parent: Parent, child: EntityId) -> StoreResult<()> {
        let mut ids = self.children(parent)?;
        if !ids.contains(&child) {
            ids.push(child);
            self.set_children(parent, ids)?;
        }
        Ok(())
    }

    /// Remove a child id from the parent's list
    fn remove_child(&mut self, parent: Parent, child: EntityId) -> StoreResult<()> {
        let mut ids = self.children(parent)?;
        let before = ids.len();
        ids.retain(|id| *id != child);
        if ids.len() != before {
            self.set_children(parent, ids)?;
        }
        Ok(())
    }
}

fn missing(kind: EntityKind, id: EntityId) -> StoreError {
    StoreError::MissingEntity { kind, id }
}

impl HierarchyStore for PlanData {
    fn workplan(&self, id: EntityId) -> StoreResult<Option<WorkPlan>> {
        Ok(self.find_workplan(id).cloned())
    }

    fn goal(&self, id: EntityId) -> StoreResult<Option<Goal>> {
        Ok(self.find_goal(id).cloned())
    }

    fn objective(&self, id: EntityId) -> StoreResult<Option<Objective>> {
        Ok(self.find_objective(id).cloned())
    }

    fn workplans(&self) -> StoreResult<Vec<WorkPlan>> {
        Ok(self.workplans.clone())
    }

    fn create_workplan(&mut self, workplan: WorkPlan) -> StoreResult<EntityId> {
        Ok(self.insert_workplan(workplan))
    }

    fn update_workplan(&mut self, workplan: WorkPlan) -> StoreResult<()> {
        let slot = self
            .find_workplan_mut(workplan.id)
            .ok_or_else(|| missing(EntityKind::WorkPlan, workplan.id))?;
        *slot = workplan;
        Ok(())
    }

    fn create_goal(&mut self, goal: Goal) -> StoreResult<EntityId> {
        Ok(self.insert_goal(goal))
    }

    fn update_goal(&mut self, goal: Goal) -> StoreResult<()> {
        let id = goal.id;
        self.replace_goal(goal)
            .ok_or_else(|| missing(EntityKind::Goal, id))
    }

    fn delete_goal(&mut self, id: EntityId) -> StoreResult<()> {
        self.remove_goal(id)
            .map(|_| ())
            .ok_or_else(|| missing(EntityKind::Goal, id))
    }

    fn create_objective(&mut self, objective: Objective) -> StoreResult<EntityId> {
        Ok(self.insert_objective(objective))
    }

    fn update_objective(&mut self, objective: Objective) -> StoreResult<()> {
        let id = objective.id;
        self.replace_objective(objective)
            .ok_or_else(|| missing(EntityKind::Objective, id))
    }

    fn delete_objective(&mut self, id: EntityId) -> StoreResult<()> {
        self.remove_objective(id)
            .map(|_| ())
            .ok_or_else(|| missing(EntityKind::Objective, id))
    }

    fn children(&self, parent: Parent) -> StoreResult<Vec<EntityId>> {
        match parent {
            Parent::WorkPlan(id) => self
                .find_workplan(id)
                .map(|w| w.goal_ids.clone())
                .ok_or_else(|| missing(EntityKind::WorkPlan, id)),
            Parent::Goal(id) => self
                .find_goal(id)
                .map(|g| g.objective_ids.clone())
                .ok_or_else(|| missing(EntityKind::Goal, id)),
        }
    }

    fn list_children(&self, parent: Parent) -> StoreResult<Vec<EntityId>> {
        Ok(self.children_of(parent.id()).to_vec())
    }

    fn set_children(&mut self, parent: Parent, ids: Vec<EntityId>) -> StoreResult<()> {
        match parent {
            Parent::WorkPlan(id) => {
                let workplan = self
                    .find_workplan_mut(id)
                    .ok_or_else(|| missing(EntityKind::WorkPlan, id))?;
                workplan.goal_ids = ids;
            }
            Parent::Goal(id) => {
                let goal = self
                    .find_goal_mut(id)
                    .ok_or_else(|| missing(EntityKind::Goal, id))?;
                goal.objective_ids = ids;
            }
        }
        Ok(())
    }

    fn set_group(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        group: Option<&str>,
    ) -> StoreResult<()> {
        let group = group.map(str::to_string);
        match kind {
            EntityKind::WorkPlan => {
                self.find_workplan_mut(id)
                    .ok_or_else(|| missing(kind, id))?
                    .group = group;
            }
            EntityKind::Goal => {
                self.find_goal_mut(id).ok_or_else(|| missing(kind, id))?.group = group;
            }
            EntityKind::Objective => {
                self.find_objective_mut(id)
                    .ok_or_else(|| missing(kind, id))?
                    .group = group;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Letter;
    use crate::plan::{InternalStatus, UNSAVED_ID};

    fn seeded() -> (PlanData, EntityId, EntityId) {
        let mut data = PlanData::new();
        let wp = data
            .create_workplan(WorkPlan {
                id: UNSAVED_ID,
                title: "Plan".to_string(),
                author: 1,
                publish_date: None,
                grant_year: None,
                group: Some("North".to_string()),
                status: InternalStatus::Draft,
                goal_ids: vec![],
            })
            .unwrap();
        let goal = data
            .create_goal(Goal {
                id: UNSAVED_ID,
                workplan_id: wp,
                title: "Goal".to_string(),
                letter: Letter::new('A').unwrap(),
                description: String::new(),
                objective_ids: vec![],
                group: None,
            })
            .unwrap();
        (data, wp, goal)
    }

    #[test]
    fn test_append_and_remove_child() {
        let (mut data, wp, goal) = seeded();
        data.append_child(Parent::WorkPlan(wp), goal).unwrap();
        data.append_child(Parent::WorkPlan(wp), goal).unwrap();
        assert_eq!(data.children(Parent::WorkPlan(wp)).unwrap(), vec![goal]);

        data.remove_child(Parent::WorkPlan(wp), goal).unwrap();
        assert!(data.children(Parent::WorkPlan(wp)).unwrap().is_empty());
    }

    #[test]
    fn test_children_of_missing_parent() {
        let (data, _, _) = seeded();
        let err = data.children(Parent::Goal(404)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingEntity {
                kind: EntityKind::Goal,
                id: 404
            }
        ));
    }

    #[test]
    fn test_set_group_overwrites() {
        let (mut data, _, goal) = seeded();
        data.set_group(EntityKind::Goal, goal, Some("South")).unwrap();
        assert_eq!(data.goal(goal).unwrap().unwrap().group.as_deref(), Some("South"));
        data.set_group(EntityKind::Goal, goal, None).unwrap();
        assert_eq!(data.goal(goal).unwrap().unwrap().group, None);
    }

    #[test]
    fn test_update_missing_goal_fails() {
        let (mut data, _, goal) = seeded();
        let mut copy = data.goal(goal).unwrap().unwrap();
        copy.id = 999;
        assert!(data.update_goal(copy).is_err());
    }

    #[test]
    fn test_list_children_follows_back_references() {
        let (mut data, wp, goal) = seeded();
        // The goal was created but never appended to the ordered list
        assert!(data.children(Parent::WorkPlan(wp)).unwrap().is_empty());
        assert_eq!(data.list_children(Parent::WorkPlan(wp)).unwrap(), vec![goal]);

        let objective = data
            .create_objective(Objective {
                id: UNSAVED_ID,
                goal_id: goal,
                title: "Objective".to_string(),
                number: 1,
                description: String::new(),
                timeline: String::new(),
                measurable_outcomes: String::new(),
                outputs: vec![],
                group: None,
            })
            .unwrap();
        data.delete_goal(goal).unwrap();
        assert!(data.list_children(Parent::WorkPlan(wp)).unwrap().is_empty());
        // An orphan stays reachable through its back-reference
        assert_eq!(data.list_children(Parent::Goal(goal)).unwrap(), vec![objective]);

        data.delete_objective(objective).unwrap();
        assert!(data.list_children(Parent::Goal(goal)).unwrap().is_empty());
    }

    #[test]
    fn test_delete_goal_twice() {
        let (mut data, _, goal) = seeded();
        assert!(data.delete_goal(goal).is_ok());
        assert!(data.delete_goal(goal).is_err());
    }
}
