use crate::plan::entities::{EntityId, Goal, Objective, UNSAVED_ID, WorkPlan};
use std::collections::HashMap;

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

/// In-memory document store for work plans, goals and objectives
pub struct PlanData {
    /// Format version for the TOML file
    pub format_version: u32,

    /// Entities are kept in Vecs so TOML output keeps insertion order
    /// and produces stable diffs in the history repository.
    pub(crate) workplans: Vec<WorkPlan>,
    pub(crate) goals: Vec<Goal>,
    pub(crate) objectives: Vec<Objective>,

    /// parent id → ids of the children whose back-reference points at it
    ///
    /// Goals are filed under their work plan, objectives under their goal.
    /// Entries outlive a deleted parent while orphans remain. Not
    /// serialized; rebuilt from the back-references during deserialization.
    pub(crate) child_index: HashMap<EntityId, Vec<EntityId>>,

    /// Last id handed out. Ids are shared across kinds and never reused.
    pub last_id: EntityId,
}

impl Default for PlanData {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            workplans: Vec::new(),
            goals: Vec::new(),
            objectives: Vec::new(),
            child_index: HashMap::new(),
            last_id: UNSAVED_ID,
        }
    }
}

// Serialize/Deserialize implementations are in serde_impl.rs

impl PlanData {
    /// Create a new empty PlanData instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next entity id
    pub(crate) fn allocate_id(&mut self) -> EntityId {
        self.last_id += 1;
        self.last_id
    }

    pub fn workplan_count(&self) -> usize {
        self.workplans.len()
    }

    pub fn goal_count(&self) -> usize {
        self.goals.len()
    }

    pub fn objective_count(&self) -> usize {
        self.objectives.len()
    }

    /// Children filed under `parent_id` through their back-reference, in creation order
    pub(crate) fn children_of(&self, parent_id: EntityId) -> &[EntityId] {
        self.child_index
            .get(&parent_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn link(&mut self, parent_id: EntityId, child_id: EntityId) {
        let children = self.child_index.entry(parent_id).or_default();
        if !children.contains(&child_id) {
            children.push(child_id);
        }
    }

    fn unlink(&mut self, parent_id: EntityId, child_id: EntityId) {
        if let Some(children) = self.child_index.get_mut(&parent_id) {
            children.retain(|id| *id != child_id);
            if children.is_empty() {
                self.child_index.remove(&parent_id);
            }
        }
    }

    pub(crate) fn find_workplan(&self, id: EntityId) -> Option<&WorkPlan> {
        self.workplans.iter().find(|w| w.id == id)
    }

    pub(crate) fn find_workplan_mut(&mut self, id: EntityId) -> Option<&mut WorkPlan> {
        self.workplans.iter_mut().find(|w| w.id == id)
    }

    pub(crate) fn find_goal(&self, id: EntityId) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub(crate) fn find_goal_mut(&mut self, id: EntityId) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|g| g.id == id)
    }

    pub(crate) fn find_objective(&self, id: EntityId) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.id == id)
    }

    pub(crate) fn find_objective_mut(&mut self, id: EntityId) -> Option<&mut Objective> {
        self.objectives.iter_mut().find(|o| o.id == id)
    }

    /// Insert a work plan under a freshly allocated id
    pub(crate) fn insert_workplan(&mut self, mut workplan: WorkPlan) -> EntityId {
        let id = self.allocate_id();
        workplan.id = id;
        self.workplans.push(workplan);
        id
    }

    /// Insert a goal under a freshly allocated id
    pub(crate) fn insert_goal(&mut self, mut goal: Goal) -> EntityId {
        let id = self.allocate_id();
        goal.id = id;
        self.link(goal.workplan_id, id);
        self.goals.push(goal);
        id
    }

    /// Insert an objective under a freshly allocated id
    pub(crate) fn insert_objective(&mut self, mut objective: Objective) -> EntityId {
        let id = self.allocate_id();
        objective.id = id;
        self.link(objective.goal_id, id);
        self.objectives.push(objective);
        id
    }

    /// Overwrite a stored goal, refiling it if its work plan changed
    pub(crate) fn replace_goal(&mut self, goal: Goal) -> Option<()> {
        let slot = self.find_goal_mut(goal.id)?;
        let previous_parent = slot.workplan_id;
        let (id, parent) = (goal.id, goal.workplan_id);
        *slot = goal;
        if previous_parent != parent {
            self.unlink(previous_parent, id);
            self.link(parent, id);
        }
        Some(())
    }

    /// Overwrite a stored objective, refiling it if its goal changed
    pub(crate) fn replace_objective(&mut self, objective: Objective) -> Option<()> {
        let slot = self.find_objective_mut(objective.id)?;
        let previous_parent = slot.goal_id;
        let (id, parent) = (objective.id, objective.goal_id);
        *slot = objective;
        if previous_parent != parent {
            self.unlink(previous_parent, id);
            self.link(parent, id);
        }
        Some(())
    }

    /// Remove a goal and return it
    pub(crate) fn remove_goal(&mut self, id: EntityId) -> Option<Goal> {
        let pos = self.goals.iter().position(|g| g.id == id)?;
        let goal = self.goals.remove(pos);
        self.unlink(goal.workplan_id, id);
        Some(goal)
    }

    /// Remove an objective and return it
    pub(crate) fn remove_objective(&mut self, id: EntityId) -> Option<Objective> {
        let pos = self.objectives.iter().position(|o| o.id == id)?;
        let objective = self.objectives.remove(pos);
        self.unlink(objective.goal_id, id);
        Some(objective)
    }

    /// Rebuild the child index and repair the id counter after loading
    pub(crate) fn rebuild_index(&mut self) {
        self.child_index.clear();
        let goal_links: Vec<_> = self.goals.iter().map(|g| (g.workplan_id, g.id)).collect();
        let objective_links: Vec<_> = self
            .objectives
            .iter()
            .map(|o| (o.goal_id, o.id))
            .collect();
        for (parent, child) in goal_links.into_iter().chain(objective_links) {
            self.link(parent, child);
        }

        let max_id = self
            .workplans
            .iter()
            .map(|w| w.id)
            .chain(self.goals.iter().map(|g| g.id))
            .chain(self.objectives.iter().map(|o| o.id))
            .max()
            .unwrap_or(UNSAVED_ID);
        if self.last_id < max_id {
            self.last_id = max_id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Letter;
    use crate::plan::entities::InternalStatus;

    fn workplan(title: &str) -> WorkPlan {
        WorkPlan {
            id: UNSAVED_ID,
            title: title.to_string(),
            author: 1,
            publish_date: None,
            grant_year: None,
            group: None,
            status: InternalStatus::Draft,
            goal_ids: Vec::new(),
        }
    }

    fn goal(workplan_id: EntityId) -> Goal {
        Goal {
            id: UNSAVED_ID,
            workplan_id,
            title: "Goal".to_string(),
            letter: Letter::new('A').unwrap(),
            description: String::new(),
            objective_ids: Vec::new(),
            group: None,
        }
    }

    #[test]
    fn test_plan_data_new() {
        let data = PlanData::new();
        assert_eq!(data.workplan_count(), 0);
        assert_eq!(data.goal_count(), 0);
        assert_eq!(data.objective_count(), 0);
        assert_eq!(data.format_version, FORMAT_VERSION);
        assert_eq!(data.last_id, UNSAVED_ID);
    }

    #[test]
    fn test_ids_are_shared_across_kinds() {
        let mut data = PlanData::new();
        let wp = data.insert_workplan(workplan("Plan"));
        let goal = data.insert_goal(goal(wp));
        assert_eq!(wp, 1);
        assert_eq!(goal, 2);
        assert_eq!(data.children_of(wp), &[goal]);
        assert!(data.children_of(99).is_empty());
    }

    #[test]
    fn test_removed_ids_are_not_reused() {
        let mut data = PlanData::new();
        let wp = data.insert_workplan(workplan("Plan"));
        let goal = data.insert_goal(goal(wp));
        assert!(data.remove_goal(goal).is_some());
        assert!(data.remove_goal(goal).is_none());
        assert!(data.children_of(wp).is_empty());
        let next = data.insert_workplan(workplan("Second"));
        assert_eq!(next, goal + 1);
    }

    #[test]
    fn test_rebuild_index_repairs_counter() {
        let mut data = PlanData::new();
        let mut plan = workplan("Imported");
        plan.id = 40;
        data.workplans.push(plan);
        data.rebuild_index();
        assert_eq!(data.last_id, 40);
        assert_eq!(data.allocate_id(), 41);
    }

    #[test]
    fn test_replace_goal_refiles_under_new_workplan() {
        let mut data = PlanData::new();
        let first = data.insert_workplan(workplan("First"));
        let second = data.insert_workplan(workplan("Second"));
        let goal_id = data.insert_goal(goal(first));

        let mut moved = data.find_goal(goal_id).unwrap().clone();
        moved.workplan_id = second;
        assert!(data.replace_goal(moved).is_some());
        assert!(data.children_of(first).is_empty());
        assert_eq!(data.children_of(second), &[goal_id]);
        assert!(data.replace_goal(goal(first)).is_none());
    }
}
