//! Nested read model of a work plan
//!
//! A `WorkPlanTree` is what rendering and export consume. Siblings are always
//! ordered by key when the tree is built, regardless of stored order.

use super::entities::{Goal, Objective, WorkPlan, sort_outputs};

/// A work plan with its goals, objectives and outputs resolved
#[derive(Debug, Clone, PartialEq)]
pub struct WorkPlanTree {
    pub workplan: WorkPlan,
    pub goals: Vec<GoalNode>,
}

/// A goal with its objectives resolved
#[derive(Debug, Clone, PartialEq)]
pub struct GoalNode {
    pub goal: Goal,
    pub objectives: Vec<Objective>,
}

/// Completion counts for one level of the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelCompletion {
    pub total: usize,
    pub completed: usize,
    pub percentage: u32,
}

impl LevelCompletion {
    fn new(total: usize, completed: usize) -> Self {
        Self {
            total,
            completed,
            percentage: rounded_percentage(ratio(completed, total)),
        }
    }
}

/// How far along a work plan's data entry is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionStatus {
    pub goals: LevelCompletion,
    pub objectives: LevelCompletion,
    pub overall_percentage: u32,
}

fn ratio(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64
    }
}

fn rounded_percentage(ratio: f64) -> u32 {
    (ratio * 100.0).round() as u32
}

/// A goal counts as complete once it has a description (the letter is always set)
pub fn goal_is_complete(goal: &Goal) -> bool {
    !goal.description.trim().is_empty()
}

/// An objective counts as complete with a description and either a timeline or outcomes
pub fn objective_is_complete(objective: &Objective) -> bool {
    objective.number > 0
        && !objective.description.trim().is_empty()
        && (!objective.timeline.trim().is_empty()
            || !objective.measurable_outcomes.trim().is_empty())
}

impl WorkPlanTree {
    /// Assemble a tree, ordering goals by letter, objectives by number and outputs by letter
    pub fn new(workplan: WorkPlan, mut goals: Vec<GoalNode>) -> Self {
        goals.sort_by_key(|node| node.goal.letter);
        for node in &mut goals {
            node.objectives.sort_by_key(|o| o.number);
            for objective in &mut node.objectives {
                sort_outputs(&mut objective.outputs);
            }
        }
        Self { workplan, goals }
    }

    pub fn objective_count(&self) -> usize {
        self.goals.iter().map(|g| g.objectives.len()).sum()
    }

    /// Compute completion percentages per level and overall
    pub fn completion(&self) -> CompletionStatus {
        let total_goals = self.goals.len();
        let completed_goals = self
            .goals
            .iter()
            .filter(|node| goal_is_complete(&node.goal))
            .count();

        let total_objectives = self.objective_count();
        let completed_objectives = self
            .goals
            .iter()
            .flat_map(|node| node.objectives.iter())
            .filter(|o| objective_is_complete(o))
            .count();

        let overall_percentage = if total_goals > 0 && total_objectives > 0 {
            let mean = (ratio(completed_goals, total_goals)
                + ratio(completed_objectives, total_objectives))
                / 2.0;
            rounded_percentage(mean)
        } else {
            0
        };

        CompletionStatus {
            goals: LevelCompletion::new(total_goals, completed_goals),
            objectives: LevelCompletion::new(total_objectives, completed_objectives),
            overall_percentage,
        }
    }
}
