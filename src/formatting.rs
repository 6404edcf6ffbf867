//! Text rendering of work plans for MCP responses

use crate::plan::{CompletionStatus, Objective, WorkPlan, WorkPlanTree};
use std::fmt;

/// One line per work plan: id, title, status, group
///
/// # Arguments
/// * `workplans` - Work plans to list, already filtered and ordered
///
/// # Returns
/// The listing, or "No work plans found" when the slice is empty
pub fn format_workplan_list(workplans: &[WorkPlan]) -> String {
    if workplans.is_empty() {
        return "No work plans found".to_string();
    }
    workplans
        .iter()
        .map(|w| format!("{}\n", ListLine(w)))
        .collect()
}

/// Render the whole hierarchy as an indented outline
///
/// # Arguments
/// * `tree` - Work plan with its goals and objectives in display order
///
/// # Description
/// Goals are rendered as `Goal <letter>`, objectives beneath them as
/// `Objective <number>`, outputs beneath each objective.
pub fn format_tree(tree: &WorkPlanTree) -> String {
    Outline(tree).to_string()
}

struct ListLine<'a>(&'a WorkPlan);

impl fmt::Display for ListLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = self.0;
        write!(f, "- [{}] {} ({})", w.id, w.title, w.status)?;
        if let Some(group) = &w.group {
            write!(f, " group: {}", group)?;
        }
        if let Some(year) = &w.grant_year {
            write!(f, " grant year: {}", year)?;
        }
        Ok(())
    }
}

struct Outline<'a>(&'a WorkPlanTree);

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.0;
        let w = &tree.workplan;
        writeln!(f, "# {} [{}]", w.title, w.id)?;
        writeln!(f, "Status: {}", w.status)?;
        if let Some(group) = &w.group {
            writeln!(f, "Group: {}", group)?;
        }
        if let Some(year) = &w.grant_year {
            writeln!(f, "Grant year: {}", year)?;
        }
        if let Some(date) = w.publish_date {
            writeln!(f, "Published: {}", date)?;
        }

        if tree.goals.is_empty() {
            f.write_str("\nNo goals yet\n")?;
        }
        for node in &tree.goals {
            let goal = &node.goal;
            writeln!(f, "\nGoal {}: {} [{}]", goal.letter, goal.title, goal.id)?;
            if !goal.description.is_empty() {
                writeln!(f, "  {}", goal.description)?;
            }
            for objective in &node.objectives {
                write_objective(f, objective)?;
            }
        }
        Ok(())
    }
}

fn write_objective(f: &mut fmt::Formatter<'_>, objective: &Objective) -> fmt::Result {
    writeln!(
        f,
        "  Objective {}: {} [{}]",
        objective.number, objective.title, objective.id
    )?;
    if !objective.description.is_empty() {
        writeln!(f, "    {}", objective.description)?;
    }
    if !objective.timeline.is_empty() {
        writeln!(f, "    Timeline: {}", objective.timeline)?;
    }
    if !objective.measurable_outcomes.is_empty() {
        writeln!(f, "    Outcomes: {}", objective.measurable_outcomes)?;
    }
    for output in &objective.outputs {
        match output.letter {
            Some(letter) => writeln!(f, "    Output {}: {}", letter, output.description)?,
            None => writeln!(f, "    Output: {}", output.description)?,
        }
    }
    Ok(())
}

pub fn format_completion(status: &CompletionStatus) -> String {
    format!(
        "Completion: {}% (goals {}/{} = {}%, objectives {}/{} = {}%)",
        status.overall_percentage,
        status.goals.completed,
        status.goals.total,
        status.goals.percentage,
        status.objectives.completed,
        status.objectives.total,
        status.objectives.percentage,
    )
}
