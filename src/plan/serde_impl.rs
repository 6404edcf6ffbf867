//! Serialization and deserialization implementations for PlanData
//!
//! The child index is not written to disk. Deserialization goes through a
//! helper struct and rebuilds the index and id counter from the entity lists.

use super::entities::{Goal, Objective, WorkPlan, sort_outputs};
use super::plan_data::{FORMAT_VERSION, PlanData};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Deserialize)]
#[serde(default)]
struct PlanDataHelper {
    format_version: u32,
    last_id: u64,
    workplans: Vec<WorkPlan>,
    goals: Vec<Goal>,
    objectives: Vec<Objective>,
}

impl Default for PlanDataHelper {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            last_id: 0,
            workplans: Vec::new(),
            goals: Vec::new(),
            objectives: Vec::new(),
        }
    }
}

impl Serialize for PlanData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("PlanData", 5)?;
        state.serialize_field("format_version", &self.format_version)?;
        state.serialize_field("last_id", &self.last_id)?;
        state.serialize_field("workplans", &self.workplans)?;
        state.serialize_field("goals", &self.goals)?;
        state.serialize_field("objectives", &self.objectives)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for PlanData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let helper = PlanDataHelper::deserialize(deserializer)?;

        if helper.format_version > FORMAT_VERSION {
            return Err(serde::de::Error::custom(format!(
                "unsupported format_version {} (this build reads up to {})",
                helper.format_version, FORMAT_VERSION
            )));
        }

        let mut objectives = helper.objectives;
        // Hand-edited files may list outputs out of order
        for objective in &mut objectives {
            sort_outputs(&mut objective.outputs);
        }

        let mut data = PlanData {
            format_version: FORMAT_VERSION,
            workplans: helper.workplans,
            goals: helper.goals,
            objectives,
            child_index: Default::default(),
            last_id: helper.last_id,
        };
        data.rebuild_index();
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_document() {
        let data: PlanData = toml::from_str("").unwrap();
        assert_eq!(data.workplan_count(), 0);
        assert_eq!(data.format_version, FORMAT_VERSION);
    }

    #[test]
    fn test_deserialize_rebuilds_index() {
        let toml_str = r#"
format_version = 1
last_id = 3

[[workplans]]
id = 1
title = "Regional Plan - 2024"
author = 5
group = "Great Lakes ATTC"
status = "Submitted"
goal_ids = [2]

[[goals]]
id = 2
workplan_id = 1
title = "Workforce"
letter = "a"
description = "Grow the workforce"
objective_ids = [3]
group = "Great Lakes ATTC"

[[objectives]]
id = 3
goal_id = 2
title = "Trainings"
number = 1
outputs = [
    { description = "unlettered" },
    { letter = "B", description = "second" },
    { letter = "a", description = "first" },
]
"#;
        let data: PlanData = toml::from_str(toml_str).unwrap();
        assert_eq!(data.children_of(1), &[2]);
        assert_eq!(data.children_of(2), &[3]);
        assert_eq!(data.last_id, 3);

        let goal = data.find_goal(2).unwrap();
        assert_eq!(goal.letter.as_char(), 'A');

        let objective = data.find_objective(3).unwrap();
        let descriptions: Vec<&str> = objective
            .outputs
            .iter()
            .map(|o| o.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["first", "second", "unlettered"]);
    }

    #[test]
    fn test_deserialize_rejects_newer_format() {
        let result: Result<PlanData, _> = toml::from_str("format_version = 99\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_invalid_letter() {
        let toml_str = r#"
[[goals]]
id = 2
workplan_id = 1
title = "Bad"
letter = "AB"
"#;
        let result: Result<PlanData, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }
}
