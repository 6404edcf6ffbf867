//! Group-based access control for work plans
//!
//! An actor is described by an injected [`ActorContext`]: its capabilities and
//! its raw group memberships. Memberships are mapped to group tags through a
//! [`GroupMappings`] table. Goals and objectives never carry their own
//! permission; every check goes through the ancestor work plan.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::plan::WorkPlan;

/// Permission flags an actor may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ManageWorkplans,
    EditWorkplans,
    /// Administrator-equivalent: bypasses group filtering entirely
    EditOthersWorkplans,
    PublishWorkplans,
    ReadPrivateWorkplans,
    DeleteWorkplans,
    DeletePrivateWorkplans,
    DeletePublishedWorkplans,
    DeleteOthersWorkplans,
    EditPrivateWorkplans,
    EditPublishedWorkplans,
}

impl Capability {
    pub const ALL: [Capability; 11] = [
        Capability::ManageWorkplans,
        Capability::EditWorkplans,
        Capability::EditOthersWorkplans,
        Capability::PublishWorkplans,
        Capability::ReadPrivateWorkplans,
        Capability::DeleteWorkplans,
        Capability::DeletePrivateWorkplans,
        Capability::DeletePublishedWorkplans,
        Capability::DeleteOthersWorkplans,
        Capability::EditPrivateWorkplans,
        Capability::EditPublishedWorkplans,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::ManageWorkplans => "manage_workplans",
            Capability::EditWorkplans => "edit_workplans",
            Capability::EditOthersWorkplans => "edit_others_workplans",
            Capability::PublishWorkplans => "publish_workplans",
            Capability::ReadPrivateWorkplans => "read_private_workplans",
            Capability::DeleteWorkplans => "delete_workplans",
            Capability::DeletePrivateWorkplans => "delete_private_workplans",
            Capability::DeletePublishedWorkplans => "delete_published_workplans",
            Capability::DeleteOthersWorkplans => "delete_others_workplans",
            Capability::EditPrivateWorkplans => "edit_private_workplans",
            Capability::EditPublishedWorkplans => "edit_published_workplans",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Capability::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == trimmed)
            .ok_or_else(|| format!("Unknown capability '{}'", s))
    }
}

/// Capability presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Every capability, including `edit_others_workplans`
    Administrator,
    /// Group-restricted editing: no `edit_others_workplans`
    Editor,
}

impl Role {
    pub fn capabilities(self) -> BTreeSet<Capability> {
        match self {
            Role::Administrator => Capability::ALL.into_iter().collect(),
            Role::Editor => [
                Capability::ManageWorkplans,
                Capability::EditWorkplans,
                Capability::PublishWorkplans,
                Capability::DeleteWorkplans,
            ]
            .into_iter()
            .collect(),
        }
    }
}

/// Identity of the actor performing an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    pub id: u64,
    pub name: String,
    pub email: Option<String>,
    pub capabilities: BTreeSet<Capability>,
    /// Raw membership keys, mapped to group tags by [`GroupMappings`]
    pub memberships: Vec<String>,
}

impl ActorContext {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            capabilities: BTreeSet::new(),
            memberships: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.capabilities.extend(role.capabilities());
        self
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn with_membership(mut self, membership: impl Into<String>) -> Self {
        self.memberships.push(membership.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn is_administrator(&self) -> bool {
        self.can(Capability::EditOthersWorkplans)
    }
}

/// Group tags an actor may act on
///
/// `All` is an explicit variant so it can never be confused with an empty set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessibleGroups {
    All,
    Only(BTreeSet<String>),
}

impl AccessibleGroups {
    pub fn contains(&self, group: &str) -> bool {
        match self {
            AccessibleGroups::All => true,
            AccessibleGroups::Only(groups) => groups.contains(group),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AccessibleGroups::Only(groups) if groups.is_empty())
    }
}

/// Membership key → group tag lookup table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupMappings(BTreeMap<String, String>);

impl Default for GroupMappings {
    fn default() -> Self {
        Self::from_pairs([
            ("great_lakes_editor", "Great Lakes ATTC"),
            ("mid_america_editor", "Mid-America ATTC"),
            ("central_east_editor", "Central East ATTC"),
        ])
    }
}

impl GroupMappings {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn group_for(&self, membership: &str) -> Option<&str> {
        self.0.get(membership).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decides which work plans an actor may see and change
#[derive(Debug, Clone, Default)]
pub struct AccessResolver {
    mappings: GroupMappings,
}

impl AccessResolver {
    pub fn new(mappings: GroupMappings) -> Self {
        Self { mappings }
    }

    /// Map an actor's memberships to the group tags it may act on
    pub fn accessible_groups(&self, actor: &ActorContext) -> AccessibleGroups {
        if actor.is_administrator() {
            return AccessibleGroups::All;
        }
        let groups = actor
            .memberships
            .iter()
            .filter_map(|m| self.mappings.group_for(m))
            .map(str::to_string)
            .collect();
        AccessibleGroups::Only(groups)
    }

    /// Whether the actor may edit this work plan and everything below it
    pub fn can_edit_workplan(&self, actor: &ActorContext, workplan: &WorkPlan) -> bool {
        if !actor.can(Capability::EditWorkplans) {
            return false;
        }
        if actor.is_administrator() {
            return true;
        }
        if workplan.author == actor.id {
            return true;
        }
        match (self.accessible_groups(actor), workplan.group.as_deref()) {
            (AccessibleGroups::Only(groups), Some(group)) => groups.contains(group),
            _ => false,
        }
    }

    /// Whether the actor may delete goals and objectives of this work plan
    pub fn can_delete_in_workplan(&self, actor: &ActorContext, workplan: &WorkPlan) -> bool {
        actor.can(Capability::DeleteWorkplans) && self.can_edit_workplan(actor, workplan)
    }

    /// Work plans the actor may see
    ///
    /// Administrators see everything. Others see the plans of their groups, or
    /// only their own plans when they belong to no mapped group.
    pub fn filter_visible_workplans(
        &self,
        actor: &ActorContext,
        workplans: Vec<WorkPlan>,
    ) -> Vec<WorkPlan> {
        match self.accessible_groups(actor) {
            AccessibleGroups::All => workplans,
            groups if groups.is_empty() => workplans
                .into_iter()
                .filter(|w| w.author == actor.id)
                .collect(),
            groups => workplans
                .into_iter()
                .filter(|w| w.group.as_deref().is_some_and(|g| groups.contains(g)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::InternalStatus;

    fn plan(id: u64, author: u64, group: Option<&str>) -> WorkPlan {
        WorkPlan {
            id,
            title: format!("Plan {}", id),
            author,
            publish_date: None,
            grant_year: None,
            group: group.map(str::to_string),
            status: InternalStatus::Draft,
            goal_ids: vec![],
        }
    }

    fn resolver() -> AccessResolver {
        AccessResolver::new(GroupMappings::from_pairs([
            ("east_editor", "East"),
            ("west_editor", "West"),
        ]))
    }

    #[test]
    fn test_administrator_sees_all_groups() {
        let admin = ActorContext::new(1, "Admin").with_role(Role::Administrator);
        assert_eq!(resolver().accessible_groups(&admin), AccessibleGroups::All);
    }

    #[test]
    fn test_memberships_map_to_groups() {
        let editor = ActorContext::new(2, "Editor")
            .with_role(Role::Editor)
            .with_membership("east_editor")
            .with_membership("unmapped");
        let groups = resolver().accessible_groups(&editor);
        assert!(groups.contains("East"));
        assert!(!groups.contains("West"));
        assert!(!groups.is_empty());
    }

    #[test]
    fn test_no_memberships_is_empty_not_all() {
        let editor = ActorContext::new(2, "Editor").with_role(Role::Editor);
        let groups = resolver().accessible_groups(&editor);
        assert!(groups.is_empty());
        assert_ne!(groups, AccessibleGroups::All);
    }

    #[test]
    fn test_can_edit_by_group() {
        let editor = ActorContext::new(2, "Editor")
            .with_role(Role::Editor)
            .with_membership("east_editor");
        let r = resolver();
        assert!(!r.can_edit_workplan(&editor, &plan(10, 9, Some("West"))));
        assert!(r.can_edit_workplan(&editor, &plan(11, 9, Some("East"))));
        assert!(!r.can_edit_workplan(&editor, &plan(12, 9, None)));
    }

    #[test]
    fn test_can_edit_requires_base_capability() {
        let author_without_caps = ActorContext::new(9, "Viewer").with_membership("east_editor");
        assert!(!resolver().can_edit_workplan(&author_without_caps, &plan(10, 9, Some("East"))));
    }

    #[test]
    fn test_author_can_edit_own_plan() {
        let editor = ActorContext::new(9, "Author").with_role(Role::Editor);
        assert!(resolver().can_edit_workplan(&editor, &plan(10, 9, Some("West"))));
    }

    #[test]
    fn test_administrator_can_edit_anything() {
        let admin = ActorContext::new(1, "Admin").with_role(Role::Administrator);
        assert!(resolver().can_edit_workplan(&admin, &plan(10, 9, None)));
    }

    #[test]
    fn test_delete_requires_delete_capability() {
        let editor = ActorContext::new(9, "Author").with_capability(Capability::EditWorkplans);
        let r = resolver();
        let own = plan(10, 9, None);
        assert!(r.can_edit_workplan(&editor, &own));
        assert!(!r.can_delete_in_workplan(&editor, &own));
        let editor = editor.with_capability(Capability::DeleteWorkplans);
        assert!(r.can_delete_in_workplan(&editor, &own));
    }

    #[test]
    fn test_filter_visible_workplans() {
        let plans = vec![
            plan(1, 5, Some("East")),
            plan(2, 5, Some("West")),
            plan(3, 7, Some("West")),
            plan(4, 7, None),
        ];
        let r = resolver();

        let admin = ActorContext::new(1, "Admin").with_role(Role::Administrator);
        assert_eq!(r.filter_visible_workplans(&admin, plans.clone()).len(), 4);

        let west = ActorContext::new(5, "West").with_role(Role::Editor).with_membership("west_editor");
        let ids: Vec<u64> = r
            .filter_visible_workplans(&west, plans.clone())
            .iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(ids, vec![2, 3]);

        let loner = ActorContext::new(7, "Loner").with_role(Role::Editor);
        let ids: Vec<u64> = r
            .filter_visible_workplans(&loner, plans)
            .iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn test_capability_parsing() {
        assert_eq!(
            "edit_others_workplans".parse::<Capability>(),
            Ok(Capability::EditOthersWorkplans)
        );
        assert!("root".parse::<Capability>().is_err());
        for capability in Capability::ALL {
            assert_eq!(capability.as_str().parse::<Capability>(), Ok(capability));
        }
    }

    #[test]
    fn test_role_presets() {
        assert_eq!(Role::Administrator.capabilities().len(), Capability::ALL.len());
        let editor = Role::Editor.capabilities();
        assert!(editor.contains(&Capability::DeleteWorkplans));
        assert!(!editor.contains(&Capability::EditOthersWorkplans));
    }

    #[test]
    fn test_default_mappings() {
        let mappings = GroupMappings::default();
        assert_eq!(mappings.group_for("great_lakes_editor"), Some("Great Lakes ATTC"));
        assert_eq!(mappings.len(), 3);
    }
}
