//! Server configuration file
//!
//! ```toml
//! [actor]
//! id = 12
//! name = "Dana Reviewer"
//! email = "dana@example.org"
//! role = "editor"
//! memberships = ["great_lakes_editor"]
//!
//! [groups]
//! great_lakes_editor = "Great Lakes ATTC"
//!
//! [policy]
//! reject_edits_when_locked = true
//! ```
//!
//! Every section is optional. Without a file the server acts as an
//! administrator with id 1.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::access::{ActorContext, Capability, GroupMappings, Role};
use crate::service::ServicePolicy;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub actor: ActorConfig,
    pub groups: GroupMappings,
    pub policy: ServicePolicy,
}

/// Who the server acts as
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActorConfig {
    pub id: u64,
    pub name: String,
    pub email: Option<String>,
    /// Capability preset; combined with `capabilities`
    ///
    /// Only the built-in default actor is an administrator. An `[actor]`
    /// table without a role gets exactly the listed capabilities.
    #[serde(default)]
    pub role: Option<Role>,
    pub capabilities: BTreeSet<Capability>,
    pub memberships: Vec<String>,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            id: 1,
            name: "Administrator".to_string(),
            email: None,
            role: Some(Role::Administrator),
            capabilities: BTreeSet::new(),
            memberships: Vec::new(),
        }
    }
}

impl ActorConfig {
    pub fn to_context(&self) -> ActorContext {
        let mut actor = ActorContext::new(self.id, self.name.clone());
        if let Some(role) = self.role {
            actor = actor.with_role(role);
        }
        actor.capabilities.extend(self.capabilities.iter().copied());
        actor.memberships = self.memberships.clone();
        actor.email = self.email.clone();
        actor
    }
}

impl Config {
    /// Read a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
