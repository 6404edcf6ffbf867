use anyhow::{Context, Result};
use git2::{Repository, Signature, Time};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use crate::access::ActorContext;

/// Edit history kept as git commits in the repository holding the data file
///
/// Every recorded change becomes one commit authored by the acting user.
/// Nothing is pulled or pushed.
pub struct PlanHistory {
    repo: Option<Mutex<Repository>>,
}

impl PlanHistory {
    /// Detect the repository containing `file_path`, if any
    pub fn new(file_path: &Path) -> Self {
        let dir = if file_path.is_file() {
            file_path.parent().unwrap_or(file_path).to_path_buf()
        } else {
            file_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf()
        };
        let repo = Repository::discover(&dir).ok().map(Mutex::new);
        Self { repo }
    }

    /// History that records nothing
    pub fn disabled() -> Self {
        Self { repo: None }
    }

    pub fn is_git_managed(&self) -> bool {
        self.repo.is_some()
    }

    /// Commit the current state of `file_path` with the actor as author
    pub fn record(&self, file_path: &Path, actor: &ActorContext, message: &str) -> Result<()> {
        let Some(repo) = &self.repo else {
            return Ok(());
        };
        let repo = repo
            .lock()
            .map_err(|_| anyhow::anyhow!("history repository lock poisoned"))?;

        let workdir = repo
            .workdir()
            .context("Repository has no working directory")?;
        let absolute = file_path
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", file_path.display()))?;
        let workdir = workdir
            .canonicalize()
            .context("Failed to resolve repository working directory")?;
        let relative = absolute
            .strip_prefix(&workdir)
            .context("Data file is not inside the repository")?;

        let mut index = repo.index()?;
        index.add_path(relative)?;
        index.write()?;
        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;

        let parent = match repo.head() {
            Ok(head) => {
                let oid = head.target().context("HEAD has no target")?;
                Some(repo.find_commit(oid)?)
            }
            Err(_) => None,
        };
        let parents: Vec<_> = parent.iter().collect();

        let signature = Self::signature(actor)?;
        let oid = repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;
        debug!(commit = %oid, actor = actor.id, "history recorded");
        Ok(())
    }

    fn signature(actor: &ActorContext) -> Result<Signature<'static>> {
        let name = if actor.name.trim().is_empty() {
            format!("user-{}", actor.id)
        } else {
            actor.name.clone()
        };
        let email = actor
            .email
            .clone()
            .unwrap_or_else(|| format!("user-{}@workplan.localhost", actor.id));

        match Signature::now(&name, &email) {
            Ok(sig) => Ok(sig),
            Err(_) => {
                // Some CI sandboxes have no usable clock
                let time = Time::new(1_700_000_000, 0);
                Signature::new(&name, &email, &time)
                    .context("Failed to create signature with fixed time")
            }
        }
    }
}
