use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::access::ActorContext;
use crate::history::PlanHistory;
use crate::plan::PlanData;

/// TOML file holding every work plan, with optional git history
pub struct Storage {
    file_path: PathBuf,
    history: PlanHistory,
}

impl Storage {
    /// `record_history` turns on one git commit per save when the file lives
    /// inside a repository
    pub fn new(file_path: impl AsRef<Path>, record_history: bool) -> Self {
        let file_path = file_path.as_ref().to_path_buf();
        let history = if record_history {
            PlanHistory::new(&file_path)
        } else {
            PlanHistory::disabled()
        };
        if record_history && !history.is_git_managed() {
            warn!(path = %file_path.display(), "history requested but no git repository found");
        }
        Self { file_path, history }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Load the data file; a missing file is an empty store
    pub fn load(&self) -> Result<PlanData> {
        if !self.file_path.exists() {
            debug!(path = %self.file_path.display(), "data file missing, starting empty");
            return Ok(PlanData::new());
        }

        let content = fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to read {}", self.file_path.display()))?;
        let data: PlanData = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.file_path.display()))?;
        Ok(data)
    }

    pub fn save(&self, data: &PlanData) -> Result<()> {
        let content = toml::to_string_pretty(data)?;
        fs::write(&self.file_path, content)
            .with_context(|| format!("Failed to write {}", self.file_path.display()))?;
        Ok(())
    }

    /// Save and record the change in the edit history
    pub fn save_with_message(&self, data: &PlanData, actor: &ActorContext, message: &str) -> Result<()> {
        self.save(data)?;
        self.history
            .record(&self.file_path, actor, message)
            .context("Failed to record history")?;
        Ok(())
    }
}
