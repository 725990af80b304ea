//! Durable reminder snapshot file
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use super::entry::ReminderEntry;

/// Snapshot file name, relative to the process working directory
pub const REMINDERS_FILE: &str = "reminders.bin";

/// Whole-file binary snapshot of the pending reminder set
///
/// The file is read once at startup and rewritten wholesale on each save;
/// only the engine thread ever writes it.
pub struct ReminderStore {
    path: PathBuf,
}

impl ReminderStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ReminderStore { path: path.into() }
    }

    /// Store at the default location in the current working directory
    pub fn at_default_path() -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot resolve working directory")?;
        Ok(Self::new(cwd.join(REMINDERS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted entry set
    ///
    /// A missing file is created empty and yields an empty set, as does an
    /// existing empty file. A non-empty file that fails to decode is an
    /// error: startup must surface it instead of silently discarding
    /// scheduled reminders.
    pub fn load(&self) -> Result<Vec<ReminderEntry>> {
        if !self.path.exists() {
            fs::File::create(&self.path)
                .with_context(|| format!("failed to create {}", self.path.display()))?;
            info!("Created empty reminder file at {}", self.path.display());
            return Ok(Vec::new());
        }

        let bytes = fs::read(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }

        let entries: Vec<ReminderEntry> = bincode::deserialize(&bytes).with_context(|| {
            format!(
                "reminder file {} is corrupt; refusing to discard it",
                self.path.display()
            )
        })?;
        info!(
            "Loaded {} pending reminder(s) from {}",
            entries.len(),
            self.path.display()
        );
        Ok(entries)
    }

    /// Persist the full entry set, atomically replacing the snapshot
    pub fn save(&self, entries: &[ReminderEntry]) -> Result<()> {
        let bytes = bincode::serialize(entries).context("failed to encode reminder snapshot")?;

        // Write a sibling temp file first so a crash mid-write cannot
        // leave a torn snapshot behind.
        let tmp = self.path.with_extension("bin.tmp");
        fs::write(&tmp, &bytes)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;

        debug!(
            "Saved {} reminder(s) ({} bytes) to {}",
            entries.len(),
            bytes.len(),
            self.path.display()
        );
        Ok(())
    }
}
