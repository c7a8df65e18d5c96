use crate::models::{Group, Snippet};
use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub const SNIPPETS_FILE: &str = "snippets.json";
pub const GROUPS_FILE: &str = "groups.json";

/// Durable home of the two persisted collections.
///
/// Only the command router writes through this trait. There is no
/// transaction spanning both documents: a failure between the two writes of a
/// move can leave them out of step.
pub trait PersistenceStore {
    fn read_snippets(&self) -> Result<Vec<Snippet>>;
    fn read_groups(&self) -> Result<Vec<Group>>;
    fn write_snippets(&mut self, snippets: &[Snippet]) -> Result<()>;
    fn write_groups(&mut self, groups: &[Group]) -> Result<()>;
    /// Creates empty documents for any collection that does not exist yet
    fn ensure_initialized(&mut self) -> Result<()>;
}

/// Storage Manager for disk operations
#[derive(Debug, Clone)]
pub struct StorageManager {
    data_dir: PathBuf,
    snippets_file: PathBuf,
    groups_file: PathBuf,
}

impl StorageManager {
    /// Storage rooted at the platform data directory (`<data_dir>/termsnip`)
    pub fn new() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .context("Failed to get data directory")?
            .join("termsnip");
        Ok(Self::with_data_dir(data_dir))
    }

    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            snippets_file: data_dir.join(SNIPPETS_FILE),
            groups_file: data_dir.join(GROUPS_FILE),
            data_dir,
        }
    }

    pub fn data_directory(&self) -> &Path {
        &self.data_dir
    }

    /// Copies both documents into a timestamped directory under `backups/`
    pub fn backup(&self) -> Result<PathBuf> {
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let backup_dir = self
            .data_dir
            .join("backups")
            .join(format!("backup_{}", timestamp));
        fs::create_dir_all(&backup_dir).context("Failed to create backup directory")?;

        for file in [&self.snippets_file, &self.groups_file] {
            if file.exists() {
                if let Some(name) = file.file_name() {
                    fs::copy(file, backup_dir.join(name))
                        .with_context(|| format!("Failed to back up {}", file.display()))?;
                }
            }
        }

        Ok(backup_dir)
    }

    fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON in {}", path.display()))
    }

    // Temp file + rename keeps a crash from leaving a truncated document.
    fn write_document<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
        let content = serde_json::to_string_pretty(items).context("Failed to serialize document")?;

        let parent = path.parent().context("Document path has no parent directory")?;
        fs::create_dir_all(parent)?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .context("Document path has no file name")?;
        let tmp_path = parent.join(format!(".{}.tmp", file_name));

        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to replace {}", path.display()))
    }
}

impl PersistenceStore for StorageManager {
    fn read_snippets(&self) -> Result<Vec<Snippet>> {
        Self::read_document(&self.snippets_file)
    }

    fn read_groups(&self) -> Result<Vec<Group>> {
        Self::read_document(&self.groups_file)
    }

    fn write_snippets(&mut self, snippets: &[Snippet]) -> Result<()> {
        Self::write_document(&self.snippets_file, snippets)
    }

    fn write_groups(&mut self, groups: &[Group]) -> Result<()> {
        Self::write_document(&self.groups_file, groups)
    }

    fn ensure_initialized(&mut self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).with_context(|| {
            format!("Failed to create data directory {}", self.data_dir.display())
        })?;

        if !self.snippets_file.exists() {
            Self::write_document::<Snippet>(&self.snippets_file, &[])?;
        }
        if !self.groups_file.exists() {
            Self::write_document::<Group>(&self.groups_file, &[])?;
        }
        Ok(())
    }
}

/// In-memory store, mostly for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub snippets: Option<Vec<Snippet>>,
    pub groups: Option<Vec<Group>>,
    /// Makes every write fail, to exercise the router's failure policy
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceStore for MemoryStore {
    fn read_snippets(&self) -> Result<Vec<Snippet>> {
        Ok(self.snippets.clone().unwrap_or_default())
    }

    fn read_groups(&self) -> Result<Vec<Group>> {
        Ok(self.groups.clone().unwrap_or_default())
    }

    fn write_snippets(&mut self, snippets: &[Snippet]) -> Result<()> {
        if self.fail_writes {
            anyhow::bail!("write of snippets rejected");
        }
        self.snippets = Some(snippets.to_vec());
        Ok(())
    }

    fn write_groups(&mut self, groups: &[Group]) -> Result<()> {
        if self.fail_writes {
            anyhow::bail!("write of groups rejected");
        }
        self.groups = Some(groups.to_vec());
        Ok(())
    }

    fn ensure_initialized(&mut self) -> Result<()> {
        self.snippets.get_or_insert_with(Vec::new);
        self.groups.get_or_insert_with(Vec::new);
        Ok(())
    }
}
