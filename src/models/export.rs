use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Collection, Group, Snippet};

/// Export file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub snippets: Vec<Snippet>,
    pub groups: Vec<Group>,
}

impl ExportBundle {
    pub fn from_collection(collection: &Collection) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
            snippets: collection.snippets.clone(),
            groups: collection.groups.clone(),
        }
    }
}

/// Counts reported after a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub snippets_added: usize,
    pub groups_added: usize,
    pub skipped: usize,
}

/// Write the collection to a single pretty-printed JSON bundle
pub fn export_collection(collection: &Collection, path: &Path) -> Result<()> {
    let bundle = ExportBundle::from_collection(collection);
    let json =
        serde_json::to_string_pretty(&bundle).context("Failed to serialize collection to JSON")?;
    fs::write(path, json).context("Failed to write JSON export file")?;
    Ok(())
}

pub fn import_bundle(path: &Path) -> Result<ExportBundle> {
    let contents = fs::read_to_string(path).context("Failed to read import file")?;
    serde_json::from_str(&contents).context("Failed to parse JSON import file")
}

/// Merge imported data into an existing collection.
///
/// Snippets and groups whose id is already present are skipped, so the
/// merged collection never holds the same snippet id twice. Imported groups
/// that already exist contribute their unseen snippets to the existing group.
pub fn merge_bundle(collection: &Collection, bundle: ExportBundle) -> (Collection, MergeStats) {
    let mut merged = collection.clone();
    let mut stats = MergeStats::default();
    let mut seen: HashSet<String> = merged
        .all_snippets()
        .map(|(_, s)| s.id.clone())
        .collect();

    for snippet in bundle.snippets {
        if seen.insert(snippet.id.clone()) {
            merged.snippets.push(snippet);
            stats.snippets_added += 1;
        } else {
            stats.skipped += 1;
        }
    }

    for group in bundle.groups {
        let mut fresh = Vec::new();
        for snippet in group.snippets {
            if seen.insert(snippet.id.clone()) {
                fresh.push(snippet);
            } else {
                stats.skipped += 1;
            }
        }
        stats.snippets_added += fresh.len();

        match merged.group_mut(&group.id) {
            Some(existing) => existing.snippets.extend(fresh),
            None => {
                merged.groups.push(Group {
                    id: group.id,
                    group_name: group.group_name,
                    snippets: fresh,
                });
                stats.groups_added += 1;
            }
        }
    }

    (merged, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(id: &str) -> Snippet {
        Snippet::new(id, id, vec![format!("echo {id}")], false)
    }

    #[test]
    fn merge_skips_known_ids_and_keeps_uniqueness() {
        let mut git = Group::new("g1", "git");
        git.snippets.push(snippet("b"));
        let current = Collection::new(vec![snippet("a")], vec![git]);

        let mut imported_git = Group::new("g1", "git");
        imported_git.snippets = vec![snippet("b"), snippet("c")];
        let bundle = ExportBundle {
            version: "0.0.0".into(),
            created_at: Utc::now(),
            snippets: vec![snippet("a"), snippet("d")],
            groups: vec![imported_git, Group::new("g2", "docker")],
        };

        let (merged, stats) = merge_bundle(&current, bundle);
        assert!(merged.check_unique_ids().is_ok());
        assert_eq!(stats, MergeStats { snippets_added: 2, groups_added: 1, skipped: 2 });
        assert_eq!(merged.total_snippets(), 4);
        assert_eq!(merged.group("g1").map(|g| g.snippets.len()), Some(2));
    }

    #[test]
    fn export_then_import_restores_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        let collection = Collection::new(vec![snippet("a")], vec![Group::new("g1", "git")]);

        export_collection(&collection, &path).unwrap();
        let bundle = import_bundle(&path).unwrap();
        assert_eq!(bundle.snippets, collection.snippets);
        assert_eq!(bundle.groups, collection.groups);
    }
}
