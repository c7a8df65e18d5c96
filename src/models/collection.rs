use crate::models::{Group, Snippet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where a snippet lives: the top-level list or one group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Container {
    Ungrouped,
    Group(String),
}

impl Container {
    pub fn from_group_id(group_id: Option<&str>) -> Self {
        match group_id {
            Some(id) => Container::Group(id.to_string()),
            None => Container::Ungrouped,
        }
    }

    pub fn group_id(&self) -> Option<&str> {
        match self {
            Container::Ungrouped => None,
            Container::Group(id) => Some(id),
        }
    }
}

/// The full application state: ungrouped snippets plus groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub snippets: Vec<Snippet>,
    pub groups: Vec<Group>,
}

impl Collection {
    pub fn new(snippets: Vec<Snippet>, groups: Vec<Group>) -> Self {
        Self { snippets, groups }
    }

    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub fn group_mut(&mut self, group_id: &str) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == group_id)
    }

    /// Locates a snippet anywhere in the collection, top-level list first
    pub fn find_snippet(&self, snippet_id: &str) -> Option<(Container, &Snippet)> {
        if let Some(snippet) = self.snippets.iter().find(|s| s.id == snippet_id) {
            return Some((Container::Ungrouped, snippet));
        }

        self.groups.iter().find_map(|group| {
            group
                .snippets
                .iter()
                .find(|s| s.id == snippet_id)
                .map(|s| (Container::Group(group.id.clone()), s))
        })
    }

    /// Borrow the list backing a container, if the container exists
    pub fn list(&self, container: &Container) -> Option<&Vec<Snippet>> {
        match container {
            Container::Ungrouped => Some(&self.snippets),
            Container::Group(id) => self.group(id).map(|g| &g.snippets),
        }
    }

    pub fn list_mut(&mut self, container: &Container) -> Option<&mut Vec<Snippet>> {
        match container {
            Container::Ungrouped => Some(&mut self.snippets),
            Container::Group(id) => self.group_mut(id).map(|g| &mut g.snippets),
        }
    }

    pub fn all_snippets(&self) -> impl Iterator<Item = (Container, &Snippet)> {
        let ungrouped = self.snippets.iter().map(|s| (Container::Ungrouped, s));
        let grouped = self.groups.iter().flat_map(|group| {
            group
                .snippets
                .iter()
                .map(move |s| (Container::Group(group.id.clone()), s))
        });
        ungrouped.chain(grouped)
    }

    /// `|snippets| + Σ|group.snippets|`
    pub fn total_snippets(&self) -> usize {
        self.snippets.len() + self.groups.iter().map(|g| g.snippets.len()).sum::<usize>()
    }

    /// Returns the first snippet id found more than once across all containers
    pub fn check_unique_ids(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for (_, snippet) in self.all_snippets() {
            if !seen.insert(snippet.id.as_str()) {
                return Err(snippet.id.clone());
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty() && self.groups.is_empty()
    }
}
