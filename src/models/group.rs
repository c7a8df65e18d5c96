use crate::models::snippet::{Snippet, ValidationError};
use serde::{Deserialize, Serialize};

/// A named, ordered container of snippets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub group_name: String,
    #[serde(default)]
    pub snippets: Vec<Snippet>,
}

impl Group {
    pub fn new(id: impl Into<String>, group_name: &str) -> Self {
        Self {
            id: id.into(),
            group_name: group_name.trim().to_string(),
            snippets: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.group_name.trim().is_empty() {
            return Err(ValidationError::EmptyGroupName);
        }
        Ok(())
    }

    pub fn position_of(&self, snippet_id: &str) -> Option<usize> {
        self.snippets.iter().position(|s| s.id == snippet_id)
    }

    /// Removes and returns the snippet with the given id, if present
    pub fn take_snippet(&mut self, snippet_id: &str) -> Option<Snippet> {
        let index = self.position_of(snippet_id)?;
        Some(self.snippets.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_snippet_removes_only_the_match() {
        let mut group = Group::new("g1", "git");
        group.snippets.push(Snippet::new("a", "status", vec!["git status".into()], false));
        group.snippets.push(Snippet::new("b", "log", vec!["git log".into()], false));

        let taken = group.take_snippet("a").expect("snippet should be found");
        assert_eq!(taken.name, "status");
        assert_eq!(group.snippets.len(), 1);
        assert!(group.take_snippet("missing").is_none());
    }

    #[test]
    fn missing_snippets_field_reads_as_empty() {
        let group: Group = serde_json::from_str(r#"{"id":"g1","groupName":"git"}"#).unwrap();
        assert!(group.snippets.is_empty());
        assert_eq!(Group::new("g2", "  ").validate(), Err(ValidationError::EmptyGroupName));
    }
}
