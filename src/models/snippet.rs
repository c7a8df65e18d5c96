use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Separator used to chain multi-step commands when no setting overrides it
pub const DEFAULT_COMMAND_SEPARATOR: &str = " && ";

/// A saved shell command, optionally made of several steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "one_or_many")]
    pub command: Vec<String>,
    /// When set, the resolved command is offered for editing before it runs
    #[serde(default)]
    pub is_edit: bool,
}

/// Reasons a snippet or group is rejected before any command is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyName,
    EmptyCommand,
    EmptyGroupName,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "Snippet name cannot be empty"),
            ValidationError::EmptyCommand => write!(f, "Snippet needs at least one command"),
            ValidationError::EmptyGroupName => write!(f, "Group name cannot be empty"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl Snippet {
    /// Builds a snippet from raw form input, trimming the name and dropping
    /// blank command steps.
    pub fn new(id: impl Into<String>, name: &str, command: Vec<String>, is_edit: bool) -> Self {
        Self {
            id: id.into(),
            name: name.trim().to_string(),
            command: command
                .into_iter()
                .map(|step| step.trim().to_string())
                .filter(|step| !step.is_empty())
                .collect(),
            is_edit,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !self.command.iter().any(|step| !step.trim().is_empty()) {
            return Err(ValidationError::EmptyCommand);
        }
        Ok(())
    }

    /// Joins every non-empty step into the single string handed to a shell
    pub fn resolve(&self, separator: &str) -> String {
        self.command
            .iter()
            .map(|step| step.trim())
            .filter(|step| !step.is_empty())
            .collect::<Vec<_>>()
            .join(separator)
    }

    pub fn step_count(&self) -> usize {
        self.command.len()
    }
}

// Early documents stored `command` as a plain string.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(command) => vec![command],
        OneOrMany::Many(commands) => commands,
    })
}
