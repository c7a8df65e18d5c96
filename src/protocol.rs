//! Messages exchanged between a frontend and the command router.
//!
//! Every message is a JSON object `{ "type", "value", "requestId"? }`. Commands
//! flow frontend → host, pushes flow host → frontend. A push produced while
//! handling a command echoes that command's `requestId` so the frontend can
//! recognise snapshots that arrive out of date.

use crate::models::{Group, Snippet};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub type RequestId = u64;

/// A snippet together with the container it should end up in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetPlacement {
    pub snippet: Snippet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// Full replacement arrays for both collections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub snippets: Vec<Snippet>,
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Command {
    GetSnippets,
    GetGroups,
    AddSnippet(SnippetPlacement),
    AddGroup(Group),
    UpdateSnippet(SnippetPlacement),
    UpdateGroup(Group),
    DeleteSnippet(String),
    DeleteGroup(String),
    UpdateOrder(OrderPayload),
    RunSnippet(Snippet),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetSnippets => "getSnippets",
            Command::GetGroups => "getGroups",
            Command::AddSnippet(_) => "addSnippet",
            Command::AddGroup(_) => "addGroup",
            Command::UpdateSnippet(_) => "updateSnippet",
            Command::UpdateGroup(_) => "updateGroup",
            Command::DeleteSnippet(_) => "deleteSnippet",
            Command::DeleteGroup(_) => "deleteGroup",
            Command::UpdateOrder(_) => "updateOrder",
            Command::RunSnippet(_) => "runSnippet",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Push {
    SnippetsData(Vec<Snippet>),
    GroupsData(Vec<Group>),
}

/// Which collection a push replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushKind {
    Snippets,
    Groups,
}

impl Push {
    pub fn kind(&self) -> PushKind {
        match self {
            Push::SnippetsData(_) => PushKind::Snippets,
            Push::GroupsData(_) => PushKind::Groups,
        }
    }
}

/// Frontend → host envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(flatten)]
    pub command: Command,
    #[serde(rename = "requestId", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
}

impl Request {
    pub fn new(command: Command, request_id: RequestId) -> Self {
        Self {
            command,
            request_id: Some(request_id),
        }
    }

    /// A command sent without correlation, as older frontends do
    pub fn bare(command: Command) -> Self {
        Self {
            command,
            request_id: None,
        }
    }
}

/// Host → frontend envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    #[serde(flatten)]
    pub push: Push,
    #[serde(rename = "requestId", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
}

impl PushMessage {
    pub fn new(push: Push, request_id: Option<RequestId>) -> Self {
        Self { push, request_id }
    }
}

pub fn encode<T: Serialize>(message: &T) -> Result<String> {
    serde_json::to_string(message).context("Failed to encode message")
}

pub fn decode<T: for<'de> Deserialize<'de>>(line: &str) -> Result<T> {
    serde_json::from_str(line).with_context(|| format!("Failed to decode message: {}", line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn command_wire_shape() {
        let request = Request::new(
            Command::AddSnippet(SnippetPlacement {
                snippet: Snippet::new("a", "list", vec!["ls -la".into()], false),
                group_id: Some("g1".into()),
            }),
            7,
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "addSnippet",
                "value": {
                    "snippet": {"id": "a", "name": "list", "command": ["ls -la"], "isEdit": false},
                    "groupId": "g1"
                },
                "requestId": 7
            })
        );
    }

    #[test]
    fn unit_commands_decode_without_value_or_request_id() {
        let request: Request = decode(r#"{"type":"getSnippets"}"#).unwrap();
        assert_eq!(request, Request::bare(Command::GetSnippets));

        let request: Request = decode(r#"{"type":"deleteSnippet","value":"b","requestId":3}"#).unwrap();
        assert_eq!(request, Request::new(Command::DeleteSnippet("b".into()), 3));
    }

    #[test]
    fn push_wire_shape() {
        let message = PushMessage::new(Push::GroupsData(vec![Group::new("g1", "git")]), Some(2));
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "groupsData",
                "value": [{"id": "g1", "groupName": "git", "snippets": []}],
                "requestId": 2
            })
        );
        assert_eq!(message.push.kind(), PushKind::Groups);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(decode::<Request>(r#"{"type":"launchRockets"}"#).is_err());
    }
}
