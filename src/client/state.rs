//! Frontend copy of the collection.
//!
//! The store posts commands and waits for the host's snapshots; it never
//! mutates its lists for add, update or delete. Reordering is the exception:
//! the new arrangement is applied at once and then sent as `UpdateOrder`.
//!
//! Every posted command carries a fresh request id. Per collection the store
//! remembers the newest id it has accepted a snapshot for, and the id of its
//! latest reorder; a snapshot tagged with an older id is stale and dropped.

use crate::channel::MessageChannel;
use crate::client::ids::IdGenerator;
use crate::models::{Collection, Group, Snippet};
use crate::protocol::{
    Command, OrderPayload, Push, PushKind, PushMessage, Request, RequestId, SnippetPlacement,
};
use crate::reorder::{DragSource, DropTarget, ReorderOutcome, compute_reorder};
use anyhow::Result;

pub struct UiStateStore<C, G> {
    channel: C,
    ids: G,
    snippets: Vec<Snippet>,
    groups: Vec<Group>,
    next_request_id: RequestId,
    snippets_mark: RequestId,
    groups_mark: RequestId,
}

impl<C, G> UiStateStore<C, G>
where
    C: MessageChannel<Request, PushMessage>,
    G: IdGenerator,
{
    pub fn new(channel: C, ids: G) -> Self {
        Self {
            channel,
            ids,
            snippets: Vec::new(),
            groups: Vec::new(),
            next_request_id: 1,
            snippets_mark: 0,
            groups_mark: 0,
        }
    }

    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Snapshot of both lists
    pub fn collection(&self) -> Collection {
        Collection::new(self.snippets.clone(), self.groups.clone())
    }

    /// Request both collections; call when the view mounts
    pub fn mount(&mut self) -> Result<()> {
        self.send(Command::GetSnippets)?;
        self.send(Command::GetGroups)?;
        Ok(())
    }

    fn send(&mut self, command: Command) -> Result<RequestId> {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        tracing::debug!("Posting {} as request {}", command.name(), request_id);
        self.channel.post(Request::new(command, request_id))?;
        Ok(request_id)
    }

    /// Validates and posts a new snippet, returning its id
    pub fn add_snippet(
        &mut self,
        name: &str,
        command: Vec<String>,
        is_edit: bool,
        group_id: Option<&str>,
    ) -> Result<String> {
        let snippet = Snippet::new(self.ids.next_id(), name, command, is_edit);
        snippet.validate()?;

        let id = snippet.id.clone();
        self.send(Command::AddSnippet(SnippetPlacement {
            snippet,
            group_id: group_id.map(String::from),
        }))?;
        Ok(id)
    }

    /// Validates and posts a new empty group, returning its id
    pub fn add_group(&mut self, name: &str) -> Result<String> {
        let group = Group::new(self.ids.next_id(), name);
        group.validate()?;

        let id = group.id.clone();
        self.send(Command::AddGroup(group))?;
        Ok(id)
    }

    /// Posts an edit; the host moves the snippet to the end of `group_id`
    /// (or the top-level list) as part of the update.
    pub fn update_snippet(&mut self, snippet: Snippet, group_id: Option<&str>) -> Result<()> {
        snippet.validate()?;
        self.send(Command::UpdateSnippet(SnippetPlacement {
            snippet,
            group_id: group_id.map(String::from),
        }))?;
        Ok(())
    }

    /// Renames a group. The host keeps its stored member list.
    pub fn update_group(&mut self, group: Group) -> Result<()> {
        group.validate()?;
        self.send(Command::UpdateGroup(group))?;
        Ok(())
    }

    pub fn delete_snippet(&mut self, snippet_id: &str) -> Result<()> {
        self.send(Command::DeleteSnippet(snippet_id.to_string()))?;
        Ok(())
    }

    pub fn delete_group(&mut self, group_id: &str) -> Result<()> {
        self.send(Command::DeleteGroup(group_id.to_string()))?;
        Ok(())
    }

    pub fn run_snippet(&mut self, snippet: &Snippet) -> Result<()> {
        self.send(Command::RunSnippet(snippet.clone()))?;
        Ok(())
    }

    /// Applies a new arrangement locally, then asks the host to persist it.
    /// Snapshots issued before this call are stale from here on.
    pub fn update_order(&mut self, snippets: Vec<Snippet>, groups: Vec<Group>) -> Result<()> {
        self.snippets = snippets.clone();
        self.groups = groups.clone();

        let request_id = self.send(Command::UpdateOrder(OrderPayload { snippets, groups }))?;
        self.snippets_mark = self.snippets_mark.max(request_id);
        self.groups_mark = self.groups_mark.max(request_id);
        Ok(())
    }

    /// Runs a drop through the reorder engine. Returns whether anything moved.
    pub fn reorder(&mut self, source: &DragSource, target: &DropTarget) -> Result<bool> {
        match compute_reorder(&self.collection(), source, target) {
            ReorderOutcome::Moved(next) => {
                self.update_order(next.snippets, next.groups)?;
                Ok(true)
            }
            ReorderOutcome::Ignored(reason) => {
                tracing::debug!("Drop ignored: {:?}", reason);
                Ok(false)
            }
        }
    }

    /// Replaces one list wholesale unless the snapshot is stale.
    /// Returns whether it was applied.
    pub fn apply_push(&mut self, message: PushMessage) -> bool {
        let kind = message.push.kind();
        if let Some(request_id) = message.request_id {
            let mark = match kind {
                PushKind::Snippets => &mut self.snippets_mark,
                PushKind::Groups => &mut self.groups_mark,
            };
            if request_id < *mark {
                tracing::debug!(
                    "Discarding stale {:?} snapshot from request {} (newest {})",
                    kind,
                    request_id,
                    mark
                );
                return false;
            }
            *mark = request_id;
        }

        match message.push {
            Push::SnippetsData(snippets) => self.snippets = snippets,
            Push::GroupsData(groups) => self.groups = groups,
        }
        true
    }

    /// Applies every snapshot waiting on the channel; returns how many were
    /// received (applied or discarded).
    pub fn pump(&mut self) -> usize {
        let messages = self.channel.drain();
        let received = messages.len();
        for message in messages {
            self.apply_push(message);
        }
        received
    }
}
