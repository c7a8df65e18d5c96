//! Host-side command router.
//!
//! The router is the only writer of the persistence store. Each command is
//! handled as read → mutate → write → push; a failure anywhere is logged and
//! ends that command alone, without a push, so the frontend keeps whatever it
//! last received.

use crate::channel::MessageChannel;
use crate::host::prompt::CommandPrompt;
use crate::host::terminal::TerminalDispatcher;
use crate::models::{DEFAULT_COMMAND_SEPARATOR, Group, PersistenceStore, Snippet};
use crate::protocol::{Command, OrderPayload, Push, PushMessage, Request, SnippetPlacement};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What happens to the snippets of a deleted group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupDeletePolicy {
    #[default]
    DeleteWithGroup,
    PromoteToTopLevel,
}

pub struct CommandRouter<S: PersistenceStore> {
    store: S,
    terminal: Box<dyn TerminalDispatcher>,
    prompt: Box<dyn CommandPrompt>,
    separator: String,
    delete_policy: GroupDeletePolicy,
}

impl<S: PersistenceStore> CommandRouter<S> {
    pub fn new(
        store: S,
        terminal: Box<dyn TerminalDispatcher>,
        prompt: Box<dyn CommandPrompt>,
    ) -> Self {
        Self {
            store,
            terminal,
            prompt,
            separator: DEFAULT_COMMAND_SEPARATOR.to_string(),
            delete_policy: GroupDeletePolicy::default(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_group_delete_policy(mut self, policy: GroupDeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    /// Creates missing documents; call once at startup
    pub fn initialize(&mut self) -> Result<()> {
        self.store.ensure_initialized()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handles one request and returns the pushes it produced, each tagged
    /// with the request's correlation id.
    pub fn handle(&mut self, request: Request) -> Vec<PushMessage> {
        let Request {
            command,
            request_id,
        } = request;
        let name = command.name();
        let span = tracing::debug_span!("command", kind = name, request_id = ?request_id);
        let _entered = span.enter();

        match self.dispatch(command) {
            Ok(pushes) => pushes
                .into_iter()
                .map(|push| PushMessage::new(push, request_id))
                .collect(),
            Err(e) => {
                tracing::error!("{} failed: {:#}", name, e);
                Vec::new()
            }
        }
    }

    /// Handles every queued request on the channel, posting pushes back.
    /// Returns how many requests were handled.
    pub fn serve_pending<C>(&mut self, channel: &C) -> usize
    where
        C: MessageChannel<PushMessage, Request>,
    {
        let mut handled = 0;
        while let Some(request) = channel.try_next() {
            handled += 1;
            for push in self.handle(request) {
                if let Err(e) = channel.post(push) {
                    tracing::error!("Failed to post push: {:#}", e);
                }
            }
        }
        handled
    }

    fn dispatch(&mut self, command: Command) -> Result<Vec<Push>> {
        match command {
            Command::GetSnippets => Ok(vec![Push::SnippetsData(self.store.read_snippets()?)]),
            Command::GetGroups => Ok(vec![Push::GroupsData(self.store.read_groups()?)]),
            Command::AddSnippet(placement) => self.add_snippet(placement),
            Command::AddGroup(group) => self.add_group(group),
            Command::UpdateSnippet(placement) => self.update_snippet(placement),
            Command::UpdateGroup(group) => self.update_group(group),
            Command::DeleteSnippet(id) => self.delete_snippet(&id),
            Command::DeleteGroup(id) => self.delete_group(&id),
            Command::UpdateOrder(order) => self.update_order(order),
            Command::RunSnippet(snippet) => {
                self.run_snippet(&snippet)?;
                Ok(Vec::new())
            }
        }
    }

    fn contains_snippet(&self, snippet_id: &str) -> Result<bool> {
        let top_level = self.store.read_snippets()?;
        let groups = self.store.read_groups()?;
        Ok(top_level.iter().any(|s| s.id == snippet_id)
            || groups
                .iter()
                .any(|g| g.snippets.iter().any(|s| s.id == snippet_id)))
    }

    fn add_snippet(&mut self, placement: SnippetPlacement) -> Result<Vec<Push>> {
        let SnippetPlacement { snippet, group_id } = placement;

        if self.contains_snippet(&snippet.id)? {
            tracing::warn!("Snippet {} already exists; not added", snippet.id);
            return Ok(Vec::new());
        }

        match group_id {
            Some(group_id) => {
                let mut groups = self.store.read_groups()?;
                let Some(group) = groups.iter_mut().find(|g| g.id == group_id) else {
                    tracing::warn!("Group {} not found; snippet {} not added", group_id, snippet.id);
                    return Ok(Vec::new());
                };

                tracing::info!("Added snippet {} to group {}", snippet.id, group_id);
                group.snippets.push(snippet);
                self.store.write_groups(&groups)?;
                Ok(vec![Push::GroupsData(groups)])
            }
            None => {
                let mut snippets = self.store.read_snippets()?;
                tracing::info!("Added snippet {}", snippet.id);
                snippets.push(snippet);
                self.store.write_snippets(&snippets)?;
                Ok(vec![Push::SnippetsData(snippets)])
            }
        }
    }

    fn add_group(&mut self, group: Group) -> Result<Vec<Push>> {
        let mut groups = self.store.read_groups()?;
        if groups.iter().any(|g| g.id == group.id) {
            tracing::warn!("Group {} already exists; not added", group.id);
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        for snippet in &group.snippets {
            if !seen.insert(snippet.id.as_str()) || self.contains_snippet(&snippet.id)? {
                tracing::warn!(
                    "Snippet {} would appear twice; group {} not added",
                    snippet.id,
                    group.id
                );
                return Ok(Vec::new());
            }
        }

        tracing::info!("Added group {} ({})", group.id, group.group_name);
        groups.push(group);
        self.store.write_groups(&groups)?;
        Ok(vec![Push::GroupsData(groups)])
    }

    /// Move + update: the snippet leaves its current container and is
    /// appended to the target one.
    fn update_snippet(&mut self, placement: SnippetPlacement) -> Result<Vec<Push>> {
        let SnippetPlacement { snippet, group_id } = placement;
        let mut snippets = self.store.read_snippets()?;
        let mut groups = self.store.read_groups()?;

        let before = snippets.len() + groups.iter().map(|g| g.snippets.len()).sum::<usize>();
        snippets.retain(|s| s.id != snippet.id);
        for group in groups.iter_mut() {
            group.snippets.retain(|s| s.id != snippet.id);
        }
        let after = snippets.len() + groups.iter().map(|g| g.snippets.len()).sum::<usize>();
        if before == after {
            tracing::debug!("Snippet {} was not stored yet; inserting", snippet.id);
        }

        let target = group_id
            .as_deref()
            .and_then(|id| groups.iter_mut().find(|g| g.id == id));
        match target {
            Some(group) => {
                tracing::info!("Updated snippet {} in group {}", snippet.id, group.id);
                group.snippets.push(snippet);
            }
            None => {
                if let Some(group_id) = &group_id {
                    tracing::error!(
                        "Group {} not found; snippet {} moved to top level",
                        group_id,
                        snippet.id
                    );
                } else {
                    tracing::info!("Updated snippet {}", snippet.id);
                }
                snippets.push(snippet);
            }
        }

        self.store.write_snippets(&snippets)?;
        self.store.write_groups(&groups)?;
        Ok(vec![Push::SnippetsData(snippets), Push::GroupsData(groups)])
    }

    /// Renames in place. Membership is owned by UpdateSnippet and
    /// UpdateOrder, so the incoming snippet list is ignored.
    fn update_group(&mut self, group: Group) -> Result<Vec<Push>> {
        let mut groups = self.store.read_groups()?;
        let Some(existing) = groups.iter_mut().find(|g| g.id == group.id) else {
            tracing::error!("Failed to update group: {} not found", group.id);
            return Ok(Vec::new());
        };

        if group.snippets != existing.snippets {
            tracing::debug!("Ignoring snippet list sent with group {}", group.id);
        }
        existing.group_name = group.group_name;
        tracing::info!("Updated group {}", existing.id);

        self.store.write_groups(&groups)?;
        Ok(vec![Push::GroupsData(groups)])
    }

    /// Removes the snippet from the first container holding it. Only that
    /// container is written and pushed.
    fn delete_snippet(&mut self, snippet_id: &str) -> Result<Vec<Push>> {
        let mut snippets = self.store.read_snippets()?;
        if let Some(index) = snippets.iter().position(|s| s.id == snippet_id) {
            snippets.remove(index);
            self.store.write_snippets(&snippets)?;
            tracing::info!("Deleted snippet {}", snippet_id);
            return Ok(vec![Push::SnippetsData(snippets)]);
        }

        let mut groups = self.store.read_groups()?;
        let removed = groups
            .iter_mut()
            .find_map(|g| g.take_snippet(snippet_id).map(|_| g.id.clone()));
        match removed {
            Some(group_id) => {
                self.store.write_groups(&groups)?;
                tracing::info!("Deleted snippet {} from group {}", snippet_id, group_id);
                Ok(vec![Push::GroupsData(groups)])
            }
            None => {
                tracing::warn!("Snippet {} not found; nothing deleted", snippet_id);
                Ok(Vec::new())
            }
        }
    }

    fn delete_group(&mut self, group_id: &str) -> Result<Vec<Push>> {
        let mut groups = self.store.read_groups()?;
        let Some(index) = groups.iter().position(|g| g.id == group_id) else {
            tracing::warn!("Group {} not found; nothing deleted", group_id);
            return Ok(Vec::new());
        };
        let removed = groups.remove(index);

        match self.delete_policy {
            GroupDeletePolicy::DeleteWithGroup => {
                self.store.write_groups(&groups)?;
                tracing::info!(
                    "Deleted group {} with {} snippets",
                    group_id,
                    removed.snippets.len()
                );
                Ok(vec![Push::GroupsData(groups)])
            }
            GroupDeletePolicy::PromoteToTopLevel => {
                let mut snippets = self.store.read_snippets()?;
                let promoted = removed.snippets.len();
                snippets.extend(removed.snippets);
                self.store.write_snippets(&snippets)?;
                self.store.write_groups(&groups)?;
                tracing::info!(
                    "Deleted group {}; promoted {} snippets to top level",
                    group_id,
                    promoted
                );
                Ok(vec![Push::SnippetsData(snippets), Push::GroupsData(groups)])
            }
        }
    }

    /// Persists the frontend's arrangement verbatim
    fn update_order(&mut self, order: OrderPayload) -> Result<Vec<Push>> {
        let OrderPayload { snippets, groups } = order;

        let mut seen = HashSet::new();
        let duplicate = snippets
            .iter()
            .chain(groups.iter().flat_map(|g| g.snippets.iter()))
            .find(|s| !seen.insert(s.id.as_str()));
        if let Some(snippet) = duplicate {
            tracing::warn!("Order update repeats snippet {}; stored as given", snippet.id);
        }

        self.store.write_snippets(&snippets)?;
        self.store.write_groups(&groups)?;
        tracing::info!("Stored new order");
        Ok(vec![Push::SnippetsData(snippets), Push::GroupsData(groups)])
    }

    fn run_snippet(&mut self, snippet: &Snippet) -> Result<()> {
        let resolved = snippet.resolve(&self.separator);

        let command = if snippet.is_edit {
            self.prompt.edit(&resolved)?.unwrap_or_default()
        } else {
            resolved
        };

        if command.trim().is_empty() {
            tracing::info!("Nothing to run for snippet {}", snippet.id);
            return Ok(());
        }

        tracing::info!("Running snippet {}", snippet.id);
        self.terminal.send(command.trim())
    }
}
