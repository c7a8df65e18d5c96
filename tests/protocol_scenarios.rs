use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use termsnip::LocalSession;
use termsnip::client::SequentialIds;
use termsnip::host::{AcceptPrompt, CommandRouter, TerminalDispatcher};
use termsnip::models::{Collection, Container, Group, PersistenceStore, Snippet, StorageManager};
use termsnip::protocol::{Command, Push, Request, SnippetPlacement};
use termsnip::reorder::{DragSource, DropTarget};

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<String>>>);

impl TerminalDispatcher for Recorder {
    fn send(&mut self, command: &str) -> Result<()> {
        self.0.borrow_mut().push(command.to_string());
        Ok(())
    }
}

struct Ctx {
    dir: TempDir,
    router: CommandRouter<StorageManager>,
    next_id: u64,
}

impl Ctx {
    fn send(&mut self, command: Command) -> Vec<Push> {
        self.next_id += 1;
        self.router
            .handle(Request::new(command, self.next_id))
            .into_iter()
            .map(|m| m.push)
            .collect()
    }

    fn get_snippets(&mut self) -> Vec<Snippet> {
        match self.send(Command::GetSnippets).pop() {
            Some(Push::SnippetsData(snippets)) => snippets,
            other => panic!("expected snippetsData, got {other:?}"),
        }
    }

    fn get_groups(&mut self) -> Vec<Group> {
        match self.send(Command::GetGroups).pop() {
            Some(Push::GroupsData(groups)) => groups,
            other => panic!("expected groupsData, got {other:?}"),
        }
    }

    /// A fresh store over the same directory, as after a restart
    fn reopened(&self) -> StorageManager {
        StorageManager::with_data_dir(self.dir.path())
    }
}

#[fixture]
fn ctx() -> Ctx {
    let dir = tempfile::tempdir().expect("create temp dir");
    let mut router = CommandRouter::new(
        StorageManager::with_data_dir(dir.path()),
        Box::new(Recorder::default()),
        Box::new(AcceptPrompt),
    );
    router.initialize().expect("initialize store");
    Ctx {
        dir,
        router,
        next_id: 0,
    }
}

fn snippet(id: &str, name: &str, command: &str) -> Snippet {
    Snippet::new(id, name, vec![command.into()], false)
}

fn placement(snippet: Snippet, group_id: Option<&str>) -> SnippetPlacement {
    SnippetPlacement {
        snippet,
        group_id: group_id.map(String::from),
    }
}

fn scenario_two(ctx: &mut Ctx) {
    ctx.send(Command::AddGroup(Group::new("g1", "git")));
    ctx.send(Command::AddSnippet(placement(
        snippet("b", "status", "git status"),
        Some("g1"),
    )));
}

#[rstest]
fn add_snippet_without_group_lands_top_level(mut ctx: Ctx) {
    ctx.send(Command::AddSnippet(placement(snippet("a", "list", "ls -la"), None)));
    assert_eq!(ctx.get_snippets(), vec![snippet("a", "list", "ls -la")]);
    assert_eq!(ctx.reopened().read_snippets().unwrap(), vec![snippet("a", "list", "ls -la")]);
}

#[rstest]
fn add_group_then_snippet_into_it(mut ctx: Ctx) {
    scenario_two(&mut ctx);

    let mut expected = Group::new("g1", "git");
    expected.snippets.push(snippet("b", "status", "git status"));
    assert_eq!(ctx.get_groups(), vec![expected]);
}

#[rstest]
fn delete_snippet_from_group(mut ctx: Ctx) {
    scenario_two(&mut ctx);
    ctx.send(Command::DeleteSnippet("b".into()));
    assert_eq!(ctx.get_groups(), vec![Group::new("g1", "git")]);
}

#[rstest]
fn update_snippet_without_group_promotes_it(mut ctx: Ctx) {
    scenario_two(&mut ctx);

    let edited = snippet("b", "status2", "git status -s");
    let pushes = ctx.send(Command::UpdateSnippet(placement(edited.clone(), None)));
    assert_eq!(pushes.len(), 2);

    assert_eq!(ctx.get_snippets(), vec![edited]);
    assert_eq!(ctx.get_groups(), vec![Group::new("g1", "git")]);
}

#[rstest]
fn documents_are_initialized_as_empty_arrays(ctx: Ctx) {
    let raw = std::fs::read_to_string(ctx.dir.path().join("groups.json")).unwrap();
    assert_eq!(raw.trim(), "[]");
}

#[rstest]
fn write_then_read_round_trips(ctx: Ctx) {
    let mut store = ctx.reopened();
    let mut group = Group::new("g1", "ops");
    group.snippets.push(Snippet::new(
        "x",
        "deploy",
        vec!["make build".into(), "make deploy".into()],
        true,
    ));
    let groups = vec![group, Group::new("g2", "empty")];

    store.write_groups(&groups).unwrap();
    assert_eq!(store.read_groups().unwrap(), groups);
}

#[rstest]
fn add_then_delete_restores_previous_shape(mut ctx: Ctx) {
    scenario_two(&mut ctx);
    ctx.send(Command::AddSnippet(placement(snippet("a", "list", "ls"), None)));
    ctx.send(Command::AddSnippet(placement(snippet("c", "pwd", "pwd"), None)));
    let before = (ctx.get_snippets(), ctx.get_groups());

    ctx.send(Command::AddSnippet(placement(snippet("n", "new", "true"), Some("g1"))));
    ctx.send(Command::DeleteSnippet("n".into()));

    assert_eq!((ctx.get_snippets(), ctx.get_groups()), before);
}

fn open_session(dir: &TempDir) -> (LocalSession<StorageManager, SequentialIds>, Recorder) {
    let recorder = Recorder::default();
    let router = CommandRouter::new(
        StorageManager::with_data_dir(dir.path()),
        Box::new(recorder.clone()),
        Box::new(AcceptPrompt),
    );
    let session = LocalSession::open(router, SequentialIds::new("id")).expect("open session");
    (session, recorder)
}

fn names(snippets: &[Snippet]) -> Vec<&str> {
    snippets.iter().map(|s| s.name.as_str()).collect()
}

#[test]
fn frontend_sees_host_snapshots_after_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = open_session(&dir);

    let group_id = session.ui_mut().add_group("git").unwrap();
    session.settle();
    session
        .ui_mut()
        .add_snippet("status", vec!["git status".into()], false, Some(&group_id))
        .unwrap();
    session
        .ui_mut()
        .add_snippet("list", vec!["ls -la".into()], false, None)
        .unwrap();

    // nothing is applied before the host answers
    assert!(session.ui().snippets().is_empty());
    session.settle();

    assert_eq!(names(session.ui().snippets()), vec!["list"]);
    assert_eq!(names(&session.ui().groups()[0].snippets), vec!["status"]);
    assert!(session.ui().collection().check_unique_ids().is_ok());
}

#[test]
fn reorder_persists_and_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (mut session, _) = open_session(&dir);
        for name in ["A", "B", "C"] {
            session
                .ui_mut()
                .add_snippet(name, vec![format!("echo {name}")], false, None)
                .unwrap();
        }
        session.settle();

        let collection = session.ui().collection();
        let total = collection.total_snippets();
        let first = collection.snippets[0].id.clone();
        let last = collection.snippets[2].id.clone();

        let moved = session
            .ui_mut()
            .reorder(
                &DragSource::Snippet {
                    id: first,
                    container: Container::Ungrouped,
                },
                &DropTarget::Snippet {
                    id: last,
                    container: Container::Ungrouped,
                },
            )
            .unwrap();
        assert!(moved);
        assert_eq!(names(session.ui().snippets()), vec!["B", "C", "A"]);

        session.settle();
        assert_eq!(session.ui().collection().total_snippets(), total);
    }

    let (session, _) = open_session(&dir);
    assert_eq!(names(session.ui().snippets()), vec!["B", "C", "A"]);
}

#[test]
fn cross_container_drop_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = open_session(&dir);
    let group_id = session.ui_mut().add_group("git").unwrap();
    session.settle();
    session
        .ui_mut()
        .add_snippet("status", vec!["git status".into()], false, Some(&group_id))
        .unwrap();
    session
        .ui_mut()
        .add_snippet("list", vec!["ls".into()], false, None)
        .unwrap();
    session.settle();

    let before: Collection = session.ui().collection();
    let grouped = before.groups[0].snippets[0].id.clone();
    let loose = before.snippets[0].id.clone();

    let moved = session
        .ui_mut()
        .reorder(
            &DragSource::Snippet {
                id: loose,
                container: Container::Ungrouped,
            },
            &DropTarget::Snippet {
                id: grouped,
                container: Container::Group(group_id),
            },
        )
        .unwrap();
    session.settle();

    assert!(!moved);
    assert_eq!(session.ui().collection(), before);
}

#[test]
fn run_goes_through_host_to_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, recorder) = open_session(&dir);
    session
        .ui_mut()
        .add_snippet("build", vec!["cargo fmt".into(), "cargo build".into()], false, None)
        .unwrap();
    session.settle();

    let snippet = session.ui().snippets()[0].clone();
    session.ui_mut().run_snippet(&snippet).unwrap();
    session.settle();

    assert_eq!(*recorder.0.borrow(), vec!["cargo fmt && cargo build"]);
}

#[test]
fn reorder_drops_older_snapshot_and_is_stored_as_sent() {
    use termsnip::channel;
    use termsnip::client::UiStateStore;

    let dir = tempfile::tempdir().unwrap();
    let mut router = CommandRouter::new(
        StorageManager::with_data_dir(dir.path()),
        Box::new(Recorder::default()),
        Box::new(AcceptPrompt),
    );
    router.initialize().unwrap();

    let (frontend, host) = channel::pair();
    let mut ui = UiStateStore::new(frontend, SequentialIds::new("s"));
    ui.mount().unwrap();
    for name in ["A", "B", "C"] {
        ui.add_snippet(name, vec![format!("echo {name}")], false, None)
            .unwrap();
    }
    router.serve_pending(&host);
    ui.pump();
    assert_eq!(names(ui.snippets()), vec!["A", "B", "C"]);

    // the host answers a delete while the user is already dragging
    ui.delete_snippet("s-1").unwrap();
    router.serve_pending(&host);

    let moved = ui
        .reorder(
            &DragSource::Snippet {
                id: "s-2".into(),
                container: Container::Ungrouped,
            },
            &DropTarget::Snippet {
                id: "s-3".into(),
                container: Container::Ungrouped,
            },
        )
        .unwrap();
    assert!(moved);

    assert_eq!(ui.pump(), 1);
    assert_eq!(names(ui.snippets()), vec!["A", "C", "B"]);

    // UpdateOrder is stored as sent. It was computed before the delete
    // arrived, so "A" is written back: a known limit of wholesale sync.
    router.serve_pending(&host);
    ui.pump();
    assert_eq!(names(ui.snippets()), vec!["A", "C", "B"]);
    assert_eq!(
        names(&router.store().read_snippets().unwrap()),
        vec!["A", "C", "B"]
    );
}

#[test]
fn rename_queued_behind_an_add_keeps_the_new_snippet() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = open_session(&dir);
    let group_id = session.ui_mut().add_group("git").unwrap();
    session.settle();

    session
        .ui_mut()
        .add_snippet("status", vec!["git status".into()], false, Some(&group_id))
        .unwrap();
    let mut renamed = session.ui().groups()[0].clone();
    renamed.group_name = "vcs".into();
    session.ui_mut().update_group(renamed).unwrap();
    session.settle();

    let group = &session.ui().groups()[0];
    assert_eq!(group.group_name, "vcs");
    assert_eq!(names(&group.snippets), vec!["status"]);
}
