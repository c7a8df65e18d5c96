//! In-process pairing of a router and a frontend store.
//!
//! Both halves run on the calling thread: the frontend posts, `settle` lets
//! the router drain its queue and the frontend apply the resulting pushes,
//! until neither side has anything left to do.

use crate::channel::{self, FrontendEndpoint, HostEndpoint};
use crate::client::{IdGenerator, UiStateStore};
use crate::host::CommandRouter;
use crate::models::PersistenceStore;
use anyhow::Result;

pub struct LocalSession<S: PersistenceStore, G: IdGenerator> {
    router: CommandRouter<S>,
    host: HostEndpoint,
    ui: UiStateStore<FrontendEndpoint, G>,
}

impl<S: PersistenceStore, G: IdGenerator> LocalSession<S, G> {
    /// Initializes storage, mounts the frontend and waits for the first
    /// snapshots.
    pub fn open(mut router: CommandRouter<S>, ids: G) -> Result<Self> {
        router.initialize()?;

        let (frontend, host) = channel::pair();
        let mut session = Self {
            router,
            host,
            ui: UiStateStore::new(frontend, ids),
        };
        session.ui.mount()?;
        session.settle();
        Ok(session)
    }

    pub fn ui(&self) -> &UiStateStore<FrontendEndpoint, G> {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut UiStateStore<FrontendEndpoint, G> {
        &mut self.ui
    }

    pub fn router(&self) -> &CommandRouter<S> {
        &self.router
    }

    /// Runs the round trip until both queues are empty
    pub fn settle(&mut self) {
        loop {
            let handled = self.router.serve_pending(&self.host);
            let received = self.ui.pump();
            if handled == 0 && received == 0 {
                break;
            }
        }
    }
}
