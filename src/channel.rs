//! Message channel joining a frontend to the host.
//!
//! Both directions carry encoded JSON lines, the same bytes an external
//! frontend would write, so in-process use exercises the wire format too.
//! Delivery is FIFO per direction.

use crate::protocol::{self, PushMessage, Request};
use anyhow::{Result, anyhow};
use flume::{Receiver, Sender};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// One side of a message channel: posts `Out`, receives `In`
pub trait MessageChannel<Out, In> {
    fn post(&self, message: Out) -> Result<()>;

    /// Next inbound message, if one is waiting
    fn try_next(&self) -> Option<In>;

    fn drain(&self) -> Vec<In> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

#[derive(Debug)]
pub struct Endpoint<Out, In> {
    tx: Sender<String>,
    rx: Receiver<String>,
    _marker: PhantomData<fn(Out) -> In>,
}

/// The frontend half: posts requests, receives pushes
pub type FrontendEndpoint = Endpoint<Request, PushMessage>;
/// The host half: posts pushes, receives requests
pub type HostEndpoint = Endpoint<PushMessage, Request>;

/// Creates a connected frontend/host endpoint pair
pub fn pair() -> (FrontendEndpoint, HostEndpoint) {
    let (to_host, from_frontend) = flume::unbounded();
    let (to_frontend, from_host) = flume::unbounded();

    let frontend = Endpoint {
        tx: to_host,
        rx: from_host,
        _marker: PhantomData,
    };
    let host = Endpoint {
        tx: to_frontend,
        rx: from_frontend,
        _marker: PhantomData,
    };
    (frontend, host)
}

impl<Out, In> Endpoint<Out, In> {
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl<Out, In> MessageChannel<Out, In> for Endpoint<Out, In>
where
    Out: Serialize,
    In: DeserializeOwned,
{
    fn post(&self, message: Out) -> Result<()> {
        let line = protocol::encode(&message)?;
        self.tx
            .send(line)
            .map_err(|_| anyhow!("Message channel is closed"))
    }

    fn try_next(&self) -> Option<In> {
        loop {
            let line = self.rx.try_recv().ok()?;
            match protocol::decode(&line) {
                Ok(message) => return Some(message),
                Err(e) => tracing::warn!("Dropping undecodable message: {:#}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Command, Push};

    #[test]
    fn messages_arrive_in_post_order() {
        let (frontend, host) = pair();
        frontend.post(Request::new(Command::GetSnippets, 1)).unwrap();
        frontend.post(Request::new(Command::GetGroups, 2)).unwrap();

        assert_eq!(host.pending(), 2);
        let received: Vec<_> = host.drain().into_iter().map(|r| r.request_id).collect();
        assert_eq!(received, vec![Some(1), Some(2)]);
        assert!(host.try_next().is_none());
    }

    #[test]
    fn pushes_flow_back_to_frontend() {
        let (frontend, host) = pair();
        host.post(PushMessage::new(Push::SnippetsData(Vec::new()), None)).unwrap();
        assert_eq!(
            frontend.try_next(),
            Some(PushMessage::new(Push::SnippetsData(Vec::new()), None))
        );
    }

    #[test]
    fn post_fails_once_the_other_side_is_gone() {
        let (frontend, host) = pair();
        drop(host);
        assert!(frontend.post(Request::bare(Command::GetGroups)).is_err());
    }
}
