//! termsnip - saved shell commands, grouped and reorderable
//!
//! The crate is split along a message boundary:
//! - `host` owns the persisted collections and is their only writer
//! - `client` keeps a working copy that is replaced by every snapshot the
//!   host pushes
//! - `reorder` computes drag-and-drop arrangements for the client
//! - `protocol` and `channel` carry messages between the two

pub mod channel;
pub mod client;
pub mod config;
pub mod host;
pub mod models;
pub mod protocol;
pub mod reorder;
pub mod search;
pub mod session;

pub use session::LocalSession;
