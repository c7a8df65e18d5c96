//! Frontend side of the protocol.

pub mod ids;
pub mod state;

pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
pub use state::UiStateStore;
