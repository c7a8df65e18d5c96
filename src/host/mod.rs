//! Host side of the protocol: the router that owns persisted state and the
//! collaborators it hands work to.

pub mod prompt;
pub mod router;
pub mod serve;
pub mod terminal;

pub use prompt::{AcceptPrompt, CommandPrompt, DeclinePrompt, EditorPrompt};
pub use router::{CommandRouter, GroupDeletePolicy};
pub use terminal::{PrintTerminal, ShellOutput, ShellSession, TerminalDispatcher};
