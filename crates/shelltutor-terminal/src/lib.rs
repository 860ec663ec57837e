//! Terminal session layer for shelltutor.
//!
//! The [`SessionController`] takes raw command lines, resolves `cd` locally
//! against the simulated file system, and forwards everything else to a
//! [`ResponseEngine`] seeded with a description of that file system. The
//! description is regenerated after every directory change.

mod context;
mod engine;
mod output;
mod parse;
mod scripted;
mod session;

/// Context description built from the file system.
pub use context::{SessionContext, guide_prompt};
/// Engine contract and session handles.
pub use engine::{ResponseEngine, SessionHandle};
/// Styled output lines.
pub use output::{LineStyle, OutputLine, text_lines};
/// Command-line splitting.
pub use parse::{CommandLine, tokenize};
/// Offline engine answering from the serialized tree.
pub use scripted::ScriptedEngine;
/// The interaction state machine.
pub use session::{
    NAVIGATION_COMMAND, PendingRequest, Reply, SessionController, SessionState, Submission,
};
