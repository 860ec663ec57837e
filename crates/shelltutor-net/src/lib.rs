//! Networked response engine.
//!
//! [`ChatEngine`] implements the terminal's `ResponseEngine` contract on top
//! of an OpenAI-compatible chat completions endpoint.

mod chat;

pub use chat::ChatEngine;
