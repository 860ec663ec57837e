//! Response engine contract.
//!
//! The engine is the remote collaborator that improvises terminal output. The
//! session controller only ever talks to it through [`ResponseEngine`], so the
//! HTTP-backed engine, the offline scripted engine, and test doubles are
//! interchangeable.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use shelltutor_types::error::Result;

use crate::context::SessionContext;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// An established engine session: the context it was seeded with.
///
/// Cloning is cheap. A request captures the handle that was current when it
/// was issued, so a later context refresh never changes what an in-flight
/// request sees.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: u64,
    context: Arc<SessionContext>,
}

impl SessionHandle {
    /// Wrap a context in a fresh handle with a process-unique id.
    pub fn new(context: SessionContext) -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            context: Arc::new(context),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }
}

/// A service that fabricates terminal output and tutorials.
pub trait ResponseEngine: Send + Sync {
    /// Establish a session seeded with `context`. Called once at start-up and
    /// again after every directory change.
    fn create_session(&self, context: SessionContext) -> Result<SessionHandle>;

    /// Send one command line and return the whole reply.
    fn send(&self, session: &SessionHandle, line: &str) -> Result<String>;

    /// Produce a step-by-step tutorial for `goal`. Independent of any session.
    fn generate_guide(&self, goal: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SessionContext {
        SessionContext {
            cwd: "~".into(),
            tree_json: "{}".into(),
            description: "test".into(),
        }
    }

    #[test]
    fn handle_ids_are_unique() {
        let a = SessionHandle::new(ctx());
        let b = SessionHandle::new(ctx());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn clone_shares_context() {
        let a = SessionHandle::new(ctx());
        let b = a.clone();
        assert_eq!(a.id(), b.id());
        assert!(std::ptr::eq(a.context(), b.context()));
    }
}
