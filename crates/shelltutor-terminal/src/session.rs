//! Session controller: the interaction state machine.
//!
//! `cd` is resolved locally against the [`VirtualFileSystem`]; every other
//! command is handed to the [`ResponseEngine`] together with the session
//! handle that describes the current directory. At most one engine request
//! is outstanding at a time, and input that arrives meanwhile is rejected,
//! not queued.

use std::sync::Arc;

use log::{debug, info, warn};
use shelltutor_types::error::{Result, TutorError};
use shelltutor_vfs::{Directory, VfsPath, VirtualFileSystem, display_path};

use crate::context::SessionContext;
use crate::engine::{ResponseEngine, SessionHandle};
use crate::output::{OutputLine, text_lines};
use crate::parse::{CommandLine, command_word};

/// The only command handled without the engine.
pub const NAVIGATION_COMMAND: &str = "cd";

/// Whether the controller can take a new command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResponse,
}

/// A command handed off to the engine and not yet settled.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    id: u64,
    session: SessionHandle,
    line: String,
}

impl PendingRequest {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    /// The session the request was issued under.
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Perform the engine call. Blocking; may run on another thread.
    pub fn run(&self, engine: &dyn ResponseEngine) -> Result<String> {
        engine.send(&self.session, &self.line)
    }
}

/// What happened to a submitted line.
#[derive(Debug)]
pub enum Submission {
    /// Blank input.
    Ignored,
    /// Rejected because a request is still in flight.
    Busy,
    /// `cd` succeeded. `warning` is set when the engine context could not
    /// be refreshed; the directory change stands regardless.
    Navigated {
        path: VfsPath,
        warning: Option<TutorError>,
    },
    /// `cd` failed; nothing changed.
    NavigationFailed(TutorError),
    /// The line must be sent to the engine, then passed to
    /// [`SessionController::settle`].
    Dispatched(PendingRequest),
}

impl Submission {
    /// Feedback lines for every outcome that completes locally. A dispatched
    /// request has none until it settles.
    pub fn feedback(&self) -> Vec<OutputLine> {
        match self {
            Submission::Ignored | Submission::Dispatched(_) => Vec::new(),
            Submission::Busy => vec![OutputLine::warning(
                "still waiting for the previous command; input ignored",
            )],
            Submission::Navigated { path, warning } => {
                let mut lines = vec![OutputLine::success(format!(
                    "Now in {}",
                    display_path(path)
                ))];
                if let Some(err) = warning {
                    lines.push(OutputLine::warning(format!(
                        "warning: {err}; later commands may not reflect the new directory"
                    )));
                }
                lines
            },
            Submission::NavigationFailed(err) => vec![OutputLine::error(err.to_string())],
        }
    }
}

/// Outcome of a settled engine request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Failed(String),
}

impl Reply {
    pub fn lines(&self) -> Vec<OutputLine> {
        match self {
            Reply::Output(text) => text_lines(text),
            Reply::Failed(msg) => vec![OutputLine::error(format!("error: {msg}"))],
        }
    }
}

/// Owns the session's file system, engine session, and request state.
pub struct SessionController {
    vfs: VirtualFileSystem,
    engine: Arc<dyn ResponseEngine>,
    session: SessionHandle,
    state: SessionState,
    in_flight: Option<u64>,
    next_request: u64,
    context_generation: u64,
}

impl SessionController {
    /// Start a session and seed the engine with the initial context.
    ///
    /// Any failure here is an [`TutorError::Init`]: the caller should not
    /// accept input.
    pub fn new(vfs: VirtualFileSystem, engine: Arc<dyn ResponseEngine>) -> Result<Self> {
        let context = SessionContext::describe(&vfs)
            .map_err(|e| TutorError::Init(format!("describe session: {e}")))?;
        let session = engine.create_session(context).map_err(|e| match e {
            TutorError::Init(_) => e,
            other => TutorError::Init(format!("create session: {other}")),
        })?;
        info!("Session {} started in {}", session.id(), vfs.cwd_display());
        Ok(Self {
            vfs,
            engine,
            session,
            state: SessionState::Idle,
            in_flight: None,
            next_request: 1,
            context_generation: 0,
        })
    }

    pub fn vfs(&self) -> &VirtualFileSystem {
        &self.vfs
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == SessionState::AwaitingResponse
    }

    /// The engine, for running a [`PendingRequest`] off the controller.
    pub fn engine(&self) -> Arc<dyn ResponseEngine> {
        Arc::clone(&self.engine)
    }

    /// The engine session new requests are issued under.
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Number of times the context has been regenerated since start-up.
    pub fn context_generation(&self) -> u64 {
        self.context_generation
    }

    /// Shell prompt for the current directory.
    pub fn prompt(&self) -> String {
        format!("{} $ ", self.vfs.cwd_display())
    }

    /// Accept one line of input.
    pub fn submit(&mut self, line: &str) -> Submission {
        let line = line.trim();
        if line.is_empty() {
            return Submission::Ignored;
        }
        if self.is_busy() {
            warn!("Rejected {line:?}: request {:?} in flight", self.in_flight);
            return Submission::Busy;
        }

        if command_word(line) == Some(NAVIGATION_COMMAND) {
            return self.navigate(line);
        }

        let id = self.next_request;
        self.next_request += 1;
        self.in_flight = Some(id);
        self.state = SessionState::AwaitingResponse;
        debug!("Dispatch #{id} under session {}: {line:?}", self.session.id());
        Submission::Dispatched(PendingRequest {
            id,
            session: self.session.clone(),
            line: line.to_string(),
        })
    }

    fn navigate(&mut self, line: &str) -> Submission {
        let cmd = match CommandLine::parse(line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => return Submission::Ignored,
            Err(e) => return Submission::NavigationFailed(e),
        };
        if cmd.args.len() > 1 {
            return Submission::NavigationFailed(TutorError::Usage(
                "cd: too many arguments".to_string(),
            ));
        }
        let target = cmd.args.first().map(String::as_str).unwrap_or("");

        let before = self.vfs.current_path().clone();
        let path = match self.vfs.change_directory(target) {
            Ok(path) => path,
            Err(e) => return Submission::NavigationFailed(e),
        };

        let warning = if path != before {
            self.refresh_context().err()
        } else {
            None
        };
        Submission::Navigated { path, warning }
    }

    /// Regenerate the engine session from the current directory and tree.
    ///
    /// On failure the previous session stays active and the error is
    /// returned as [`TutorError::ContextSync`]. A working directory the
    /// tree no longer contains is reset to home first.
    pub fn refresh_context(&mut self) -> Result<()> {
        // Never describe a working directory the tree no longer has.
        self.vfs.revalidate();
        let session = SessionContext::describe(&self.vfs)
            .and_then(|context| self.engine.create_session(context))
            .map_err(|e| {
                warn!("Context refresh for {} failed: {e}", self.vfs.cwd_display());
                match e {
                    TutorError::ContextSync(_) => e,
                    other => TutorError::ContextSync(other.to_string()),
                }
            })?;
        self.context_generation += 1;
        info!(
            "Session {} replaces {} (cwd {})",
            session.id(),
            self.session.id(),
            self.vfs.cwd_display()
        );
        self.session = session;
        Ok(())
    }

    /// Swap the simulated tree and reseed the engine with it.
    ///
    /// Returns whether the working directory survived the swap (otherwise
    /// it is reset to home). The swap stands even when the context refresh
    /// fails; that failure is returned as [`TutorError::ContextSync`].
    pub fn replace_tree(&mut self, home: Directory) -> Result<bool> {
        let kept = self.vfs.replace_tree(home);
        info!(
            "Tree replaced; cwd {} ({})",
            self.vfs.cwd_display(),
            if kept { "kept" } else { "reset" }
        );
        self.refresh_context()?;
        Ok(kept)
    }

    /// Complete the request `id` and return to idle.
    ///
    /// Returns `None` for an id that is not the one in flight (already
    /// settled or cancelled).
    pub fn settle(&mut self, id: u64, result: Result<String>) -> Option<Reply> {
        if self.in_flight != Some(id) {
            warn!("Ignoring result for request #{id}; in flight: {:?}", self.in_flight);
            return None;
        }
        self.in_flight = None;
        self.state = SessionState::Idle;
        Some(match result {
            Ok(text) => Reply::Output(text),
            Err(e) => {
                debug!("Request #{id} failed: {e}");
                Reply::Failed(e.to_string())
            },
        })
    }

    /// Abandon the in-flight request, if any. Its result will be ignored.
    pub fn cancel(&mut self) -> bool {
        let Some(id) = self.in_flight.take() else {
            return false;
        };
        debug!("Cancelled request #{id}");
        self.state = SessionState::Idle;
        true
    }

    /// Submit a line and, if it goes to the engine, run it to completion on
    /// this thread.
    pub fn execute(&mut self, line: &str) -> Vec<OutputLine> {
        match self.submit(line) {
            Submission::Dispatched(req) => {
                let result = req.run(self.engine.as_ref());
                self.settle(req.id(), result)
                    .map(|reply| reply.lines())
                    .unwrap_or_default()
            },
            other => other.feedback(),
        }
    }

    /// Ask the engine for a tutorial. Does not touch session or path state.
    pub fn guide(&self, goal: &str) -> Result<String> {
        if goal.trim().is_empty() {
            return Err(TutorError::Usage(
                "describe what you want to learn, e.g. \"copy a file\"".to_string(),
            ));
        }
        self.engine.generate_guide(goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::output::LineStyle;

    /// Records calls; fails on demand.
    #[derive(Default)]
    struct FakeEngine {
        sessions: Mutex<Vec<String>>,
        sent: Mutex<Vec<(String, String)>>,
        fail_sessions: Mutex<bool>,
        fail_send: Mutex<bool>,
    }

    impl ResponseEngine for FakeEngine {
        fn create_session(&self, context: SessionContext) -> Result<SessionHandle> {
            if *self.fail_sessions.lock().unwrap() {
                return Err(TutorError::Remote("session refused".into()));
            }
            self.sessions.lock().unwrap().push(context.cwd.clone());
            Ok(SessionHandle::new(context))
        }

        fn send(&self, session: &SessionHandle, line: &str) -> Result<String> {
            if *self.fail_send.lock().unwrap() {
                return Err(TutorError::Remote("HTTP 503".into()));
            }
            let cwd = session.context().cwd.clone();
            self.sent.lock().unwrap().push((cwd.clone(), line.to_string()));
            Ok(format!("[{cwd}] {line}"))
        }

        fn generate_guide(&self, goal: &str) -> Result<String> {
            Ok(format!("1. learn {goal}"))
        }
    }

    fn setup() -> (SessionController, Arc<FakeEngine>) {
        let engine = Arc::new(FakeEngine::default());
        let ctl = SessionController::new(VirtualFileSystem::seeded(), engine.clone()).unwrap();
        (ctl, engine)
    }

    #[test]
    fn new_creates_initial_session() {
        let (ctl, engine) = setup();
        assert_eq!(*engine.sessions.lock().unwrap(), vec!["~"]);
        assert_eq!(ctl.state(), SessionState::Idle);
        assert_eq!(ctl.context_generation(), 0);
        assert_eq!(ctl.prompt(), "~ $ ");
    }

    #[test]
    fn new_fails_with_init_error() {
        let engine = Arc::new(FakeEngine::default());
        *engine.fail_sessions.lock().unwrap() = true;
        let err = SessionController::new(VirtualFileSystem::seeded(), engine)
            .err()
            .unwrap();
        assert!(err.is_fatal());
    }

    #[test]
    fn blank_input_is_ignored() {
        let (mut ctl, engine) = setup();
        assert!(matches!(ctl.submit("   "), Submission::Ignored));
        assert!(ctl.execute("").is_empty());
        assert!(engine.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn cd_is_local() {
        let (mut ctl, engine) = setup();
        let lines = ctl.execute("cd documents");
        assert_eq!(lines, vec![OutputLine::success("Now in home/documents")]);
        assert_eq!(ctl.prompt(), "home/documents $ ");
        assert!(engine.sent.lock().unwrap().is_empty());
        assert_eq!(ctl.context_generation(), 1);
        assert_eq!(ctl.session().context().cwd, "home/documents");
    }

    #[test]
    fn failed_cd_changes_nothing() {
        let (mut ctl, engine) = setup();
        ctl.execute("cd images");
        let session_before = ctl.session().id();
        let lines = ctl.execute("cd report.docx");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].style, LineStyle::Error);
        assert!(lines[0].text.contains("report.docx"));
        assert_eq!(ctl.vfs().cwd_display(), "home/images");
        assert_eq!(ctl.session().id(), session_before);
        assert_eq!(engine.sessions.lock().unwrap().len(), 2);
    }

    #[test]
    fn cd_to_same_directory_keeps_session() {
        let (mut ctl, _engine) = setup();
        ctl.execute("cd .");
        assert_eq!(ctl.context_generation(), 0);
    }

    #[test]
    fn cd_too_many_arguments() {
        let (mut ctl, _engine) = setup();
        let sub = ctl.submit("cd documents images");
        assert!(matches!(sub, Submission::NavigationFailed(TutorError::Usage(_))));
        assert!(ctl.vfs().current_path().is_root());
    }

    #[test]
    fn cd_quoted_argument() {
        let (mut ctl, _engine) = setup();
        let sub = ctl.submit("cd 'documents'");
        assert!(matches!(sub, Submission::Navigated { .. }));
    }

    #[test]
    fn bare_cd_goes_home() {
        let (mut ctl, _engine) = setup();
        ctl.execute("cd images");
        ctl.execute("cd");
        assert!(ctl.vfs().current_path().is_root());
    }

    #[test]
    fn context_sync_failure_keeps_directory() {
        let (mut ctl, engine) = setup();
        *engine.fail_sessions.lock().unwrap() = true;
        let lines = ctl.execute("cd music");
        assert_eq!(ctl.vfs().cwd_display(), "home/music");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].style, LineStyle::Warning);
        assert!(lines[1].text.contains("context sync failed"));
        assert_eq!(ctl.context_generation(), 0);
    }

    #[test]
    fn remote_command_uses_current_context() {
        let (mut ctl, engine) = setup();
        ctl.execute("cd documents");
        let lines = ctl.execute("ls -la");
        assert_eq!(lines, vec![OutputLine::normal("[home/documents] ls -la")]);
        assert_eq!(
            *engine.sent.lock().unwrap(),
            vec![("home/documents".to_string(), "ls -la".to_string())]
        );
        assert_eq!(ctl.state(), SessionState::Idle);
    }

    #[test]
    fn remote_failure_returns_to_idle() {
        let (mut ctl, engine) = setup();
        *engine.fail_send.lock().unwrap() = true;
        let lines = ctl.execute("pwd");
        assert_eq!(
            lines,
            vec![OutputLine::error("error: response engine error: HTTP 503")]
        );
        assert_eq!(ctl.state(), SessionState::Idle);
    }

    #[test]
    fn busy_rejects_everything_until_settled() {
        let (mut ctl, _engine) = setup();
        let Submission::Dispatched(req) = ctl.submit("ls") else {
            panic!("expected dispatch");
        };
        assert!(ctl.is_busy());
        assert!(matches!(ctl.submit("pwd"), Submission::Busy));
        assert!(matches!(ctl.submit("cd music"), Submission::Busy));
        assert!(ctl.vfs().current_path().is_root());
        // Blank input stays a no-op even while busy.
        assert!(matches!(ctl.submit(""), Submission::Ignored));

        let reply = ctl.settle(req.id(), Ok("a  b".into())).unwrap();
        assert_eq!(reply, Reply::Output("a  b".into()));
        assert!(matches!(ctl.submit("pwd"), Submission::Dispatched(_)));
    }

    #[test]
    fn settle_ignores_stale_ids() {
        let (mut ctl, _engine) = setup();
        let Submission::Dispatched(req) = ctl.submit("ls") else {
            panic!("expected dispatch");
        };
        assert!(ctl.settle(req.id() + 1, Ok(String::new())).is_none());
        assert!(ctl.is_busy());
        assert!(ctl.settle(req.id(), Err(TutorError::Remote("x".into()))).is_some());
        assert!(ctl.settle(req.id(), Ok(String::new())).is_none());
    }

    #[test]
    fn cancel_returns_to_idle() {
        let (mut ctl, _engine) = setup();
        assert!(!ctl.cancel());
        let Submission::Dispatched(req) = ctl.submit("ls") else {
            panic!("expected dispatch");
        };
        assert!(ctl.cancel());
        assert_eq!(ctl.state(), SessionState::Idle);
        assert!(ctl.settle(req.id(), Ok("late".into())).is_none());
    }

    #[test]
    fn in_flight_request_keeps_its_context() {
        let (mut ctl, engine) = setup();
        let Submission::Dispatched(req) = ctl.submit("pwd") else {
            panic!("expected dispatch");
        };
        ctl.cancel();
        ctl.execute("cd images");
        // The old request still carries the home context.
        let out = req.run(engine.as_ref()).unwrap();
        assert_eq!(out, "[~] pwd");
        assert_eq!(ctl.session().context().cwd, "home/images");
    }

    #[test]
    fn replace_tree_resets_vanished_cwd_and_reseeds() {
        let (mut ctl, engine) = setup();
        ctl.execute("cd documents");
        let kept = ctl
            .replace_tree(Directory::new().with_dir("music", Directory::new()))
            .unwrap();
        assert!(!kept);
        assert!(ctl.vfs().current_path().is_root());
        assert_eq!(ctl.session().context().cwd, "~");
        assert!(!ctl.session().context().tree_json.contains("documents"));
        assert_eq!(ctl.context_generation(), 2);
        assert_eq!(
            *engine.sessions.lock().unwrap(),
            vec!["~", "home/documents", "~"]
        );
    }

    #[test]
    fn replace_tree_keeps_cwd_when_sync_fails() {
        let (mut ctl, engine) = setup();
        ctl.execute("cd music");
        *engine.fail_sessions.lock().unwrap() = true;
        let err = ctl
            .replace_tree(Directory::new().with_dir("music", Directory::new()))
            .unwrap_err();
        assert!(matches!(err, TutorError::ContextSync(_)));
        assert_eq!(ctl.vfs().cwd_display(), "home/music");
        assert!(ctl.vfs().list(ctl.vfs().current_path()).unwrap().is_empty());
    }

    #[test]
    fn guide_is_independent_of_path() {
        let (mut ctl, engine) = setup();
        ctl.execute("cd music");
        assert_eq!(ctl.guide("grep").unwrap(), "1. learn grep");
        assert!(ctl.guide("  ").is_err());
        assert_eq!(ctl.vfs().cwd_display(), "home/music");
        assert!(engine.sent.lock().unwrap().is_empty());
    }
}
