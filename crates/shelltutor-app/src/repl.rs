//! Interactive event loop.
//!
//! Two producers feed one channel: a thread reading stdin and, while a
//! command is with the engine, a worker thread running that request. The
//! loop here is the only owner of the controller, so events are handled
//! strictly one at a time.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Sender};
use std::thread;

use log::{debug, warn};
use shelltutor_terminal::{PendingRequest, SessionController, Submission};
use shelltutor_types::error::{Result, TutorError};

use crate::render::Renderer;

enum Event {
    Line(String),
    Eof,
    Reply { id: u64, result: Result<String> },
}

/// Delivers a request's result exactly once, even if the worker unwinds.
struct ReplyGuard {
    tx: Sender<Event>,
    id: u64,
    delivered: bool,
}

impl ReplyGuard {
    fn deliver(mut self, result: Result<String>) {
        self.delivered = true;
        let _ = self.tx.send(Event::Reply {
            id: self.id,
            result,
        });
    }
}

impl Drop for ReplyGuard {
    fn drop(&mut self) {
        if !self.delivered {
            let _ = self.tx.send(Event::Reply {
                id: self.id,
                result: Err(TutorError::Remote("request aborted".to_string())),
            });
        }
    }
}

fn spawn_stdin_reader(tx: Sender<Event>) {
    thread::spawn(move || read_lines(io::stdin().lock(), &tx));
}

/// Forward lines until end of input. Undecodable bytes are replaced rather
/// than ending the session.
fn read_lines<R: BufRead>(mut reader: R, tx: &Sender<Event>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {},
            Err(e) => {
                warn!("stdin read failed: {e}");
                break;
            },
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        let line = String::from_utf8_lossy(&buf).into_owned();
        if tx.send(Event::Line(line)).is_err() {
            return;
        }
    }
    let _ = tx.send(Event::Eof);
}

fn spawn_request(ctl: &SessionController, req: PendingRequest, tx: Sender<Event>) {
    let engine = ctl.engine();
    thread::spawn(move || {
        let guard = ReplyGuard {
            tx,
            id: req.id(),
            delivered: false,
        };
        let result = req.run(engine.as_ref());
        guard.deliver(result);
    });
}

fn is_exit(line: &str) -> bool {
    matches!(line.trim(), "exit" | "quit" | "logout")
}

/// Run the session until `exit` or end of input.
pub fn run(ctl: &mut SessionController, renderer: &Renderer) -> io::Result<()> {
    let (tx, rx) = mpsc::channel();
    spawn_stdin_reader(tx.clone());

    let mut closing = false;
    renderer.prompt(&ctl.prompt())?;

    while let Ok(event) = rx.recv() {
        match event {
            Event::Line(line) => {
                if is_exit(&line) {
                    break;
                }
                match ctl.submit(&line) {
                    Submission::Dispatched(req) => {
                        debug!("Request #{} handed to worker", req.id());
                        spawn_request(ctl, req, tx.clone());
                        continue;
                    },
                    other => renderer.lines(&other.feedback())?,
                }
            },
            Event::Eof => {
                if !ctl.is_busy() {
                    break;
                }
                // Let the outstanding reply print before leaving.
                closing = true;
                continue;
            },
            Event::Reply { id, result } => {
                match ctl.settle(id, result) {
                    Some(reply) => renderer.lines(&reply.lines())?,
                    None => warn!("Dropped reply for request #{id}"),
                }
                if closing {
                    break;
                }
            },
        }
        if !ctl.is_busy() {
            renderer.prompt(&ctl.prompt())?;
        }
    }
    println!();
    Ok(())
}
