//! Offline response engine.
//!
//! Answers a handful of common commands from the session context alone, so
//! the tutor runs without network access or credentials. Anything it does
//! not know prints `command not found`, like a shell missing the binary.

use serde_json::Value;
use shelltutor_types::error::Result;
use shelltutor_vfs::{ROOT_NAME, VfsPath, accumulate};

use crate::context::SessionContext;
use crate::engine::{ResponseEngine, SessionHandle};
use crate::parse::CommandLine;

const OFFLINE_COMMANDS: &[&str] = &["cat", "clear", "echo", "help", "ls", "pwd", "whoami"];

/// Deterministic engine backed by the serialized tree.
#[derive(Debug, Clone)]
pub struct ScriptedEngine {
    user: String,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            user: "student".to_string(),
        }
    }

    fn answer(&self, context: &SessionContext, cmd: &CommandLine) -> Result<String> {
        let tree: Value = serde_json::from_str(&context.tree_json)?;
        let cwd = accumulate(&VfsPath::root(), &context.cwd);
        let operands: Vec<&str> = cmd
            .args
            .iter()
            .map(String::as_str)
            .filter(|a| !a.starts_with('-'))
            .collect();

        let out = match cmd.command.as_str() {
            "pwd" => format!("/{}", cwd.segments().join("/")),
            "whoami" => self.user.clone(),
            "echo" => cmd.args.join(" "),
            "clear" => String::new(),
            "help" => format!("Available offline: {}", OFFLINE_COMMANDS.join(", ")),
            "ls" => {
                let target = operands.first().copied().unwrap_or(".");
                list(&tree, &cwd, target)
            },
            "cat" if operands.is_empty() => "cat: missing operand".to_string(),
            "cat" => operands
                .iter()
                .map(|arg| cat(&tree, &cwd, arg))
                .collect::<Vec<_>>()
                .join("\n"),
            other => format!("{other}: command not found"),
        };
        Ok(out)
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseEngine for ScriptedEngine {
    fn create_session(&self, context: SessionContext) -> Result<SessionHandle> {
        Ok(SessionHandle::new(context))
    }

    fn send(&self, session: &SessionHandle, line: &str) -> Result<String> {
        match CommandLine::parse(line) {
            Ok(Some(cmd)) => self.answer(session.context(), &cmd),
            Ok(None) => Ok(String::new()),
            Err(_) => Ok("bash: unexpected EOF while looking for matching quote".to_string()),
        }
    }

    fn generate_guide(&self, goal: &str) -> Result<String> {
        Ok(format!(
            "Goal: {}\n\
             1. Run `pwd` to see where you are.\n\
             2. Run `ls` to list what is in the current directory.\n\
             3. Use `cd <directory>` to move around and `cd ..` to go back up.\n\
             4. Run `help` to see which commands work offline.",
            goal.trim()
        ))
    }
}

/// Find the serialized node for `path`.
fn lookup<'a>(tree: &'a Value, path: &VfsPath) -> Option<&'a Value> {
    let mut node = tree.get(ROOT_NAME)?;
    for segment in path.below_root() {
        node = node.get("children")?.get(segment)?;
    }
    Some(node)
}

fn is_dir(node: &Value) -> bool {
    node.get("type").and_then(Value::as_str) == Some("directory")
}

fn list(tree: &Value, cwd: &VfsPath, target: &str) -> String {
    let path = accumulate(cwd, target);
    let Some(node) = lookup(tree, &path) else {
        return format!("ls: cannot access '{target}': No such file or directory");
    };
    if !is_dir(node) {
        return path.name().to_string();
    }
    let Some(children) = node.get("children").and_then(Value::as_object) else {
        return String::new();
    };
    let mut names: Vec<String> = children
        .iter()
        .map(|(name, child)| {
            if is_dir(child) {
                format!("{name}/")
            } else {
                name.clone()
            }
        })
        .collect();
    names.sort();
    names.join("  ")
}

fn cat(tree: &Value, cwd: &VfsPath, target: &str) -> String {
    let path = accumulate(cwd, target);
    match lookup(tree, &path) {
        None => format!("cat: {target}: No such file or directory"),
        Some(node) if is_dir(node) => format!("cat: {target}: Is a directory"),
        Some(_) => format!("({} is empty in offline mode)", path.name()),
    }
}
