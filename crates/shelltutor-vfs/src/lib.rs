//! Simulated file system for the shelltutor terminal.
//!
//! The tree is a single rooted [`Directory`] built once per session. The
//! working directory is a [`VfsPath`] that is only ever assigned the result
//! of a successful resolution, so it always names an existing directory.

mod node;
mod path;

use log::debug;
use serde::ser::{Serialize, SerializeMap, Serializer};
use shelltutor_types::error::{Result, TutorError};

pub use node::{Directory, EntryKind, Node, VfsEntry, seed_home};
pub use path::{HOME, ROOT_NAME, VfsPath, accumulate, display_path, is_absolute};

/// A path that resolved to a node in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub path: VfsPath,
    pub node: &'a Node,
}

/// The session's directory tree and working directory.
#[derive(Debug, Clone)]
pub struct VirtualFileSystem {
    root: Node,
    cwd: VfsPath,
}

impl VirtualFileSystem {
    /// Create a file system rooted at `home`, positioned at the root.
    pub fn new(home: Directory) -> Self {
        Self {
            root: Node::Directory(home),
            cwd: VfsPath::root(),
        }
    }

    /// The fixed layout every teaching session starts with.
    pub fn seeded() -> Self {
        Self::new(seed_home())
    }

    /// Current working directory.
    pub fn current_path(&self) -> &VfsPath {
        &self.cwd
    }

    /// Current working directory in prompt form.
    pub fn cwd_display(&self) -> String {
        display_path(&self.cwd)
    }

    /// Resolve `input` against `base` and walk the tree.
    ///
    /// Fails with [`TutorError::NotFound`] when a segment is missing or a
    /// non-final segment is a file. Never mutates.
    pub fn resolve(&self, base: &VfsPath, input: &str) -> Result<Resolved<'_>> {
        let path = accumulate(base, input);
        let node = self
            .walk(&path)
            .ok_or_else(|| TutorError::NotFound(display_path(&path)))?;
        Ok(Resolved { path, node })
    }

    /// Look up the node at an already-accumulated path.
    fn walk(&self, path: &VfsPath) -> Option<&Node> {
        let mut node = &self.root;
        for segment in path.below_root() {
            node = node.as_dir()?.get(segment)?;
        }
        Some(node)
    }

    /// Change the working directory.
    ///
    /// Empty input and `~` go straight home. Anything else must resolve to a
    /// directory; on failure the working directory is left exactly as it was
    /// and the error carries the argument as typed.
    pub fn change_directory(&mut self, requested: &str) -> Result<VfsPath> {
        let target = requested.trim();
        if target.is_empty() || target == HOME {
            self.cwd = VfsPath::root();
            debug!("cd {target:?} -> {}", self.cwd);
            return Ok(self.cwd.clone());
        }

        let resolved = match self.resolve(&self.cwd, target) {
            Ok(r) if r.node.is_dir() => r.path,
            Ok(_) | Err(_) => {
                debug!("cd {target:?} rejected from {}", self.cwd);
                return Err(TutorError::NoSuchDirectory(requested.to_string()));
            },
        };
        debug!("cd {target:?}: {} -> {resolved}", self.cwd);
        self.cwd = resolved;
        Ok(self.cwd.clone())
    }

    /// Immediate children of the directory at `path`, in declaration order.
    pub fn list(&self, path: &VfsPath) -> Result<Vec<VfsEntry>> {
        let node = self
            .walk(path)
            .ok_or_else(|| TutorError::NotFound(display_path(path)))?;
        let dir = node
            .as_dir()
            .ok_or_else(|| TutorError::NotADirectory(display_path(path)))?;
        Ok(dir
            .iter()
            .map(|(name, node)| VfsEntry {
                name: name.to_string(),
                kind: node.kind(),
            })
            .collect())
    }

    /// Swap in a new tree and re-check the working directory against it.
    /// Returns `true` if the working directory survived.
    pub fn replace_tree(&mut self, home: Directory) -> bool {
        self.root = Node::Directory(home);
        self.revalidate()
    }

    /// Re-check the working directory against the tree, falling back to the
    /// root when it no longer names a directory. Returns `true` if the path
    /// was still valid.
    pub fn revalidate(&mut self) -> bool {
        if self.walk(&self.cwd).is_some_and(Node::is_dir) {
            return true;
        }
        log::warn!("working directory {} vanished, returning home", self.cwd);
        self.cwd = VfsPath::root();
        false
    }

    /// Deterministic JSON serialization of the whole tree, keyed by the root
    /// name.
    pub fn tree_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&RootedTree(&self.root))?)
    }

    /// `tree(1)`-style view of the whole tree, directories suffixed with `/`.
    pub fn render_tree(&self) -> String {
        let mut out = String::from(HOME);
        out.push('\n');
        self.render_level(&VfsPath::root(), "", &mut out);
        out
    }

    fn render_level(&self, path: &VfsPath, indent: &str, out: &mut String) {
        let Ok(entries) = self.list(path) else {
            return;
        };
        let count = entries.len();
        for (i, entry) in entries.iter().enumerate() {
            let last = i + 1 == count;
            out.push_str(indent);
            out.push_str(if last { "└── " } else { "├── " });
            out.push_str(&entry.name);
            if entry.is_dir() {
                out.push('/');
            }
            out.push('\n');
            if entry.is_dir() {
                let mut child = path.clone();
                child.push(&entry.name);
                let next_indent = format!("{indent}{}", if last { "    " } else { "│   " });
                self.render_level(&child, &next_indent, out);
            }
        }
    }
}

/// Serializes the root node under its [`ROOT_NAME`] key. Goes straight to
/// the serializer so child order survives (a `serde_json::Map` would sort).
struct RootedTree<'a>(&'a Node);

impl Serialize for RootedTree<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(ROOT_NAME, self.0)?;
        map.end()
    }
}

impl Default for VirtualFileSystem {
    fn default() -> Self {
        Self::seeded()
    }
}
