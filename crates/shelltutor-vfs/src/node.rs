//! Tree nodes.
//!
//! A [`Directory`] owns its children outright; there is no sharing and no
//! way to build a cycle. Children keep the order they were inserted in, which
//! is the order `ls`-style listings and the serialized tree use.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// One named entry in the simulated tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Directory(Directory),
    File,
}

impl Node {
    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    /// The directory payload, if this node is one.
    pub fn as_dir(&self) -> Option<&Directory> {
        match self {
            Node::Directory(dir) => Some(dir),
            Node::File => None,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Node::Directory(_) => EntryKind::Directory,
            Node::File => EntryKind::File,
        }
    }
}

/// Type of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// A single entry returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl VfsEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Ordered mapping of child name to node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    children: Vec<(String, Node)>,
}

impl Directory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a child. An existing child with the same name is replaced in
    /// place and keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, node: Node) {
        let name = name.into();
        match self.children.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = node,
            None => self.children.push((name, node)),
        }
    }

    /// Builder form of [`insert`](Self::insert) for a subdirectory.
    pub fn with_dir(mut self, name: impl Into<String>, dir: Directory) -> Self {
        self.insert(name, Node::Directory(dir));
        self
    }

    /// Builder form of [`insert`](Self::insert) for a file.
    pub fn with_file(mut self, name: impl Into<String>) -> Self {
        self.insert(name, Node::File);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    /// Children in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(n, node)| (n.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

// Directories serialize as `{"type": "directory", "children": {..}}` and
// files as `{"type": "file"}`. Map keys follow insertion order, so an
// unchanged tree always produces the same text.
impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Directory(dir) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "directory")?;
                map.serialize_entry("children", dir)?;
                map.end()
            },
            Node::File => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("type", "file")?;
                map.end()
            },
        }
    }
}

impl Serialize for Directory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.children.len()))?;
        for (name, node) in &self.children {
            map.serialize_entry(name, node)?;
        }
        map.end()
    }
}

/// The layout every session starts with.
pub fn seed_home() -> Directory {
    Directory::new()
        .with_dir("documents", Directory::new().with_file("report.docx"))
        .with_dir(
            "images",
            Directory::new()
                .with_file("photo.jpg")
                .with_file("vacation.png"),
        )
        .with_dir("music", Directory::new())
        .with_file("file1.txt")
}
