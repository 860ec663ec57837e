//! Path segments and textual path handling.
//!
//! A [`VfsPath`] is the working-directory view into the tree: a sequence of
//! segments that always begins with [`ROOT_NAME`]. Parsing user input into
//! segments happens here; checking those segments against the tree happens
//! in [`crate::VirtualFileSystem::resolve`].

use std::fmt;

/// The home sentinel as typed by the user (`cd ~`, `~/documents`).
pub const HOME: &str = "~";

/// Name of the root segment stored in every path and shown in prompts.
pub const ROOT_NAME: &str = "home";

/// Ordered path segments from the root to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VfsPath {
    segments: Vec<String>,
}

impl VfsPath {
    /// The root path, `[home]`.
    pub fn root() -> Self {
        Self {
            segments: vec![ROOT_NAME.to_string()],
        }
    }

    /// Build a path from raw segments. Returns `None` unless the first
    /// segment is [`ROOT_NAME`].
    pub fn from_segments<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.first().map(String::as_str) != Some(ROOT_NAME) {
            return None;
        }
        Some(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    /// Segments below the root.
    pub fn below_root(&self) -> &[String] {
        &self.segments[1..]
    }

    /// Last segment (the directory's own name).
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or(ROOT_NAME)
    }

    /// Append a segment.
    pub fn push(&mut self, segment: &str) {
        self.segments.push(segment.to_string());
    }

    /// Drop the last segment. A no-op at the root: there is nothing above
    /// home.
    pub fn pop(&mut self) {
        if !self.is_root() {
            self.segments.pop();
        }
    }
}

impl Default for VfsPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display_path(self))
    }
}

/// Render a path for prompts and for the engine context.
///
/// The root alone is shown as the home sentinel (`~`); deeper paths are the
/// segments joined with `/` (`home/documents`).
pub fn display_path(path: &VfsPath) -> String {
    if path.is_root() {
        HOME.to_string()
    } else {
        path.segments.join("/")
    }
}

/// Whether `input` names a location from the root rather than from the
/// working directory.
///
/// Absolute forms: a leading `/`, a leading `~` segment, or a leading
/// [`ROOT_NAME`] segment (the form [`display_path`] produces).
pub fn is_absolute(input: &str) -> bool {
    if input.starts_with('/') {
        return true;
    }
    let first = input.split('/').next().unwrap_or("");
    first == HOME || first == ROOT_NAME
}

/// Fold `input` onto `base`, handling `.`, `..`, and empty segments.
///
/// No existence checks happen here; unknown names are appended as-is.
pub fn accumulate(base: &VfsPath, input: &str) -> VfsPath {
    let mut parts = input.split('/').peekable();
    let mut acc = if is_absolute(input) {
        // `/home/x`, `~/x`, and `home/x` all name the same place.
        while parts.next_if_eq(&"").is_some() {}
        parts.next_if(|s| *s == HOME || *s == ROOT_NAME);
        VfsPath::root()
    } else {
        base.clone()
    };

    for segment in parts {
        match segment {
            "" | "." => {},
            ".." => acc.pop(),
            other => acc.push(other),
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segs: &[&str]) -> VfsPath {
        VfsPath::from_segments(segs.iter().copied()).unwrap()
    }

    #[test]
    fn root_displays_as_sentinel() {
        assert_eq!(display_path(&VfsPath::root()), "~");
    }

    #[test]
    fn nested_displays_joined() {
        assert_eq!(display_path(&path(&["home", "documents"])), "home/documents");
        assert_eq!(path(&["home", "a", "b"]).to_string(), "home/a/b");
    }

    #[test]
    fn from_segments_requires_root() {
        assert!(VfsPath::from_segments(["documents"]).is_none());
        assert!(VfsPath::from_segments(Vec::<String>::new()).is_none());
        assert!(VfsPath::from_segments(["home"]).unwrap().is_root());
    }

    #[test]
    fn pop_stops_at_root() {
        let mut p = path(&["home", "a"]);
        p.pop();
        p.pop();
        p.pop();
        assert!(p.is_root());
    }

    #[test]
    fn absolute_forms() {
        assert!(is_absolute("~"));
        assert!(is_absolute("~/documents"));
        assert!(is_absolute("/images"));
        assert!(is_absolute("home/music"));
        assert!(!is_absolute("documents"));
        assert!(!is_absolute("../images"));
        assert!(!is_absolute("~user"));
    }

    #[test]
    fn accumulate_relative() {
        let base = path(&["home", "documents"]);
        assert_eq!(accumulate(&base, "../images"), path(&["home", "images"]));
    }

    #[test]
    fn accumulate_absolute_ignores_base() {
        let base = path(&["home", "documents"]);
        assert_eq!(accumulate(&base, "~/music"), path(&["home", "music"]));
        assert_eq!(accumulate(&base, "/music"), path(&["home", "music"]));
        assert_eq!(accumulate(&base, "home/music"), path(&["home", "music"]));
        assert_eq!(accumulate(&base, "~"), VfsPath::root());
        assert_eq!(accumulate(&base, "/"), VfsPath::root());
    }

    #[test]
    fn accumulate_linux_style_home() {
        let base = VfsPath::root();
        assert_eq!(accumulate(&base, "/home/documents"), path(&["home", "documents"]));
        assert_eq!(accumulate(&base, "~/home"), path(&["home", "home"]));
    }

    #[test]
    fn accumulate_skips_dot_and_empty() {
        let base = VfsPath::root();
        assert_eq!(
            accumulate(&base, "./documents//./"),
            path(&["home", "documents"])
        );
    }

    #[test]
    fn accumulate_dotdot_at_root_is_noop() {
        let base = path(&["home", "images"]);
        assert_eq!(accumulate(&base, "../../.."), VfsPath::root());
        assert_eq!(accumulate(&VfsPath::root(), "../music"), path(&["home", "music"]));
    }

    #[test]
    fn accumulate_does_not_check_existence() {
        let base = VfsPath::root();
        assert_eq!(accumulate(&base, "ghost/x"), path(&["home", "ghost", "x"]));
    }
}
