//! Context description handed to the response engine.

use shelltutor_types::error::Result;
use shelltutor_vfs::{HOME, VirtualFileSystem};

/// Everything the engine is told about the simulated machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Working directory in display form (`~`, `home/documents`).
    pub cwd: String,
    /// Structural serialization of the whole tree.
    pub tree_json: String,
    /// The full natural-language description sent as the system prompt.
    pub description: String,
}

impl SessionContext {
    /// Build the context for the file system's current state.
    pub fn describe(vfs: &VirtualFileSystem) -> Result<Self> {
        let cwd = vfs.cwd_display();
        let tree_json = vfs.tree_json()?;
        let description = render_description(&cwd, &tree_json);
        Ok(Self {
            cwd,
            tree_json,
            description,
        })
    }
}

fn render_description(cwd: &str, tree_json: &str) -> String {
    format!(
        "You are a Linux terminal used to teach a beginner the command line.\n\
         Reply only with the exact output the command would print, with no \
         explanations and no markdown code fences. Stay in character as the \
         terminal at all times. Keep output short.\n\
         \n\
         The user's home directory is `{HOME}` (absolute path /home). \
         Current working directory: {cwd}\n\
         \n\
         The file system contains exactly the following tree. \"directory\" \
         nodes list their children in order; \"file\" nodes are regular files.\n\
         {tree_json}\n\
         \n\
         Rules:\n\
         - `pwd` prints the absolute path, e.g. /home or /home/documents.\n\
         - `ls` prints entry names on one line separated by two spaces, \
         directories suffixed with `/`.\n\
         - Paths that are not in the tree do not exist; print the error a \
         real shell would print.\n\
         - Commands that would change files print what a real shell prints, \
         but the tree above stays as it is.\n\
         - Unknown commands print `<command>: command not found`."
    )
}

/// Prompt used for the tutorial feature.
pub fn guide_prompt(goal: &str) -> String {
    format!(
        "Write a short, beginner-friendly tutorial for the following goal on \
         a Linux command line. Use numbered steps, show each command on its \
         own line, and explain in one sentence what it does.\n\
         \n\
         Goal: {}",
        goal.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_includes_cwd_and_tree() {
        let mut vfs = VirtualFileSystem::seeded();
        vfs.change_directory("documents").unwrap();
        let ctx = SessionContext::describe(&vfs).unwrap();
        assert_eq!(ctx.cwd, "home/documents");
        assert!(ctx.description.contains("Current working directory: home/documents"));
        assert!(ctx.description.contains(&ctx.tree_json));
        assert!(ctx.tree_json.contains("report.docx"));
    }

    #[test]
    fn describe_is_deterministic() {
        let vfs = VirtualFileSystem::seeded();
        let a = SessionContext::describe(&vfs).unwrap();
        let b = SessionContext::describe(&vfs).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn only_cwd_changes_between_directories() {
        let mut vfs = VirtualFileSystem::seeded();
        let home = SessionContext::describe(&vfs).unwrap();
        vfs.change_directory("music").unwrap();
        let music = SessionContext::describe(&vfs).unwrap();
        assert_eq!(home.tree_json, music.tree_json);
        assert_ne!(home.description, music.description);
    }

    #[test]
    fn guide_prompt_embeds_goal() {
        let p = guide_prompt("  find large files ");
        assert!(p.ends_with("Goal: find large files"));
    }
}
