//! Command-line arguments.

use std::path::PathBuf;

use shelltutor_types::error::{Result, TutorError};

pub const USAGE: &str = "\
usage: shelltutor [--config <path>] [--offline] [--tree] [--guide <goal...>]

  --config <path>   read settings from a TOML file (default: $SHELLTUTOR_CONFIG)
  --offline         answer commands with the built-in engine, no network
  --tree            print the practice directory tree and exit
  --guide <goal>    print a step-by-step tutorial for <goal> and exit
  -h, --help        show this help";

/// Parsed arguments.
#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub offline: bool,
    pub tree: bool,
    pub guide: Option<String>,
    pub help: bool,
}

impl CliArgs {
    /// Parse arguments (without the program name).
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = args
                        .next()
                        .ok_or_else(|| TutorError::Usage("--config needs a path".to_string()))?;
                    parsed.config = Some(PathBuf::from(path));
                },
                "--offline" => parsed.offline = true,
                "--tree" => parsed.tree = true,
                "-h" | "--help" => parsed.help = true,
                "--guide" => {
                    // The goal is free text: everything after the flag.
                    let goal = args.by_ref().collect::<Vec<_>>().join(" ");
                    if goal.trim().is_empty() {
                        return Err(TutorError::Usage("--guide needs a goal".to_string()));
                    }
                    parsed.guide = Some(goal);
                },
                other => {
                    return Err(TutorError::Usage(format!("unknown argument: {other}")));
                },
            }
        }
        Ok(parsed)
    }
}
