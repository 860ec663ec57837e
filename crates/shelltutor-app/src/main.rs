//! shelltutor entry point.
//!
//! A practice terminal for command-line beginners. `cd` moves around a small
//! simulated home directory; every other command is answered by a language
//! model (or the offline engine) that pretends to be the shell.

mod cli;
mod render;
mod repl;

use std::sync::Arc;

use anyhow::Result;

use cli::{CliArgs, USAGE};
use render::Renderer;
use shelltutor_net::ChatEngine;
use shelltutor_terminal::{OutputLine, ResponseEngine, ScriptedEngine, SessionController};
use shelltutor_types::config::TutorConfig;
use shelltutor_vfs::VirtualFileSystem;

fn build_engine(config: &TutorConfig, offline: bool) -> Result<Arc<dyn ResponseEngine>> {
    if offline || config.session.offline {
        log::info!("Running with the offline engine");
        return Ok(Arc::new(ScriptedEngine::new()));
    }
    Ok(Arc::new(ChatEngine::from_config(&config.engine)?))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse(std::env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = TutorConfig::discover(args.config.as_deref())?;
    let vfs = VirtualFileSystem::seeded();

    if args.tree {
        print!("{}", vfs.render_tree());
        return Ok(());
    }

    // Initialization failures end here, before any input is accepted.
    let engine = build_engine(&config, args.offline)?;
    let mut ctl = SessionController::new(vfs, engine)?;
    let renderer = Renderer::new();

    if let Some(goal) = args.guide {
        println!("{}", ctl.guide(&goal)?);
        return Ok(());
    }

    renderer.lines(&[OutputLine::success(
        "Practice terminal. Type commands as you would in a real shell; `exit` to leave.",
    )])?;
    if config.session.show_tree_on_start {
        print!("{}", ctl.vfs().render_tree());
    }

    repl::run(&mut ctl, &renderer)?;
    Ok(())
}
