//! Writing output lines to the terminal.

use std::io::{self, IsTerminal, Write};

use shelltutor_terminal::{LineStyle, OutputLine};

const RESET: &str = "\x1b[0m";

fn color_for(style: LineStyle) -> Option<&'static str> {
    match style {
        LineStyle::Normal => None,
        LineStyle::Success => Some("\x1b[32m"),
        LineStyle::Warning => Some("\x1b[33m"),
        LineStyle::Error => Some("\x1b[31m"),
    }
}

/// Line writer; colors only when stdout is a terminal.
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            color: io::stdout().is_terminal(),
        }
    }

    pub fn format(&self, line: &OutputLine) -> String {
        match color_for(line.style) {
            Some(code) if self.color => format!("{code}{}{RESET}", line.text),
            _ => line.text.clone(),
        }
    }

    pub fn lines(&self, lines: &[OutputLine]) -> io::Result<()> {
        let mut out = io::stdout().lock();
        for line in lines {
            writeln!(out, "{}", self.format(line))?;
        }
        out.flush()
    }

    pub fn prompt(&self, prompt: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        write!(out, "{prompt}")?;
        out.flush()
    }
}
