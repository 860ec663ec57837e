//! Display lines produced by the session.

/// How a line should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// Command output as returned by the engine.
    Normal,
    /// Confirmation of a local action.
    Success,
    /// Non-fatal problem; the session carries on.
    Warning,
    /// A failed command.
    Error,
}

/// One line of terminal output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub style: LineStyle,
    pub text: String,
}

impl OutputLine {
    pub fn normal(text: impl Into<String>) -> Self {
        Self {
            style: LineStyle::Normal,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            style: LineStyle::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            style: LineStyle::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            style: LineStyle::Error,
            text: text.into(),
        }
    }
}

/// Split multi-line engine output into display lines.
pub fn text_lines(text: &str) -> Vec<OutputLine> {
    text.lines().map(OutputLine::normal).collect()
}
