//! Command-line splitting.

use shelltutor_types::error::{Result, TutorError};

/// A command line split into its command token and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub command: String,
    pub args: Vec<String>,
    /// The trimmed line as typed, forwarded verbatim to the response engine.
    pub raw: String,
}

impl CommandLine {
    /// Split a line. Returns `Ok(None)` for blank input.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let raw = line.trim();
        let mut tokens = tokenize(raw)?.into_iter();
        let Some(command) = tokens.next() else {
            return Ok(None);
        };
        Ok(Some(Self {
            command,
            args: tokens.collect(),
            raw: raw.to_string(),
        }))
    }
}

/// First whitespace-separated word of a line, without quote handling.
///
/// Enough to decide whether a line is handled locally; lines that are
/// forwarded never need full tokenizing.
pub fn command_word(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

/// Split a line into words for `cd` and the offline engine.
///
/// Either quote character groups text literally until its match; outside
/// quotes a backslash keeps the next character, so `my\ files` is one word.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut word: Option<String> = None;
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => word.get_or_insert_with(String::new).push(c),
            (None, '\'' | '"') => {
                quote = Some(ch);
                word.get_or_insert_with(String::new);
            },
            (None, '\\') => {
                let buf = word.get_or_insert_with(String::new);
                buf.extend(chars.next());
            },
            (None, c) if c.is_whitespace() => words.extend(word.take()),
            (None, c) => word.get_or_insert_with(String::new).push(c),
        }
    }

    if let Some(q) = quote {
        return Err(TutorError::Usage(format!("unterminated quote: {q}")));
    }
    words.extend(word);
    Ok(words)
}
