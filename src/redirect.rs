//! Per-stage redirection extraction.
//!
//! `<file`, `>file`, `>>file` are recognized only with the filename as a
//! separate word — attached forms like `>out` are not.

use crate::error::{Result, ShellError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// `<file` — open for reading, duped onto stdin.
    In,
    /// `>file` — open for writing, truncating, duped onto stdout.
    Out,
    /// `>>file` — open for writing, appending, duped onto stdout.
    Append,
}

#[derive(Debug, Clone)]
pub struct Redirection {
    pub kind: RedirectKind,
    pub path: String,
}

/// Scan a stage's words for redirection operators, removing each operator
/// and its filename from the word list. Order among redirections of the
/// same stage is preserved so a later one wins, matching ordinary shell
/// semantics.
pub fn extract(words: Vec<String>) -> Result<(Vec<String>, Vec<Redirection>)> {
    let mut remaining = Vec::with_capacity(words.len());
    let mut redirections = Vec::new();
    let mut iter = words.into_iter();

    while let Some(word) = iter.next() {
        let kind = match word.as_str() {
            "<" => Some(RedirectKind::In),
            ">" => Some(RedirectKind::Out),
            ">>" => Some(RedirectKind::Append),
            _ => None,
        };

        match kind {
            Some(kind) => {
                let path = iter.next().ok_or_else(|| {
                    ShellError::BadRedirection(format!(
                        "syntax error: expected filename after '{word}'"
                    ))
                })?;
                redirections.push(Redirection { kind, path });
            }
            None => remaining.push(word),
        }
    }

    Ok((remaining, redirections))
}
