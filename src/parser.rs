//! Parsing & line I/O — the thin, dependency-free boundary layer that hands
//! the core a structured pipeline. No quoting, no expansion, no history;
//! deliberately thin, since that richness belongs in a separate layer.

use crate::config::Limits;
use crate::error::{Result, ShellError};
use crate::redirect::{self, Redirection};

#[derive(Debug, Clone)]
pub struct Stage {
    pub words: Vec<String>,
    pub redirections: Vec<Redirection>,
}

#[derive(Debug, Clone)]
pub struct ParsedLine {
    pub stages: Vec<Stage>,
    pub background: bool,
}

/// Split a raw line into words on runs of spaces/tabs/CR/LF. No quoting or
/// escaping of any kind.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split(|c: char| matches!(c, ' ' | '\t' | '\r' | '\n'))
        .filter(|word| !word.is_empty())
        .map(String::from)
        .collect()
}

/// Parse one input line into a pipeline, or `None` if it is empty after
/// tokenization (the caller should re-prompt without invoking the core).
pub fn parse(line: &str, limits: &Limits) -> Result<Option<ParsedLine>> {
    let words = tokenize(line);
    if words.is_empty() {
        return Ok(None);
    }

    let mut raw_stages: Vec<Vec<String>> = Vec::new();
    let mut current = Vec::new();
    for word in words {
        if word == "|" {
            raw_stages.push(std::mem::take(&mut current));
        } else {
            current.push(word);
        }
    }
    raw_stages.push(current);

    if raw_stages.len() > limits.max_pipeline_stages {
        return Err(ShellError::BadArgument(format!(
            "too many pipeline stages (max {})",
            limits.max_pipeline_stages
        )));
    }

    let background = match raw_stages.last_mut() {
        Some(last) if last.last().map(String::as_str) == Some("&") => {
            last.pop();
            true
        }
        _ => false,
    };

    let mut stages = Vec::with_capacity(raw_stages.len());
    for raw in raw_stages {
        if raw.is_empty() {
            return Err(ShellError::BadArgument("syntax error near '|'".into()));
        }
        let (words, redirections) = redirect::extract(raw)?;
        if words.len() > limits.max_words_per_stage {
            return Err(ShellError::BadArgument(format!(
                "too many words in one stage (max {})",
                limits.max_words_per_stage
            )));
        }
        if words.is_empty() {
            return Err(ShellError::BadArgument(
                "syntax error: redirection with no command".into(),
            ));
        }
        stages.push(Stage { words, redirections });
    }

    Ok(Some(ParsedLine { stages, background }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> Limits {
        Limits::default()
    }

    #[test]
    fn single_command_no_pipe() {
        let parsed = parse("ls -l", &limits()).unwrap().unwrap();
        assert_eq!(parsed.stages.len(), 1);
        assert_eq!(parsed.stages[0].words, vec!["ls", "-l"]);
        assert!(!parsed.background);
    }

    #[test]
    fn empty_line_is_none() {
        assert!(parse("", &limits()).unwrap().is_none());
        assert!(parse("   \t ", &limits()).unwrap().is_none());
    }

    #[test]
    fn pipeline_splits_on_bare_pipe() {
        let parsed = parse("ls | wc -l", &limits()).unwrap().unwrap();
        assert_eq!(parsed.stages.len(), 2);
        assert_eq!(parsed.stages[0].words, vec!["ls"]);
        assert_eq!(parsed.stages[1].words, vec!["wc", "-l"]);
    }

    #[test]
    fn trailing_ampersand_marks_background() {
        let parsed = parse("sleep 30 &", &limits()).unwrap().unwrap();
        assert!(parsed.background);
        assert_eq!(parsed.stages[0].words, vec!["sleep", "30"]);
    }

    #[test]
    fn ampersand_only_strips_from_the_last_stage() {
        let parsed = parse("cat | sort &", &limits()).unwrap().unwrap();
        assert!(parsed.background);
        assert_eq!(parsed.stages[1].words, vec!["sort"]);
    }

    #[test]
    fn redirections_are_pulled_off_the_owning_stage() {
        let parsed = parse("cat < in.txt | tr a-z A-Z > out.txt", &limits())
            .unwrap()
            .unwrap();
        assert_eq!(parsed.stages[0].words, vec!["cat"]);
        assert_eq!(parsed.stages[0].redirections.len(), 1);
        assert_eq!(parsed.stages[1].words, vec!["tr", "a-z", "A-Z"]);
        assert_eq!(parsed.stages[1].redirections.len(), 1);
    }

    #[test]
    fn too_many_stages_is_rejected() {
        let limits = Limits {
            max_pipeline_stages: 2,
            ..Limits::default()
        };
        assert!(parse("a | b | c", &limits).is_err());
    }

    #[test]
    fn too_many_words_is_rejected() {
        let limits = Limits {
            max_words_per_stage: 2,
            ..Limits::default()
        };
        assert!(parse("echo a b c", &limits).is_err());
    }

    #[test]
    fn empty_stage_between_pipes_is_a_syntax_error() {
        assert!(parse("ls | | wc", &limits()).is_err());
    }
}
