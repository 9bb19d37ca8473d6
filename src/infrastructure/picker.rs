//! Interactive multi-select on the terminal.
//!
//! Prints a numbered list and reads a selection such as `1,3,5-7`, `all`,
//! or an empty line for none. Line input goes through rustyline.

use std::collections::BTreeSet;
use std::io::{self, Write};

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::domain::{AppError, Result};

const SELECTION_PROMPT: &str = "Numbers or ranges (e.g. 1,3,5-7), 'all', or empty for none: ";

/// Picks a subset of labelled options, returning their indices in list order.
pub trait Picker {
    /// # Errors
    /// Returns error if the selection cannot be read.
    fn pick(&mut self, title: &str, options: &[String]) -> Result<Vec<usize>>;
}

/// Picker reading lines with a rustyline editor and listing options on stdout.
#[derive(Debug, Default)]
pub struct TerminalPicker;

impl Picker for TerminalPicker {
    fn pick(&mut self, title: &str, options: &[String]) -> Result<Vec<usize>> {
        let mut editor = DefaultEditor::new().map_err(|e| AppError::Prompt {
            message: format!("Failed to open terminal: {e}"),
        })?;
        pick_from(
            |prompt| read_selection(&mut editor, prompt),
            &mut io::stdout(),
            title,
            options,
        )
    }
}

/// Reads one line; `None` when the user closed input or pressed Ctrl-C.
fn read_selection(editor: &mut DefaultEditor, prompt: &str) -> Result<Option<String>> {
    match editor.readline(prompt) {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Eof | ReadlineError::Interrupted) => Ok(None),
        Err(e) => Err(AppError::Prompt {
            message: format!("Failed to read selection: {e}"),
        }),
    }
}

/// Runs the selection dialog, listing options on `output` and reading
/// answers from `read_line` until one parses.
fn pick_from<F, W>(
    mut read_line: F,
    output: &mut W,
    title: &str,
    options: &[String],
) -> Result<Vec<usize>>
where
    F: FnMut(&str) -> Result<Option<String>>,
    W: Write,
{
    let io_err = |e| AppError::io("Failed to write prompt", e);

    writeln!(output, "{}", title.bold()).map_err(io_err)?;
    if options.is_empty() {
        writeln!(output, "  (nothing to select)").map_err(io_err)?;
        return Ok(Vec::new());
    }
    for (i, option) in options.iter().enumerate() {
        writeln!(output, "  {:3}. {}", i + 1, option).map_err(io_err)?;
    }

    loop {
        output.flush().map_err(io_err)?;

        let Some(line) = read_line(SELECTION_PROMPT)? else {
            return Err(AppError::Prompt {
                message: "input closed before a selection was made".into(),
            });
        };

        match parse_selection(&line, options.len()) {
            Ok(indices) => {
                writeln!(output).map_err(io_err)?;
                return Ok(indices);
            }
            Err(message) => writeln!(output, "{} {message}", "!".red()).map_err(io_err)?,
        }
    }
}

/// Parses a selection into sorted, de-duplicated 0-based indices.
fn parse_selection(input: &str, len: usize) -> std::result::Result<Vec<usize>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }
    if input.eq_ignore_ascii_case("all") {
        return Ok((0..len).collect());
    }

    let parse_number = |s: &str| -> std::result::Result<usize, String> {
        let n: usize = s
            .trim()
            .parse()
            .map_err(|_| format!("'{s}' is not a number"))?;
        if n == 0 || n > len {
            return Err(format!("{n} is out of range (1-{len})"));
        }
        Ok(n - 1)
    };

    let mut selected = BTreeSet::new();
    for token in input.split([',', ' ']).filter(|t| !t.trim().is_empty()) {
        if let Some((start, end)) = token.split_once('-') {
            let (start, end) = (parse_number(start)?, parse_number(end)?);
            if start > end {
                return Err(format!("range '{token}' is reversed"));
            }
            selected.extend(start..=end);
        } else {
            selected.insert(parse_number(token)?);
        }
    }

    Ok(selected.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("1,3", 5), Ok(vec![0, 2]));
        assert_eq!(parse_selection(" 2-4 1 ", 5), Ok(vec![0, 1, 2, 3]));
        assert_eq!(parse_selection("ALL", 3), Ok(vec![0, 1, 2]));
        assert_eq!(parse_selection("\n", 3), Ok(vec![]));
        assert!(parse_selection("0", 3).is_err());
        assert!(parse_selection("4", 3).is_err());
        assert!(parse_selection("3-1", 3).is_err());
        assert!(parse_selection("x", 3).is_err());
    }

    /// Answers prompts from a fixed list, recording each prompt shown.
    fn scripted<'a>(
        answers: &'a [&'a str],
        prompts: &'a mut Vec<String>,
    ) -> impl FnMut(&str) -> Result<Option<String>> + 'a {
        let mut answers = answers.iter();
        move |prompt| {
            prompts.push(prompt.to_string());
            Ok(answers.next().map(|a| (*a).to_string()))
        }
    }

    #[test]
    fn test_pick_reprompts_on_invalid_input() {
        let options = vec!["general".to_string(), "random".to_string()];
        let mut prompts = Vec::new();
        let mut output = Vec::new();

        let picked = pick_from(
            scripted(&["9", "2"], &mut prompts),
            &mut output,
            "Select:",
            &options,
        )
        .unwrap();

        assert_eq!(picked, vec![1]);
        assert_eq!(prompts, vec![SELECTION_PROMPT, SELECTION_PROMPT]);
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("1. general"));
        assert!(shown.contains("out of range"));
    }

    #[test]
    fn test_pick_fails_on_closed_input() {
        let options = vec!["general".to_string()];
        let mut prompts = Vec::new();
        let mut output = Vec::new();

        let err = pick_from(scripted(&[], &mut prompts), &mut output, "Select:", &options)
            .unwrap_err();
        assert!(matches!(err, AppError::Prompt { .. }));
    }

    #[test]
    fn test_pick_without_options_reads_nothing() {
        let mut prompts = Vec::new();
        let mut output = Vec::new();

        let picked = pick_from(scripted(&[], &mut prompts), &mut output, "Select:", &[]).unwrap();

        assert!(picked.is_empty());
        assert!(prompts.is_empty());
    }
}
