//! Terminal prompts

use std::io::{self, BufRead, Write};

use anyhow::Result;

/// Whether stdin is attached to a terminal
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin)
}

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !is_interactive() {
        return Ok(false);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    confirm_with(&mut stdin.lock(), &mut stdout, prompt)
}

/// Ask a yes/no question on arbitrary streams; end of input means no
pub fn confirm_with<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> Result<bool> {
    write!(out, "{} [y/N] ", prompt)?;
    out.flush()?;

    Ok(read_answer(input)?
        .map(|answer| {
            let answer = answer.to_lowercase();
            answer == "y" || answer == "yes"
        })
        .unwrap_or(false))
}

/// Read one trimmed line; `None` at end of input
pub fn read_answer<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_confirm_accepts_yes() {
        for answer in ["y\n", "Y\n", "yes\n", " YES \n"] {
            let mut input = Cursor::new(answer);
            let mut out = Vec::new();
            assert!(confirm_with(&mut input, &mut out, "Delete?").unwrap());
            assert_eq!(String::from_utf8(out).unwrap(), "Delete? [y/N] ");
        }
    }

    #[test]
    fn test_confirm_defaults_to_no() {
        for answer in ["\n", "n\n", "nope\n", ""] {
            let mut input = Cursor::new(answer);
            let mut out = Vec::new();
            assert!(!confirm_with(&mut input, &mut out, "Delete?").unwrap());
        }
    }

    #[test]
    fn test_read_answer_eof() {
        let mut input = Cursor::new("first\n");
        assert_eq!(read_answer(&mut input).unwrap().as_deref(), Some("first"));
        assert_eq!(read_answer(&mut input).unwrap(), None);
    }
}
