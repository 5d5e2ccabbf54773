//! Yes/no confirmation prompts.

use std::io::{self, BufRead, IsTerminal, Write};

use crate::error::{CliError, CliResult};

/// Asks the user before destructive or pointless work.
#[derive(Debug, Clone, Copy)]
pub struct Prompter {
    assume_yes: bool,
    interactive: bool,
}

impl Prompter {
    /// `assume_yes` answers every question with yes. Without a terminal on
    /// stdin every question is answered with no.
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            interactive: io::stdin().is_terminal(),
        }
    }

    /// Ask `question` on stderr and read the answer from stdin.
    pub fn confirm(&self, question: &str) -> CliResult<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        if !self.interactive {
            return Ok(false);
        }
        let stdin = io::stdin();
        let mut input = stdin.lock();
        ask(question, &mut input, &mut io::stderr())
    }

    /// Like [`confirm`](Self::confirm), but a "no" aborts with
    /// [`CliError::Declined`].
    pub fn require(&self, question: &str) -> CliResult<()> {
        if self.confirm(question)? {
            Ok(())
        } else {
            Err(CliError::Declined(question.to_string()))
        }
    }
}

fn ask<R: BufRead, W: Write>(question: &str, input: &mut R, output: &mut W) -> CliResult<bool> {
    write!(output, "{} [y/N] ", question)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
