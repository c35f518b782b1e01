use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// Operator commands accepted between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `P`: print the current weights, then ask again.
    PrintWeights,
    /// `E`: score the whole evaluation partition once.
    Evaluate,
    /// `R`: train for a number of samples read next.
    Train,
}

impl Command {
    /// Parses the first non-whitespace character of `line`; the rest of the
    /// line is ignored.
    pub fn parse(line: &str) -> Option<Command> {
        match line.trim_start().chars().next()? {
            'P' => Some(Command::PrintWeights),
            'E' => Some(Command::Evaluate),
            'R' => Some(Command::Train),
            _ => None,
        }
    }
}

/// Where operator input comes from.
///
/// `read_line` shows `prompt` and blocks for one line of input. `Ok(None)`
/// means the stream has ended and no further input will come.
pub trait CommandSource: Send {
    fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>>;

    /// Reports a rejected input to the operator.
    fn reject(&mut self, message: &str);
}

/// Prompts on stdout and reads lines from stdin.
#[derive(Debug, Default)]
pub struct ConsoleCommands;

impl CommandSource for ConsoleCommands {
    fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        let n = std::io::stdin().lock().read_line(&mut line)?;
        Ok((n > 0).then_some(line))
    }

    fn reject(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// Replays a fixed list of lines, then reports end of input.
///
/// Prompts and rejections are recorded so tests can inspect the dialogue.
#[derive(Debug, Default, Clone)]
pub struct ScriptedCommands {
    lines: VecDeque<String>,
    pub prompts: Vec<String>,
    pub rejections: Vec<String>,
}

impl ScriptedCommands {
    pub fn new<I, S>(lines: I) -> ScriptedCommands
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedCommands {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            rejections: Vec::new(),
        }
    }

    /// Lines not consumed yet.
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl CommandSource for ScriptedCommands {
    fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        self.prompts.push(prompt.to_owned());
        Ok(self.lines.pop_front())
    }

    fn reject(&mut self, message: &str) {
        self.rejections.push(message.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_character() {
        assert_eq!(Command::parse("P\n"), Some(Command::PrintWeights));
        assert_eq!(Command::parse("  E"), Some(Command::Evaluate));
        assert_eq!(Command::parse("Rxyz"), Some(Command::Train));
        assert_eq!(Command::parse("r"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("Q"), None);
    }

    #[test]
    fn script_ends_with_none() {
        let mut src = ScriptedCommands::new(["E"]);
        assert_eq!(src.read_line("> ").unwrap().as_deref(), Some("E"));
        assert_eq!(src.read_line("> ").unwrap(), None);
        assert_eq!(src.prompts.len(), 2);
        assert_eq!(src.remaining(), 0);
    }
}
