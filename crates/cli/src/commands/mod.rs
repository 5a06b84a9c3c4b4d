//! Subcommand implementations.
//!
//! Commands read from any [`BufRead`] and write to any [`Write`] so they can
//! run against a terminal or against in-memory buffers.

use std::io::{self, BufRead, Write};

use rubico_app::{CustomerApp, NoticeKind};

pub mod delete;
pub mod form;
pub mod list;
pub mod show;

/// Line-based question and answer over a reader and a writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub const fn output(&mut self) -> &mut W {
        &mut self.output
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Write one line.
    pub fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }

    /// Ask a question and read one line, without its line ending.
    /// Returns `None` at end of input.
    pub fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Ask for a field value showing the current one.
    ///
    /// An empty answer keeps `current`; a lone `-` clears it.
    pub fn ask_field(&mut self, label: &str, current: &str) -> io::Result<Option<String>> {
        let question = if current.is_empty() {
            format!("{label}: ")
        } else {
            format!("{label} [{current}]: ")
        };

        Ok(self.ask(&question)?.map(|answer| match answer.trim() {
            "" => current.to_string(),
            "-" => String::new(),
            _ => answer,
        }))
    }

    /// Ask a yes/no question until the answer is understood.
    pub fn confirm(&mut self, question: &str, default: bool) -> io::Result<Option<bool>> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let Some(answer) = self.ask(&format!("{question} {hint} "))? else {
                return Ok(None);
            };
            match answer.trim().to_ascii_lowercase().as_str() {
                "" => return Ok(Some(default)),
                "y" | "yes" => return Ok(Some(true)),
                "n" | "no" => return Ok(Some(false)),
                _ => self.say("Please answer y or n.")?,
            }
        }
    }
}

/// Print and clear the controller's notice. Returns `false` for an error notice.
pub fn report_notice(app: &mut CustomerApp, out: &mut impl Write) -> io::Result<bool> {
    match app.take_notice() {
        Some(notice) if notice.kind == NoticeKind::Error => {
            writeln!(out, "Error: {}", notice.message)?;
            Ok(false)
        }
        Some(notice) => {
            writeln!(out, "{}", notice.message)?;
            Ok(true)
        }
        None => Ok(true),
    }
}
