//! Interactive input.
//!
//! The ledger never reads input itself. Front ends ask a [`ValueProvider`]
//! for each value and convert the answer before calling into the group.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("required input not provided: {0}")]
    Required(String),
    #[error("input closed while asking for: {0}")]
    Closed(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Supplies one textual value per question.
pub trait ValueProvider {
    /// Ask for `description`.
    ///
    /// A blank answer yields `default` when there is one and fails with
    /// [`PromptError::Required`] otherwise. `options` is informational.
    fn value(
        &mut self,
        description: &str,
        default: Option<&str>,
        options: &[&str],
    ) -> Result<String, PromptError>;
}

/// Render a question as `description [default] (a,b,c): `.
pub fn render_prompt(description: &str, default: Option<&str>, options: &[&str]) -> String {
    let mut prompt = description.to_string();
    if let Some(default) = default {
        prompt.push_str(&format!(" [{}]", default));
    }
    if !options.is_empty() {
        prompt.push_str(&format!(" ({})", options.join(",")));
    }
    prompt.push_str(": ");
    prompt
}

fn resolve(description: &str, answer: &str, default: Option<&str>) -> Result<String, PromptError> {
    let answer = answer.trim();
    if !answer.is_empty() {
        return Ok(answer.to_string());
    }
    default
        .map(str::to_string)
        .ok_or_else(|| PromptError::Required(description.to_string()))
}

/// Asks questions on a writer and reads one line per answer.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

/// Prompter bound to the process's stdin and stdout.
pub type StdinPrompter = LinePrompter<io::StdinLock<'static>, io::Stdout>;

impl StdinPrompter {
    pub fn stdin() -> Self {
        LinePrompter::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ValueProvider for LinePrompter<R, W> {
    fn value(
        &mut self,
        description: &str,
        default: Option<&str>,
        options: &[&str],
    ) -> Result<String, PromptError> {
        write!(self.output, "{}", render_prompt(description, default, options))?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed(description.to_string()));
        }
        resolve(description, &line, default)
    }
}

/// Answers questions from a fixed list, in order.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Descriptions of every question asked so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl ValueProvider for ScriptedPrompter {
    fn value(
        &mut self,
        description: &str,
        default: Option<&str>,
        _options: &[&str],
    ) -> Result<String, PromptError> {
        self.asked.push(description.to_string());
        let answer = self
            .answers
            .pop_front()
            .ok_or_else(|| PromptError::Closed(description.to_string()))?;
        resolve(description, &answer, default)
    }
}
