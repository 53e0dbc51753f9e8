// repl.rs

use anyhow::Context as _;
use clap::ValueEnum;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, Editor};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

use crate::completion::ToolkitHelper;
use crate::config::DataPaths;
use crate::screens;
use crate::util::{clear_screen, header, say};

pub const APP_NAME: &str = "Toolkit CLI";

/// Ctrl-C or Ctrl-D at a prompt. Screens unwind to the previous menu.
#[derive(Debug, Error)]
#[error("input cancelled")]
pub struct Cancelled;

pub fn is_cancelled(err: &anyhow::Error) -> bool {
    err.is::<Cancelled>()
}

pub struct Prompt {
    editor: Editor<ToolkitHelper, DefaultHistory>,
}

impl Prompt {
    pub fn new() -> anyhow::Result<Self> {
        let config = Config::builder()
            .completion_type(CompletionType::List)
            .auto_add_history(true)
            .build();
        let mut editor = Editor::with_config(config).context("failed to create line editor")?;
        editor.set_helper(Some(ToolkitHelper::default()));
        Ok(Self { editor })
    }

    /// Words offered on Tab until `clear_completion` is called.
    pub fn complete_with<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(helper) = self.editor.helper_mut() {
            helper.set_words(words);
        }
    }

    pub fn clear_completion(&mut self) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.clear_words();
        }
    }

    /// One trimmed line.
    pub fn line(&mut self, prompt: &str) -> anyhow::Result<String> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(line.trim().to_string()),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Err(Cancelled.into()),
            Err(e) => Err(e).context("failed to read input"),
        }
    }

    pub fn optional(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        let line = self.line(prompt)?;
        Ok(Some(line).filter(|l| !l.is_empty()))
    }

    pub fn nonempty(&mut self, prompt: &str) -> anyhow::Result<String> {
        loop {
            let line = self.line(prompt)?;
            if !line.is_empty() {
                return Ok(line);
            }
            say("Please type something.")?;
        }
    }

    pub fn parse<T>(&mut self, prompt: &str) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let line = self.line(prompt)?;
        line.parse()
            .map_err(|e| anyhow::anyhow!("invalid value '{}': {}", line, e))
    }

    /// Parses a line, falling back to `default` when it is left empty.
    pub fn parse_or<T>(&mut self, prompt: &str, default: T) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.optional(prompt)? {
            None => Ok(default),
            Some(line) => line
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid value '{}': {}", line, e)),
        }
    }

    /// Reads lines until one equal to `terminator`.
    pub fn multiline(&mut self, terminator: &str) -> anyhow::Result<String> {
        let mut lines = Vec::new();
        loop {
            let line = match self.editor.readline("") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Err(Cancelled.into()),
                Err(e) => return Err(e).context("failed to read input"),
            };
            if line.trim() == terminator {
                return Ok(lines.join("\n"));
            }
            lines.push(line);
        }
    }

    /// Cancelling counts as "no".
    pub fn confirm(&mut self, prompt: &str) -> anyhow::Result<bool> {
        match self.line(prompt) {
            Ok(answer) => Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes")),
            Err(e) if is_cancelled(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn pause(&mut self) -> anyhow::Result<()> {
        match self.line("Press Enter to continue...") {
            Err(e) if !is_cancelled(&e) => Err(e),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Module {
    Tasks,
    Notes,
    Habits,
    Calc,
    Text,
    Convert,
    Files,
    Timer,
    Address,
    Tictactoe,
}

impl Module {
    pub const ALL: [Module; 10] = [
        Module::Tasks,
        Module::Notes,
        Module::Habits,
        Module::Calc,
        Module::Text,
        Module::Convert,
        Module::Files,
        Module::Timer,
        Module::Address,
        Module::Tictactoe,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Module::Tasks => "Tasks",
            Module::Notes => "Notes",
            Module::Habits => "Habits",
            Module::Calc => "Calculator",
            Module::Text => "Text",
            Module::Convert => "JSON/CSV conversion",
            Module::Files => "File organizer",
            Module::Timer => "Timer / Pomodoro",
            Module::Address => "Address book (SQLite)",
            Module::Tictactoe => "Tic-tac-toe",
        }
    }

    /// 1-based menu number.
    pub fn from_choice(choice: &str) -> Option<Module> {
        let n: usize = choice.parse().ok()?;
        Module::ALL.get(n.checked_sub(1)?).copied()
    }
}

/// Runs one utility until the user backs out of it.
pub fn run_module(module: Module, prompt: &mut Prompt, paths: &DataPaths) -> anyhow::Result<()> {
    log::debug!("opening {:?}", module);
    let result = match module {
        Module::Tasks => screens::tasks(prompt, paths),
        Module::Notes => screens::notes(prompt, paths),
        Module::Habits => screens::habits(prompt, paths),
        Module::Calc => screens::calculator(prompt, paths),
        Module::Text => screens::text(prompt),
        Module::Convert => screens::convert(prompt),
        Module::Files => screens::files(prompt),
        Module::Timer => screens::timer(prompt),
        Module::Address => screens::address_book(prompt, paths),
        Module::Tictactoe => screens::tictactoe(prompt),
    };
    prompt.clear_completion();
    match result {
        Err(e) if is_cancelled(&e) => Ok(()),
        other => other,
    }
}

pub fn start_menu(prompt: &mut Prompt, paths: &DataPaths) -> anyhow::Result<()> {
    loop {
        clear_screen()?;
        header(&format!("{} - main menu", APP_NAME))?;
        for (i, module) in Module::ALL.iter().enumerate() {
            say(format!("{}) {}", i + 1, module.label()))?;
        }
        say("0) Exit")?;
        let choice = match prompt.line("> ") {
            Ok(choice) => choice,
            Err(e) if is_cancelled(&e) => {
                say("\nGoodbye!")?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        if choice == "0" {
            say("Goodbye!")?;
            return Ok(());
        }
        match Module::from_choice(&choice) {
            Some(module) => run_module(module, prompt, paths)?,
            None => {
                say("Invalid option.")?;
                prompt.pause()?;
            }
        }
    }
}
