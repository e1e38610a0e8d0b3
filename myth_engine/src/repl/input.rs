//! Terminal input handling for the REPL.
//!
//! Uses rustyline (with history and command/save-slot completion) when stdin is a terminal,
//! and a plain stdin reader otherwise.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use log::{info, warn};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::save_files::collect_save_slots;

/// Outcome of reading a line from the REPL input.
pub enum InputEvent {
    Line(String),
    Eof,
    Interrupted,
}

const COMMAND_TERMS: &[&str] = &[
    "down", "drop", "go", "help", "history", "inventory", "left", "load", "look", "pick up", "quests", "quit",
    "right", "save", "saves", "take", "up",
];

type ReplEditor = rustyline::Editor<MythHelper, DefaultHistory>;

struct MythHelper {
    save_dir: PathBuf,
}

impl Helper for MythHelper {}

impl Completer for MythHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let (start, prefix) = current_prefix(line, pos);
        if prefix.is_empty() {
            return Ok((start, Vec::new()));
        }
        let lower = prefix.to_lowercase();
        if let Some(partial) = lower.strip_prefix("load ") {
            let offset = start + prefix.len() - partial.len();
            return Ok((offset, slot_completions(&self.available_save_slots(), partial)));
        }
        let pairs = COMMAND_TERMS
            .iter()
            .filter(|term| term.starts_with(&lower))
            .map(|term| Pair {
                display: (*term).to_string(),
                replacement: (*term).to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for MythHelper {
    type Hint = String;
}

impl Highlighter for MythHelper {}

impl Validator for MythHelper {}

impl MythHelper {
    fn available_save_slots(&self) -> Vec<String> {
        match collect_save_slots(&self.save_dir) {
            Ok(slots) => {
                let mut names: Vec<String> = slots.into_iter().map(|slot| slot.slot).collect();
                names.dedup();
                names
            },
            Err(err) => {
                warn!("Failed to enumerate save slots for completion: {err}");
                Vec::new()
            },
        }
    }
}

fn current_prefix(line: &str, pos: usize) -> (usize, String) {
    let slice = &line[..pos];
    let trimmed = slice.trim_start_matches(char::is_whitespace);
    let start = pos - trimmed.len();
    (start, trimmed.to_string())
}

fn slot_completions(slots: &[String], partial: &str) -> Vec<Pair> {
    slots
        .iter()
        .filter(|slot| slot.starts_with(partial))
        .map(|slot| Pair {
            display: slot.clone(),
            replacement: slot.clone(),
        })
        .collect()
}

/// Helper responsible for managing the interactive input backend.
pub struct InputManager {
    backend: Backend,
}

impl InputManager {
    pub fn new(history_path: Option<PathBuf>, save_dir: PathBuf) -> Self {
        let backend = if io::stdin().is_terminal() {
            match RustylineInput::new(history_path, save_dir) {
                Ok(editor) => {
                    info!("using rustyline-backed REPL input");
                    Backend::Rustyline(Box::new(editor))
                },
                Err(err) => {
                    warn!("failed to initialize rustyline ({err}), falling back to basic stdin");
                    Backend::plain()
                },
            }
        } else {
            info!("stdin is not a TTY; using basic input mode");
            Backend::plain()
        };

        Self { backend }
    }

    /// Read a line from the current backend. If the interactive backend reports an
    /// unrecoverable error, switch to the plain stdin backend and retry once.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        match self.backend.read_line(prompt) {
            Ok(event) => Ok(event),
            Err(err) if self.backend.is_rustyline() => {
                warn!("rustyline input failed: {err} -- switching to basic stdin");
                self.backend = Backend::plain();
                self.backend.read_line(prompt)
            },
            Err(err) => Err(err),
        }
    }
}

enum Backend {
    Rustyline(Box<RustylineInput>),
    Plain(StdinInput),
}

impl Backend {
    fn plain() -> Self {
        Backend::Plain(StdinInput::default())
    }

    fn is_rustyline(&self) -> bool {
        matches!(self, Backend::Rustyline(_))
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        match self {
            Backend::Rustyline(editor) => editor.read_line(prompt),
            Backend::Plain(stdin) => stdin.read_line(prompt),
        }
    }
}

struct RustylineInput {
    editor: ReplEditor,
    history_path: Option<PathBuf>,
}

impl RustylineInput {
    fn new(history_path: Option<PathBuf>, save_dir: PathBuf) -> io::Result<Self> {
        let mut editor = ReplEditor::new().map_err(map_io_err)?;
        editor.set_helper(Some(MythHelper { save_dir }));

        if let Some(path) = history_path.as_ref() {
            if let Some(dir) = path.parent()
                && let Err(err) = fs::create_dir_all(dir)
            {
                warn!("failed to create history directory {}: {err}", dir.display());
            }
            if let Err(err) = editor.load_history(path) {
                match err {
                    ReadlineError::Io(ref io_err) if io_err.kind() == io::ErrorKind::NotFound => {
                        info!("no prior history found at {}, starting fresh", path.display());
                    },
                    other => warn!("failed to load history from {}: {other}", path.display()),
                }
            }
        }

        Ok(Self { editor, history_path })
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(err) = self.editor.add_history_entry(line.as_str()) {
                        warn!("failed to append to history: {err}");
                    }
                    if let Some(path) = self.history_path.as_ref()
                        && let Err(err) = self.editor.save_history(path)
                    {
                        warn!("failed to persist history to {}: {err}", path.display());
                    }
                }
                Ok(InputEvent::Line(line))
            },
            Err(err) => convert_readline_error(err),
        }
    }
}

#[derive(Default)]
struct StdinInput {
    buffer: String,
}

impl StdinInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        print!("{prompt}");
        io::stdout().flush()?;

        self.buffer.clear();
        let bytes = io::stdin().read_line(&mut self.buffer)?;
        if bytes == 0 {
            return Ok(InputEvent::Eof);
        }
        let line = self.buffer.trim_end_matches(['\n', '\r']).to_string();
        Ok(InputEvent::Line(line))
    }
}

fn convert_readline_error(err: ReadlineError) -> io::Result<InputEvent> {
    match err {
        ReadlineError::Interrupted => Ok(InputEvent::Interrupted),
        ReadlineError::Eof => Ok(InputEvent::Eof),
        ReadlineError::Io(io_err) => Err(io_err),
        other => Err(io::Error::other(other)),
    }
}

fn map_io_err(err: ReadlineError) -> io::Error {
    match err {
        ReadlineError::Io(io_err) => io_err,
        other => io::Error::other(other),
    }
}
