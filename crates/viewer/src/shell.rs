//! Line-oriented driver: one command per line, answers written back as text.
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use bus::CoreEvent;
use html::dom_utils::outline;
use html::{Document, Id, Selector, SelectorError};
use thiserror::Error;

use crate::disclosure::PairState;
use crate::events::{DroppedFile, UiEvent};
use crate::viewer::Viewer;

const OUTLINE_CAP: usize = 400;

pub const HELP: &str = "\
click <selector>       click the first matching element
hash <fragment>        change the location fragment
drag-enter <selector>  start dragging over an element
drag-leave <selector>  leave an element while dragging
drop <path>            drop a file on the page (uploads it)
tick                   run deferred work
outline [selector]     print the document (or a subtree)
state <selector>       show a header's open state
scrolls                list scroll requests so far
help                   this text
quit                   exit";

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("unknown command `{0}` (try `help`)")]
    UnknownCommand(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error("nothing matches `{0}`")]
    NoMatch(String),
    #[error("reading {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Click(Selector),
    Hash(String),
    DragEnter(Selector),
    DragLeave(Selector),
    Drop(PathBuf),
    Tick,
    Outline(Option<Selector>),
    State(Selector),
    Scrolls,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = ShellError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let arg = |name: &'static str| {
            if rest.is_empty() {
                Err(ShellError::MissingArgument(name))
            } else {
                Ok(rest)
            }
        };
        let command = match word {
            "click" => Command::Click(arg("click")?.parse()?),
            "hash" => Command::Hash(arg("hash")?.to_string()),
            "drag-enter" => Command::DragEnter(arg("drag-enter")?.parse()?),
            "drag-leave" => Command::DragLeave(arg("drag-leave")?.parse()?),
            "drop" => Command::Drop(PathBuf::from(arg("drop")?)),
            "tick" => Command::Tick,
            "outline" if rest.is_empty() => Command::Outline(None),
            "outline" => Command::Outline(Some(rest.parse()?)),
            "state" => Command::State(arg("state")?.parse()?),
            "scrolls" => Command::Scrolls,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ShellError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

pub struct Shell {
    viewer: Viewer,
    events: Receiver<CoreEvent>,
    pump_wait: Duration,
}

impl Shell {
    pub fn new(viewer: Viewer, events: Receiver<CoreEvent>, pump_wait: Duration) -> Self {
        Self {
            viewer,
            events,
            pump_wait,
        }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// Reads commands until EOF or `quit`. Command errors are reported and skipped.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let result = line
                .parse::<Command>()
                .and_then(|command| match command {
                    Command::Quit => Ok(None),
                    command => self.execute(command).map(Some),
                });
            match result {
                Ok(None) => break,
                Ok(Some(text)) if text.is_empty() => {}
                Ok(Some(text)) => writeln!(out, "{text}")?,
                Err(err) => writeln!(out, "error: {err}")?,
            }
            out.flush()?;
        }
        Ok(())
    }

    pub fn execute(&mut self, command: Command) -> Result<String, ShellError> {
        match command {
            Command::Click(selector) => {
                let target = self.find(&selector)?;
                let outcome = self.viewer.click(target);
                self.settle();
                let mut summary = self.summary();
                if outcome.default_prevented {
                    summary.push_str(" (default prevented)");
                }
                Ok(summary)
            }
            Command::Hash(fragment) => {
                self.viewer.handle(UiEvent::HashChange { fragment });
                self.settle();
                Ok(self.summary())
            }
            Command::DragEnter(selector) => {
                let target = self.find(&selector)?;
                self.viewer.handle(UiEvent::DragEnter { target });
                Ok(format!("drag depth {}", self.viewer.drag_depth()))
            }
            Command::DragLeave(selector) => {
                let target = self.find(&selector)?;
                self.viewer.handle(UiEvent::DragLeave { target });
                Ok(format!("drag depth {}", self.viewer.drag_depth()))
            }
            Command::Drop(path) => {
                let bytes = std::fs::read(&path).map_err(|source| ShellError::ReadFile {
                    path: path.clone(),
                    source,
                })?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload.bin".to_string());
                let target = self.viewer.document().body().unwrap_or(Document::ROOT);
                self.viewer.handle(UiEvent::Drop {
                    target,
                    files: vec![DroppedFile { name, bytes }],
                });
                self.settle();
                Ok(self.summary())
            }
            Command::Tick => Ok(format!("ran {} deferred tasks", self.viewer.tick())),
            Command::Outline(selector) => {
                let scope = match selector {
                    Some(selector) => self.find(&selector)?,
                    None => Document::ROOT,
                };
                Ok(outline(self.viewer.document(), scope, OUTLINE_CAP).join("\n"))
            }
            Command::State(selector) => {
                let header = self.find(&selector)?;
                Ok(self.describe_header(header))
            }
            Command::Scrolls => {
                let mut text = String::new();
                for (i, s) in self.viewer.viewport().scrolls().iter().enumerate() {
                    let _ = writeln!(text, "{i}: #{} ({:?}, {:?})", s.element_id, s.behavior, s.block);
                }
                Ok(text.trim_end().to_string())
            }
            Command::Help => Ok(HELP.to_string()),
            Command::Quit => Ok(String::new()),
        }
    }

    fn find(&self, selector: &Selector) -> Result<Id, ShellError> {
        self.viewer
            .document()
            .query_selector(Document::ROOT, selector)
            .ok_or_else(|| ShellError::NoMatch(selector.to_string()))
    }

    fn describe_header(&self, header: Id) -> String {
        let viewer = &self.viewer;
        match PairState::read(viewer.document(), viewer.markup(), header) {
            Some(state) => format!(
                "{} indicator={} fetch={:?}{}",
                if state.open { "open" } else { "closed" },
                state.indicator.as_deref().unwrap_or("-"),
                viewer.fetch_state(header),
                if state.is_consistent(viewer.markup()) {
                    ""
                } else {
                    " INCONSISTENT"
                }
            ),
            None => "not a disclosure header".to_string(),
        }
    }

    fn summary(&self) -> String {
        let viewer = &self.viewer;
        format!(
            "location={} generation={} mutations={} busy={}",
            viewer.location().hash(),
            viewer.generation().0,
            viewer.document().mutation_count(),
            viewer.is_busy()
        )
    }

    /// Runs deferred work, then feeds network events in until nothing is pending
    /// or `pump_wait` runs out.
    fn settle(&mut self) {
        self.viewer.tick();
        let deadline = Instant::now() + self.pump_wait;
        while self.viewer.has_pending_requests() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(remaining) {
                Ok(evt) => {
                    self.viewer.on_core_event(evt);
                    self.viewer.tick();
                }
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!(target: "viewer.shell", "still waiting on the network after {:?}", self.pump_wait);
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}
