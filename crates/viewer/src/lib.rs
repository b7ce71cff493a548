//! Headless engine for navigating server-rendered report pages: collapsible
//! sections, bulk expand/collapse, deep links, segment cross references, lazily
//! loaded sections and drag-and-drop upload.

pub mod config;
pub mod disclosure;
mod events;
mod location;
mod observers;
mod routes;
mod shell;
mod viewer;
mod viewport;

pub use config::{ConfigError, Markup, MarkupConfig, ViewerConfig};
pub use events::{DroppedFile, EventKind, EventOutcome, UiEvent};
pub use location::Location;
pub use observers::OneShot;
pub use shell::{Command, HELP, Shell, ShellError};
pub use viewer::{FetchState, Viewer};
pub use viewport::{ScrollBehavior, ScrollBlock, ScrollRequest, Viewport};
