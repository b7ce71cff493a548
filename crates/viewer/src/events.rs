use html::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
    HashChange,
    DragEnter,
    DragOver,
    DragLeave,
    Drop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    Click { target: Id },
    /// The location's fragment was changed from outside the engine.
    HashChange { fragment: String },
    DragEnter { target: Id },
    DragOver { target: Id },
    DragLeave { target: Id },
    Drop { target: Id, files: Vec<DroppedFile> },
}

impl UiEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            UiEvent::Click { .. } => EventKind::Click,
            UiEvent::HashChange { .. } => EventKind::HashChange,
            UiEvent::DragEnter { .. } => EventKind::DragEnter,
            UiEvent::DragOver { .. } => EventKind::DragOver,
            UiEvent::DragLeave { .. } => EventKind::DragLeave,
            UiEvent::Drop { .. } => EventKind::Drop,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    pub default_prevented: bool,
}

/// Flags handlers set while one event is being dispatched.
#[derive(Debug, Default)]
pub(crate) struct Dispatch {
    pub(crate) default_prevented: bool,
    pub(crate) propagation_stopped: bool,
}

impl Dispatch {
    pub(crate) fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub(crate) fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}
