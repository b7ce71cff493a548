use core_types::{DocGeneration, RequestId, ResourceKind};
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug)]
pub enum CoreCommand {
    /// GET a markup fragment for a lazily loaded section.
    FetchFragment {
        generation: DocGeneration,
        request_id: RequestId,
        url: String,
    },
    /// PUT raw file bytes; the response is a complete document.
    Upload {
        generation: DocGeneration,
        request_id: RequestId,
        url: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug)]
pub enum CoreEvent {
    /// A response arrived, whatever its status.
    NetworkDone {
        generation: DocGeneration,
        request_id: RequestId,
        kind: ResourceKind,
        url: String,
        status: u16,
        body: String,
    },
    /// No response at all (transport failure).
    NetworkError {
        generation: DocGeneration,
        request_id: RequestId,
        kind: ResourceKind,
        url: String,
        error: String,
    },
}

impl CoreEvent {
    pub fn generation(&self) -> DocGeneration {
        match self {
            CoreEvent::NetworkDone { generation, .. } | CoreEvent::NetworkError { generation, .. } => {
                *generation
            }
        }
    }

    pub fn request_id(&self) -> RequestId {
        match self {
            CoreEvent::NetworkDone { request_id, .. } | CoreEvent::NetworkError { request_id, .. } => {
                *request_id
            }
        }
    }
}

pub struct Bus {
    pub cmd_tx: Sender<CoreCommand>,
    pub cmd_rx: Receiver<CoreCommand>,
    pub evt_tx: Sender<CoreEvent>, // shareable for runtimes
    pub evt_rx: Receiver<CoreEvent>,
}

impl Bus {
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        Self {
            cmd_tx,
            cmd_rx,
            evt_tx,
            evt_rx,
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
