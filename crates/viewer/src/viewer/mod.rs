//! The disclosure and navigation engine.
//!
//! Invariants:
//! - Open state is read from the content region's marker and nowhere else; see
//!   `crate::disclosure`.
//! - `generation` only moves on whole-document replacement. Every request is tagged
//!   with the generation it was issued under and `on_core_event` drops events from
//!   older generations, so a late fragment never lands in a replaced document.
//! - Deferred tasks run on the next `tick`, never inside the call that queued them.

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc;

use bus::{CoreCommand, CoreEvent};
use core_types::{DocGeneration, RequestId, ResourceKind};
use html::{Document, Id};
use url::Url;

use crate::config::{ConfigError, Markup, ViewerConfig};
use crate::events::{Dispatch, EventKind, EventOutcome, UiEvent};
use crate::location::Location;
use crate::observers::OneShot;
use crate::routes::{Action, Route, default_routes};
use crate::viewport::{Deferred, ScrollBehavior, ScrollBlock, ScrollRequest, Viewport};

mod cross_ref;
mod deep_link;
mod loader;
mod toggle;
mod upload;

pub use loader::FetchState;
use loader::PendingFragment;
use upload::DragState;

pub struct Viewer {
    doc: Document,
    markup: Markup,
    routes: Vec<Route>,

    base_url: Url,
    upload_path: String,
    deep_link_prefix: String,

    location: Location,
    viewport: Viewport,
    deferred: VecDeque<Deferred>,

    generation: DocGeneration,
    next_request_id: RequestId,
    fetch_states: HashMap<Id, FetchState>,
    pending_fragments: HashMap<RequestId, PendingFragment>,
    /// Segment offsets waiting for the segments section to be swapped in.
    swap_observers: OneShot<String>,

    drag: DragState,
    upload: Option<RequestId>,

    cmd_tx: Option<mpsc::Sender<CoreCommand>>,
}

impl Viewer {
    pub fn new(config: &ViewerConfig, document: Document) -> Result<Self, ConfigError> {
        let base_url = config.base_url()?;
        let markup = config.markup.compile()?;
        let routes = default_routes(&markup);
        Ok(Self {
            doc: document,
            markup,
            routes,
            base_url,
            upload_path: config.upload_path.clone(),
            deep_link_prefix: config.deep_link_prefix.clone(),
            location: Location::default(),
            viewport: Viewport::default(),
            deferred: VecDeque::new(),
            generation: DocGeneration::INITIAL,
            next_request_id: 0,
            fetch_states: HashMap::new(),
            pending_fragments: HashMap::new(),
            swap_observers: OneShot::new(),
            drag: DragState::default(),
            upload: None,
            cmd_tx: None,
        })
    }

    // -- Setup Methods ---
    pub fn set_bus_sender(&mut self, tx: mpsc::Sender<CoreCommand>) {
        self.cmd_tx = Some(tx);
    }

    // -- Accessors ---
    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn markup(&self) -> &Markup {
        &self.markup
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn generation(&self) -> DocGeneration {
        self.generation
    }

    pub fn drag_depth(&self) -> u32 {
        self.drag.depth()
    }

    /// An upload is in flight.
    pub fn is_busy(&self) -> bool {
        self.upload.is_some()
    }

    pub fn has_pending_requests(&self) -> bool {
        self.upload.is_some() || !self.pending_fragments.is_empty()
    }

    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    pub fn waiting_cross_references(&self) -> usize {
        self.swap_observers.len()
    }

    // -- Event Handling ---
    pub fn handle(&mut self, event: UiEvent) -> EventOutcome {
        let mut dispatch = Dispatch::default();
        let kind = event.kind();
        match event {
            UiEvent::Click { target } => {
                self.dispatch_routes(kind, target, &mut dispatch);
                if !dispatch.default_prevented {
                    self.follow_in_page_anchor(target);
                }
            }
            UiEvent::HashChange { fragment } => {
                self.location.set_fragment(&fragment);
                self.navigate(&fragment);
            }
            UiEvent::DragEnter { .. } => self.on_drag_enter(&mut dispatch),
            UiEvent::DragOver { .. } => dispatch.prevent_default(),
            UiEvent::DragLeave { .. } => self.on_drag_leave(),
            UiEvent::Drop { files, .. } => self.on_drop(files, &mut dispatch),
        }
        EventOutcome {
            default_prevented: dispatch.default_prevented,
        }
    }

    pub fn click(&mut self, target: Id) -> EventOutcome {
        self.handle(UiEvent::Click { target })
    }

    fn dispatch_routes(&mut self, kind: EventKind, target: Id, dispatch: &mut Dispatch) {
        for i in 0..self.routes.len() {
            let route = &self.routes[i];
            if route.kind != kind {
                continue;
            }
            let Some(matched) = self.doc.closest(target, &route.selector) else {
                continue;
            };
            let action = route.action;
            log::trace!(target: "viewer", "{action:?} on {matched:?}");
            self.run_action(action, matched, dispatch);
            if dispatch.propagation_stopped {
                break;
            }
        }
    }

    fn run_action(&mut self, action: Action, matched: Id, dispatch: &mut Dispatch) {
        match action {
            Action::ExpandAll => {
                dispatch.stop_propagation();
                self.set_group_open(matched, true);
            }
            Action::CollapseAll => {
                dispatch.stop_propagation();
                self.set_group_open(matched, false);
            }
            Action::CrossReference => {
                dispatch.prevent_default();
                self.cross_reference(matched);
            }
            Action::Toggle => self.toggle_header(matched),
        }
    }

    /// Default action of a click inside `<a href="#...">`.
    fn follow_in_page_anchor(&mut self, target: Id) {
        let Some(anchor) = self.doc.closest(target, &self.markup.in_page_anchor) else {
            return;
        };
        let Some(fragment) = self
            .doc
            .attribute(anchor, "href")
            .and_then(|href| href.strip_prefix('#'))
            .map(str::to_string)
        else {
            return;
        };
        self.location.set_fragment(&fragment);
        self.navigate(&fragment);
    }

    /// Runs the tasks queued before this call; returns how many ran.
    pub fn tick(&mut self) -> usize {
        let batch = std::mem::take(&mut self.deferred);
        let ran = batch.len();
        for task in batch {
            self.run_deferred(task);
        }
        ran
    }

    fn run_deferred(&mut self, task: Deferred) {
        match task {
            Deferred::ScrollIntoView { element_id } => {
                let Some(target) = self.doc.get_element_by_id(&element_id) else {
                    log::debug!(target: "viewer.nav", "scroll target #{element_id} is gone");
                    return;
                };
                self.viewport.record(ScrollRequest {
                    element_id,
                    target,
                    behavior: ScrollBehavior::Smooth,
                    block: ScrollBlock::Start,
                });
            }
        }
    }

    pub fn on_core_event(&mut self, evt: CoreEvent) {
        match evt {
            CoreEvent::NetworkDone {
                generation,
                request_id,
                kind: ResourceKind::Fragment,
                url,
                status,
                body,
            } if self.is_current(generation) => {
                self.on_fragment_done(request_id, url, status, body);
            }
            CoreEvent::NetworkError {
                generation,
                request_id,
                kind: ResourceKind::Fragment,
                url,
                error,
            } if self.is_current(generation) => {
                self.on_fragment_error(request_id, url, error);
            }
            CoreEvent::NetworkDone {
                generation,
                request_id,
                kind: ResourceKind::Document,
                status,
                body,
                ..
            } if self.is_current(generation) => {
                self.on_upload_done(request_id, status, body);
            }
            CoreEvent::NetworkError {
                generation,
                request_id,
                kind: ResourceKind::Document,
                error,
                ..
            } if self.is_current(generation) => {
                self.on_upload_error(request_id, error);
            }
            stale => {
                log::debug!(
                    target: "viewer",
                    "dropping event #{} from generation {} (now {})",
                    stale.request_id(),
                    stale.generation().0,
                    self.generation.0
                );
            }
        }
    }

    // -- Internal Helpers ---
    fn is_current(&self, generation: DocGeneration) -> bool {
        generation == self.generation
    }

    fn next_request_id(&mut self) -> RequestId {
        self.next_request_id = self.next_request_id.wrapping_add(1);
        self.next_request_id
    }

    fn send_cmd(&self, cmd: CoreCommand) -> bool {
        match &self.cmd_tx {
            Some(tx) => tx.send(cmd).is_ok(),
            None => false,
        }
    }

    /// Swaps in a whole new document. Every handle, pending request and observer
    /// belongs to the old one and is dropped with it.
    fn replace_document(&mut self, markup: &str) {
        self.doc.replace_with_markup(markup);
        self.generation = self.generation.next();
        self.fetch_states.clear();
        self.pending_fragments.clear();
        self.swap_observers.clear();
        self.deferred.clear();
        self.drag.reset();
        log::debug!(target: "viewer", "document replaced, generation {}", self.generation.0);
    }
}
