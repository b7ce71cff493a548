#![allow(dead_code)]

use std::sync::mpsc::{self, Receiver};

use bus::{CoreCommand, CoreEvent};
use core_types::{RequestId, ResourceKind};
use html::{Document, Id};
use viewer::disclosure::PairState;
use viewer::{EventOutcome, Viewer, ViewerConfig};

pub fn viewer(markup: &str) -> Viewer {
    Viewer::new(&ViewerConfig::default(), Document::parse(markup)).unwrap()
}

/// A viewer whose outgoing commands land in the returned receiver.
pub fn wired(markup: &str) -> (Viewer, Receiver<CoreCommand>) {
    let (tx, rx) = mpsc::channel();
    let mut v = viewer(markup);
    v.set_bus_sender(tx);
    (v, rx)
}

pub fn id(v: &Viewer, element_id: &str) -> Id {
    v.document()
        .get_element_by_id(element_id)
        .unwrap_or_else(|| panic!("no element #{element_id}"))
}

pub fn click_id(v: &mut Viewer, element_id: &str) -> EventOutcome {
    let target = id(v, element_id);
    v.click(target)
}

pub fn is_open(v: &Viewer, header_id: &str) -> bool {
    v.is_header_open(id(v, header_id))
        .unwrap_or_else(|| panic!("#{header_id} has no content region"))
}

pub fn indicator(v: &Viewer, header_id: &str) -> String {
    let doc = v.document();
    let header = id(v, header_id);
    let ind = doc.query_selector(header, &v.markup().indicator).unwrap();
    doc.text_content(ind)
}

pub fn assert_all_consistent(v: &Viewer) {
    let doc = v.document();
    for header in doc.query_selector_all(Document::ROOT, &v.markup().header) {
        if let Some(state) = PairState::read(doc, v.markup(), header) {
            assert!(
                state.is_consistent(v.markup()),
                "header {:?} diverged: {state:?}",
                doc.element_id(header)
            );
        }
    }
}

pub fn fragment_requests(rx: &Receiver<CoreCommand>) -> Vec<(RequestId, String)> {
    rx.try_iter()
        .filter_map(|cmd| match cmd {
            CoreCommand::FetchFragment { request_id, url, .. } => Some((request_id, url)),
            _ => None,
        })
        .collect()
}

pub fn done(v: &Viewer, request_id: RequestId, kind: ResourceKind, status: u16, body: &str) -> CoreEvent {
    CoreEvent::NetworkDone {
        generation: v.generation(),
        request_id,
        kind,
        url: String::new(),
        status,
        body: body.to_string(),
    }
}

pub fn failed(v: &Viewer, request_id: RequestId, kind: ResourceKind) -> CoreEvent {
    CoreEvent::NetworkError {
        generation: v.generation(),
        request_id,
        kind,
        url: String::new(),
        error: "connection refused".to_string(),
    }
}
