// crates/runtime_net/src/lib.rs
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use bus::{CoreCommand, CoreEvent};
use core_types::{DocGeneration, RequestId, ResourceKind};
use net::{FetchResult, NetClient, NetError, fetch_text, upload_bytes};

/// Serves `CoreCommand`s until every command sender is dropped.
pub fn start_net_runtime(
    client: NetClient,
    cmd_rx: Receiver<CoreCommand>,
    evt_tx: Sender<CoreEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                CoreCommand::FetchFragment {
                    generation,
                    request_id,
                    url,
                } => {
                    log::debug!(target: "runtime_net", "fetch #{request_id} {url}");
                    let cb = reply(evt_tx.clone(), generation, request_id, ResourceKind::Fragment, url.clone());
                    fetch_text(&client, url, cb);
                }
                CoreCommand::Upload {
                    generation,
                    request_id,
                    url,
                    bytes,
                } => {
                    log::debug!(target: "runtime_net", "upload #{request_id} {url} ({} bytes)", bytes.len());
                    let cb = reply(evt_tx.clone(), generation, request_id, ResourceKind::Document, url.clone());
                    upload_bytes(&client, url, bytes, cb);
                }
            }
        }
        log::debug!(target: "runtime_net", "command channel closed");
    })
}

fn reply(
    evt_tx: Sender<CoreEvent>,
    generation: DocGeneration,
    request_id: RequestId,
    kind: ResourceKind,
    url: String,
) -> net::NetCallback {
    Arc::new(move |result: Result<FetchResult, NetError>| {
        let evt = match result {
            Ok(res) => CoreEvent::NetworkDone {
                generation,
                request_id,
                kind,
                url: res.url,
                status: res.status,
                body: res.body,
            },
            Err(err) => CoreEvent::NetworkError {
                generation,
                request_id,
                kind,
                url: url.clone(),
                error: err.to_string(),
            },
        };
        // The receiver is gone once the viewer shuts down.
        let _ = evt_tx.send(evt);
    })
}
