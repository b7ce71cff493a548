use bus::CoreCommand;
use core_types::RequestId;

use super::Viewer;
use crate::events::{Dispatch, DroppedFile};

/// Nesting counter for drag enter/leave pairs fired by descendants.
#[derive(Debug, Default)]
pub(crate) struct DragState {
    depth: u32,
}

impl DragState {
    pub(crate) fn depth(&self) -> u32 {
        self.depth
    }

    /// True on the first enter.
    pub(crate) fn enter(&mut self) -> bool {
        self.depth += 1;
        self.depth == 1
    }

    /// True when the last nested element has been left.
    pub(crate) fn leave(&mut self) -> bool {
        if self.depth == 0 {
            return false;
        }
        self.depth -= 1;
        self.depth == 0
    }

    pub(crate) fn reset(&mut self) {
        self.depth = 0;
    }
}

#[derive(Debug, Clone, Copy)]
enum BodyClass {
    DragOver,
    Loading,
}

impl Viewer {
    pub(super) fn on_drag_enter(&mut self, dispatch: &mut Dispatch) {
        dispatch.prevent_default();
        if self.drag.enter() {
            self.set_body_class(BodyClass::DragOver, true);
        }
    }

    pub(super) fn on_drag_leave(&mut self) {
        if self.drag.leave() {
            self.set_body_class(BodyClass::DragOver, false);
        }
    }

    pub(super) fn on_drop(&mut self, files: Vec<DroppedFile>, dispatch: &mut Dispatch) {
        dispatch.prevent_default();
        self.drag.reset();
        self.set_body_class(BodyClass::DragOver, false);

        let Some(file) = files.into_iter().next() else {
            return;
        };
        if let Some(in_flight) = self.upload {
            log::info!(target: "viewer.upload", "upload #{in_flight} in flight; ignoring drop of {}", file.name);
            return;
        }
        self.start_upload(file);
    }

    fn start_upload(&mut self, file: DroppedFile) {
        let url = match net::upload_url(&self.base_url, &self.upload_path, &file.name) {
            Ok(url) => url.to_string(),
            Err(err) => {
                log::warn!(target: "viewer.upload", "{err}");
                return;
            }
        };
        let request_id = self.next_request_id();
        log::info!(target: "viewer.upload", "#{request_id} uploading {} ({} bytes)", file.name, file.bytes.len());

        self.set_body_class(BodyClass::Loading, true);
        let sent = self.send_cmd(CoreCommand::Upload {
            generation: self.generation,
            request_id,
            url,
            bytes: file.bytes,
        });
        if sent {
            self.upload = Some(request_id);
        } else {
            log::warn!(target: "viewer.upload", "no network runtime; upload dropped");
            self.set_body_class(BodyClass::Loading, false);
        }
    }

    /// Any response, error pages included, becomes the new document.
    pub(super) fn on_upload_done(&mut self, request_id: RequestId, status: u16, body: String) {
        if self.upload != Some(request_id) {
            return;
        }
        self.upload = None;
        log::info!(target: "viewer.upload", "#{request_id} answered {status}; replacing document");
        self.replace_document(&body);
        self.set_body_class(BodyClass::Loading, false);
    }

    pub(super) fn on_upload_error(&mut self, request_id: RequestId, error: String) {
        if self.upload != Some(request_id) {
            return;
        }
        self.upload = None;
        log::warn!(target: "viewer.upload", "#{request_id} failed: {error}");
        self.set_body_class(BodyClass::Loading, false);
    }

    fn set_body_class(&mut self, which: BodyClass, on: bool) {
        let Some(body) = self.doc.body() else {
            return;
        };
        let class = match which {
            BodyClass::DragOver => &self.markup.drag_over_class,
            BodyClass::Loading => &self.markup.loading_class,
        };
        if on {
            self.doc.add_class(body, class);
        } else {
            self.doc.remove_class(body, class);
        }
    }
}
