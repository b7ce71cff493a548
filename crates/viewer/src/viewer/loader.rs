use bus::CoreCommand;
use core_types::RequestId;
use html::Id;

use super::Viewer;
use crate::disclosure;

/// Per lazy header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PendingFragment {
    header: Id,
    content: Id,
}

impl Viewer {
    pub fn fetch_state(&self, header: Id) -> FetchState {
        self.fetch_states.get(&header).copied().unwrap_or_default()
    }

    /// Requests the header's `data-src` fragment if it has one and it was never loaded.
    pub(super) fn load_if_lazy(&mut self, header: Id) {
        if self.fetch_state(header) != FetchState::Unloaded {
            return;
        }
        let Some(src) = self.doc.attribute(header, &self.markup.source_attribute) else {
            return;
        };
        let url = match net::resolve(&self.base_url, src) {
            Ok(url) => url.to_string(),
            Err(err) => {
                log::warn!(target: "viewer.loader", "{err}");
                return;
            }
        };
        let Some(content) = disclosure::content_of(&self.doc, &self.markup, header) else {
            return;
        };

        let request_id = self.next_request_id();
        let sent = self.send_cmd(CoreCommand::FetchFragment {
            generation: self.generation,
            request_id,
            url: url.clone(),
        });
        if !sent {
            log::warn!(target: "viewer.loader", "no network runtime; {url} not requested");
            return;
        }
        log::debug!(target: "viewer.loader", "#{request_id} loading {url}");
        self.fetch_states.insert(header, FetchState::Loading);
        self.pending_fragments
            .insert(request_id, PendingFragment { header, content });
    }

    pub(super) fn on_fragment_done(&mut self, request_id: RequestId, url: String, status: u16, body: String) {
        let Some(pending) = self.pending_fragments.remove(&request_id) else {
            return;
        };
        if !net::is_success_status(status) {
            log::warn!(target: "viewer.loader", "#{request_id} {url} answered {status}; will retry on next open");
            self.fetch_states.insert(pending.header, FetchState::Unloaded);
            return;
        }
        if !self.doc.is_live(pending.content) {
            log::debug!(target: "viewer.loader", "#{request_id} target was removed");
            self.fetch_states.remove(&pending.header);
            return;
        }

        self.doc.set_inner_html(pending.content, &body);
        self.fetch_states.insert(pending.header, FetchState::Loaded);
        let doc = &self.doc;
        self.fetch_states.retain(|header, _| doc.is_live(*header));
        log::debug!(target: "viewer.loader", "#{request_id} swapped {} bytes into {:?}", body.len(), pending.content);

        self.open_first_nested_header(pending.content);
        for offset in self.swap_observers.take_matching(&self.doc, pending.content) {
            self.resolve_segment(&offset);
        }
    }

    pub(super) fn on_fragment_error(&mut self, request_id: RequestId, url: String, error: String) {
        let Some(pending) = self.pending_fragments.remove(&request_id) else {
            return;
        };
        log::warn!(target: "viewer.loader", "#{request_id} {url} failed: {error}");
        self.fetch_states.insert(pending.header, FetchState::Unloaded);
    }

    /// Opens the first header sitting directly in the swapped region, or one level
    /// below it, through the normal click path.
    fn open_first_nested_header(&mut self, region: Id) {
        let header = self.doc.element_children(region).find_map(|child| {
            if self.doc.matches(child, &self.markup.header) {
                Some(child)
            } else {
                self.doc
                    .element_children(child)
                    .find(|g| self.doc.matches(*g, &self.markup.header))
            }
        });
        if let Some(header) = header {
            if self.is_header_open(header) == Some(false) {
                self.toggle_header(header);
            }
        }
    }
}
