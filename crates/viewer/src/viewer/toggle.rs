use html::Id;

use super::Viewer;
use crate::disclosure;

impl Viewer {
    /// A header click: flip the pair, and start its lazy load the first time it opens.
    pub(super) fn toggle_header(&mut self, header: Id) {
        let Some(open) = disclosure::toggle(&mut self.doc, &self.markup, header) else {
            return;
        };
        log::trace!(target: "viewer.toggle", "{header:?} -> open={open}");
        if open {
            self.load_if_lazy(header);
        }
    }

    /// Expand-all / collapse-all: only the group's direct children are touched.
    pub(super) fn set_group_open(&mut self, control: Id, open: bool) {
        let Some(group) = self.doc.closest(control, &self.markup.group) else {
            return;
        };
        let headers: Vec<Id> = self
            .doc
            .element_children(group)
            .filter(|c| self.doc.matches(*c, &self.markup.header))
            .collect();
        log::debug!(target: "viewer.toggle", "group {group:?}: {} headers open={open}", headers.len());
        for header in headers {
            disclosure::set_open(&mut self.doc, &self.markup, header, open);
        }
    }

    pub fn is_header_open(&self, header: Id) -> Option<bool> {
        disclosure::header_is_open(&self.doc, &self.markup, header)
    }
}
