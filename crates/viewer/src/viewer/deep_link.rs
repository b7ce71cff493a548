use html::Id;

use super::Viewer;
use crate::disclosure;
use crate::viewport::Deferred;

impl Viewer {
    /// Opens every closed disclosure around the fragment's target and schedules a
    /// scroll to it. Safe to repeat: already-open ancestors are not touched, but the
    /// scroll is queued every time.
    pub fn navigate(&mut self, fragment: &str) {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        if !fragment.starts_with(self.deep_link_prefix.as_str()) {
            log::trace!(target: "viewer.nav", "#{fragment} is not a deep link");
            return;
        }
        let Some(target) = self.doc.get_element_by_id(fragment) else {
            log::debug!(target: "viewer.nav", "#{fragment} not in document");
            return;
        };

        let opened = self.open_enclosing(target);
        log::debug!(target: "viewer.nav", "#{fragment}: opened {opened} ancestors");
        self.deferred.push_back(Deferred::ScrollIntoView {
            element_id: fragment.to_string(),
        });
    }

    /// Walks content regions from the target outwards and clicks the header of each
    /// closed one. Regions without a header right before them are skipped.
    ///
    /// The walk starts at the target's own content region when it wraps a pair,
    /// otherwise at the nearest region enclosing it.
    fn open_enclosing(&mut self, target: Id) -> usize {
        let mut opened = 0;
        let mut current = self
            .doc
            .element_children(target)
            .find(|c| self.doc.matches(*c, &self.markup.content))
            .or_else(|| self.doc.closest(target, &self.markup.content));
        while let Some(content) = current {
            if !disclosure::is_open(&self.doc, &self.markup, content) {
                if let Some(header) = disclosure::header_of(&self.doc, &self.markup, content) {
                    self.toggle_header(header);
                    opened += 1;
                }
            }
            current = self
                .doc
                .parent_element(content)
                .and_then(|p| self.doc.closest(p, &self.markup.content));
        }
        opened
    }
}
