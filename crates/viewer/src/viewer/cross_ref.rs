use html::{Document, Id};

use super::{FetchState, Viewer};

impl Viewer {
    /// A segment link click. Resolves at once when the segment list is rendered;
    /// otherwise loads the segments section and resolves after that swap.
    pub(super) fn cross_reference(&mut self, link: Id) {
        let Some(offset) = self
            .doc
            .attribute(link, &self.markup.offset_attribute)
            .map(str::to_string)
        else {
            return;
        };

        if self
            .doc
            .query_selector(Document::ROOT, &self.markup.segment_list)
            .is_some()
        {
            self.resolve_segment(&offset);
            return;
        }

        let section = self.doc.get_element_by_id(&self.markup.segments_section_id);
        let header = section.and_then(|s| {
            self.doc
                .element_children(s)
                .find(|c| self.doc.matches(*c, &self.markup.header))
        });
        let (Some(section), Some(header)) = (section, header) else {
            self.resolve_segment(&offset);
            return;
        };

        if !self.start_section_load(header) {
            self.resolve_segment(&offset);
            return;
        }
        log::debug!(target: "viewer.xref", "offset {offset} waits for the segments section");
        self.swap_observers.register(
            move |doc: &Document, target| doc.contains(section, target) || doc.contains(target, section),
            offset,
        );
    }

    /// Gets the section's fragment on its way; false when no swap is coming.
    fn start_section_load(&mut self, header: Id) -> bool {
        if self
            .doc
            .attribute(header, &self.markup.source_attribute)
            .is_none()
        {
            return false;
        }
        match self.fetch_state(header) {
            FetchState::Loading => true,
            FetchState::Loaded => false,
            FetchState::Unloaded => {
                if self.is_header_open(header) == Some(false) {
                    self.toggle_header(header);
                } else {
                    // Open but empty: an earlier load failed.
                    self.load_if_lazy(header);
                }
                self.fetch_state(header) == FetchState::Loading
            }
        }
    }

    /// Points the location at the last segment carrying `offset` and navigates there.
    /// Returns false when no segment has that offset.
    pub fn resolve_segment(&mut self, offset: &str) -> bool {
        let selector = self
            .markup
            .segment
            .clone()
            .with_attribute_equals(&self.markup.offset_attribute, offset);
        let Some(target) = self
            .doc
            .query_selector_all(Document::ROOT, &selector)
            .pop()
        else {
            log::debug!(target: "viewer.xref", "no segment at offset {offset}");
            return false;
        };
        let Some(element_id) = self.doc.element_id(target).map(str::to_string) else {
            return false;
        };
        // Assigning an unchanged fragment fires nothing, so navigate explicitly.
        self.location.set_fragment(&element_id);
        self.navigate(&element_id);
        true
    }
}
