//! Header/content pairs.
//!
//! A pair is open exactly when its content region carries the open marker. The
//! indicator glyph and the header's own decoration are recomputed from that
//! marker after every change and are never read back as state.
use html::{Document, Id};

use crate::config::Markup;

/// The content region paired with `header`: its next element sibling, if that is a content region.
pub fn content_of(doc: &Document, markup: &Markup, header: Id) -> Option<Id> {
    doc.next_element_sibling(header)
        .filter(|c| doc.matches(*c, &markup.content))
}

/// The header directly preceding `content`, if there is one.
pub fn header_of(doc: &Document, markup: &Markup, content: Id) -> Option<Id> {
    doc.previous_element_sibling(content)
        .filter(|h| doc.matches(*h, &markup.header))
}

pub fn is_open(doc: &Document, markup: &Markup, content: Id) -> bool {
    doc.has_class(content, &markup.open_class)
}

/// `None` when the header has no content region.
pub fn header_is_open(doc: &Document, markup: &Markup, header: Id) -> Option<bool> {
    content_of(doc, markup, header).map(|c| is_open(doc, markup, c))
}

/// Flips the pair and returns the new state, or `None` if there is nothing to flip.
pub fn toggle(doc: &mut Document, markup: &Markup, header: Id) -> Option<bool> {
    let content = content_of(doc, markup, header)?;
    let open = doc.toggle_class(content, &markup.open_class);
    sync_header(doc, markup, header, open);
    Some(open)
}

/// Forces the pair open or closed. Re-applying the current state changes nothing.
pub fn set_open(doc: &mut Document, markup: &Markup, header: Id, open: bool) -> Option<()> {
    let content = content_of(doc, markup, header)?;
    if open {
        doc.add_class(content, &markup.open_class);
    } else {
        doc.remove_class(content, &markup.open_class);
    }
    sync_header(doc, markup, header, open);
    Some(())
}

fn sync_header(doc: &mut Document, markup: &Markup, header: Id, open: bool) {
    if let Some(indicator) = doc.query_selector(header, &markup.indicator) {
        let glyph = if open {
            &markup.open_glyph
        } else {
            &markup.closed_glyph
        };
        doc.set_text_content(indicator, glyph);
    }
    if open {
        doc.add_class(header, &markup.open_class);
    } else {
        doc.remove_class(header, &markup.open_class);
    }
}

/// Everything observable about one pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairState {
    pub open: bool,
    pub indicator: Option<String>,
    pub header_decorated: bool,
}

impl PairState {
    pub fn read(doc: &Document, markup: &Markup, header: Id) -> Option<Self> {
        let content = content_of(doc, markup, header)?;
        Some(Self {
            open: is_open(doc, markup, content),
            indicator: doc
                .query_selector(header, &markup.indicator)
                .map(|i| doc.text_content(i)),
            header_decorated: doc.has_class(header, &markup.open_class),
        })
    }

    /// Indicator (when present) and header decoration agree with the content marker.
    pub fn is_consistent(&self, markup: &Markup) -> bool {
        let glyph = if self.open {
            &markup.open_glyph
        } else {
            &markup.closed_glyph
        };
        self.indicator.as_ref().is_none_or(|i| i == glyph) && self.header_decorated == self.open
    }
}
