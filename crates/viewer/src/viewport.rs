use html::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Start,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    pub element_id: String,
    pub target: Id,
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

/// Work postponed to the next `Viewer::tick`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Deferred {
    /// Resolved by id when it runs, so a target replaced in between is still found.
    ScrollIntoView { element_id: String },
}

/// Headless stand-in for the scroll position: every scroll the engine asked for, in order.
#[derive(Debug, Default)]
pub struct Viewport {
    scrolls: Vec<ScrollRequest>,
}

impl Viewport {
    pub fn scrolls(&self) -> &[ScrollRequest] {
        &self.scrolls
    }

    pub fn last_scroll(&self) -> Option<&ScrollRequest> {
        self.scrolls.last()
    }

    pub(crate) fn record(&mut self, request: ScrollRequest) {
        log::debug!(
            target: "viewer.viewport",
            "scroll #{} into view ({:?}, {:?})",
            request.element_id,
            request.behavior,
            request.block
        );
        self.scrolls.push(request);
    }
}
