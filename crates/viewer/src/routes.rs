//! Delegated handlers: one table for the whole document instead of a binding per node,
//! so markup swapped in later is handled without rebinding.
use html::Selector;

use crate::config::Markup;
use crate::events::EventKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ExpandAll,
    CollapseAll,
    CrossReference,
    Toggle,
}

#[derive(Debug, Clone)]
pub struct Route {
    pub kind: EventKind,
    pub selector: Selector,
    pub action: Action,
}

impl Route {
    fn click(selector: &Selector, action: Action) -> Self {
        Self {
            kind: EventKind::Click,
            selector: selector.clone(),
            action,
        }
    }
}

/// Routes run in this order; bulk controls stop propagation, so a control placed
/// inside a header never toggles that header.
pub fn default_routes(markup: &Markup) -> Vec<Route> {
    vec![
        Route::click(&markup.expand_all, Action::ExpandAll),
        Route::click(&markup.collapse_all, Action::CollapseAll),
        Route::click(&markup.segment_link, Action::CrossReference),
        Route::click(&markup.header, Action::Toggle),
    ]
}
