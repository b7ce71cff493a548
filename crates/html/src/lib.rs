//! In-memory DOM for server-rendered report pages: a mutable node arena, a simplified
//! tokenizer and tree builder, and compound selector matching.

pub mod dom_utils;
pub mod selector;

mod dom;
mod dom_builder;
mod entities;
mod tokenizer;
mod traverse;
mod types;

pub use crate::dom::{Descendants, Document};
pub use crate::selector::{Selector, SelectorError};
pub use crate::tokenizer::tokenize;
pub use crate::traverse::{ancestors, element_ancestors};
pub use crate::types::{Id, NodeId, NodeKind, Token};

/// `true` when a `Content-Type` header value names an HTML document.
pub fn is_html(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| {
        let ct = ct.to_ascii_lowercase();
        ct.contains("text/html") || ct.contains("application/xhtml")
    })
}
