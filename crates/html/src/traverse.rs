use crate::dom::Document;
use crate::types::Id;

/// Inclusive ancestor chain of `id`, nearest first, ending at the document node.
pub fn ancestors(doc: &Document, id: Id) -> impl Iterator<Item = Id> + '_ {
    std::iter::successors(doc.is_live(id).then_some(id), move |cur| doc.parent(*cur))
}

/// Inclusive ancestor chain restricted to elements.
pub fn element_ancestors(doc: &Document, id: Id) -> impl Iterator<Item = Id> + '_ {
    ancestors(doc, id).filter(move |a| doc.is_element(*a))
}
