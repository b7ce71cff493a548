//! Mutable DOM arena.
//!
//! Invariants:
//! - `Id(0)` is always the document node and is never removed.
//! - Handles are never reused. Replacing a node's children marks every node under
//!   them dead; dead handles resolve to nothing.
//! - `mutation_count` only moves when a mutation changes observable state.
use crate::dom_builder::build_into;
use crate::selector::Selector;
use crate::tokenizer::tokenize;
use crate::traverse::ancestors;
use crate::types::{Id, NodeKind};

#[derive(Debug, Clone)]
struct NodeRecord {
    kind: NodeKind,
    parent: Option<Id>,
    children: Vec<Id>,
    live: bool,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeRecord>,
    mutations: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub const ROOT: Id = Id(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![NodeRecord {
                kind: NodeKind::Document { doctype: None },
                parent: None,
                children: Vec::new(),
                live: true,
            }],
            mutations: 0,
        }
    }

    pub fn parse(markup: &str) -> Self {
        let mut doc = Self::new();
        build_into(&mut doc, Self::ROOT, tokenize(markup));
        doc
    }

    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    fn record(&self, id: Id) -> Option<&NodeRecord> {
        self.nodes.get(id.index()).filter(|r| r.live)
    }

    fn record_mut(&mut self, id: Id) -> Option<&mut NodeRecord> {
        self.nodes.get_mut(id.index()).filter(|r| r.live)
    }

    pub fn is_live(&self, id: Id) -> bool {
        self.record(id).is_some()
    }

    pub fn kind(&self, id: Id) -> Option<&NodeKind> {
        self.record(id).map(|r| &r.kind)
    }

    pub fn doctype(&self) -> Option<&str> {
        match &self.nodes[0].kind {
            NodeKind::Document { doctype } => doctype.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn set_doctype(&mut self, doctype: String) {
        if let NodeKind::Document { doctype: slot } = &mut self.nodes[0].kind {
            *slot = Some(doctype);
        }
    }

    // --- tree structure ---

    pub fn parent(&self, id: Id) -> Option<Id> {
        self.record(id).and_then(|r| r.parent)
    }

    /// Parent, but only when it is an element (the document node is skipped).
    pub fn parent_element(&self, id: Id) -> Option<Id> {
        self.parent(id).filter(|p| self.is_element(*p))
    }

    pub fn children(&self, id: Id) -> &[Id] {
        self.record(id).map_or(&[][..], |r| r.children.as_slice())
    }

    pub fn element_children(&self, id: Id) -> impl Iterator<Item = Id> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
    }

    pub fn previous_element_sibling(&self, id: Id) -> Option<Id> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|c| *c == id)?;
        siblings[..pos]
            .iter()
            .rev()
            .copied()
            .find(|c| self.is_element(*c))
    }

    pub fn next_element_sibling(&self, id: Id) -> Option<Id> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|c| *c == id)?;
        siblings[pos + 1..]
            .iter()
            .copied()
            .find(|c| self.is_element(*c))
    }

    /// Inclusive: a node contains itself.
    pub fn contains(&self, ancestor: Id, node: Id) -> bool {
        self.is_live(ancestor) && ancestors(self, node).any(|a| a == ancestor)
    }

    /// Pre-order walk of every descendant of `scope` (excluding `scope`), in document order.
    pub fn descendants(&self, scope: Id) -> Descendants<'_> {
        let mut stack: Vec<Id> = self.children(scope).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    // --- element data ---

    pub fn is_element(&self, id: Id) -> bool {
        self.kind(id).is_some_and(NodeKind::is_element)
    }

    pub fn tag_name(&self, id: Id) -> Option<&str> {
        self.kind(id).and_then(NodeKind::element_name)
    }

    pub fn attribute(&self, id: Id, key: &str) -> Option<&str> {
        self.kind(id).and_then(|k| k.attribute(key))
    }

    /// The element's `id` attribute.
    pub fn element_id(&self, id: Id) -> Option<&str> {
        self.attribute(id, "id").filter(|v| !v.is_empty())
    }

    pub fn has_class(&self, id: Id, class: &str) -> bool {
        self.kind(id).is_some_and(|k| k.has_class(class))
    }

    pub fn text_content(&self, id: Id) -> String {
        let mut out = String::new();
        if let Some(NodeKind::Text { text }) = self.kind(id) {
            out.push_str(text);
            return out;
        }
        for d in self.descendants(id) {
            if let Some(NodeKind::Text { text }) = self.kind(d) {
                out.push_str(text);
            }
        }
        out
    }

    // --- queries ---

    pub fn matches(&self, id: Id, selector: &Selector) -> bool {
        self.kind(id).is_some_and(|k| selector.matches(k))
    }

    /// Nearest inclusive ancestor of `id` that matches `selector`.
    pub fn closest(&self, id: Id, selector: &Selector) -> Option<Id> {
        ancestors(self, id).find(|node| self.matches(*node, selector))
    }

    pub fn query_selector(&self, scope: Id, selector: &Selector) -> Option<Id> {
        self.descendants(scope).find(|d| self.matches(*d, selector))
    }

    pub fn query_selector_all(&self, scope: Id, selector: &Selector) -> Vec<Id> {
        self.descendants(scope)
            .filter(|d| self.matches(*d, selector))
            .collect()
    }

    /// First element in document order whose `id` attribute equals `element_id`.
    pub fn get_element_by_id(&self, element_id: &str) -> Option<Id> {
        self.descendants(Self::ROOT)
            .find(|d| self.element_id(*d) == Some(element_id))
    }

    /// `<body>`, falling back to the first element child of the document.
    pub fn body(&self) -> Option<Id> {
        let body = Selector::default().with_tag("body");
        self.query_selector(Self::ROOT, &body)
            .or_else(|| self.element_children(Self::ROOT).next())
    }

    // --- mutation ---

    pub(crate) fn append_node(&mut self, parent: Id, kind: NodeKind) -> Option<Id> {
        self.record(parent)?;
        let id = Id(u32::try_from(self.nodes.len()).ok()?);
        self.nodes.push(NodeRecord {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            live: true,
        });
        self.nodes[parent.index()].children.push(id);
        Some(id)
    }

    pub fn set_attribute(&mut self, id: Id, key: &str, value: &str) -> bool {
        let Some(NodeKind::Element { attributes, .. }) = self.record_mut(id).map(|r| &mut r.kind)
        else {
            return false;
        };
        let changed = match attributes
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            Some((_, v)) if v.as_deref() == Some(value) => false,
            Some((_, v)) => {
                *v = Some(value.to_string());
                true
            }
            None => {
                attributes.push((key.to_ascii_lowercase(), Some(value.to_string())));
                true
            }
        };
        if changed {
            self.mutations += 1;
        }
        changed
    }

    /// Returns `true` when the class was not present before.
    pub fn add_class(&mut self, id: Id, class: &str) -> bool {
        if !self.is_element(id) || self.has_class(id, class) {
            return false;
        }
        let mut classes: Vec<&str> = self
            .attribute(id, "class")
            .map(|v| v.split_ascii_whitespace().collect())
            .unwrap_or_default();
        classes.push(class);
        let joined = classes.join(" ");
        self.set_attribute(id, "class", &joined)
    }

    /// Returns `true` when the class was present before.
    pub fn remove_class(&mut self, id: Id, class: &str) -> bool {
        if !self.has_class(id, class) {
            return false;
        }
        let joined = self
            .attribute(id, "class")
            .unwrap_or_default()
            .split_ascii_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute(id, "class", &joined)
    }

    /// Flips `class` and returns whether it is present afterwards.
    pub fn toggle_class(&mut self, id: Id, class: &str) -> bool {
        if self.has_class(id, class) {
            self.remove_class(id, class);
            false
        } else {
            self.add_class(id, class)
        }
    }

    /// Replaces all children of `id` with a single text node.
    pub fn set_text_content(&mut self, id: Id, text: &str) -> bool {
        if !self.is_element(id) || self.text_content(id) == text {
            return false;
        }
        self.detach_children(id);
        if !text.is_empty() {
            self.append_node(
                id,
                NodeKind::Text {
                    text: text.to_string(),
                },
            );
        }
        self.mutations += 1;
        true
    }

    /// Replaces the children of `id` with the parsed `markup`; returns the new top-level nodes.
    pub fn set_inner_html(&mut self, id: Id, markup: &str) -> Vec<Id> {
        if !self.is_element(id) {
            return Vec::new();
        }
        self.detach_children(id);
        let inserted = build_into(self, id, tokenize(markup));
        self.mutations += 1;
        log::trace!(target: "html.dom", "inner html of {id:?} replaced by {} top-level nodes", inserted.len());
        inserted
    }

    /// Replaces the whole document with the parsed `markup`. Every existing handle dies.
    pub fn replace_with_markup(&mut self, markup: &str) {
        let mutations = self.mutations + 1;
        let old_len = self.nodes.len();
        *self = Self::parse(markup);
        // Keep handles monotonic across replacement: pad the arena with dead records so
        // ids handed out before the replacement never resolve to new nodes.
        let fresh: Vec<NodeRecord> = self.nodes.drain(1..).collect();
        let dead = NodeRecord {
            kind: NodeKind::Comment {
                text: String::new(),
            },
            parent: None,
            children: Vec::new(),
            live: false,
        };
        self.nodes.resize(old_len, dead);
        let offset = u32::try_from(old_len - 1).unwrap_or(u32::MAX);
        let shift = |id: Id| if id == Self::ROOT { id } else { Id(id.0 + offset) };
        for mut rec in fresh {
            rec.parent = rec.parent.map(shift);
            rec.children = rec.children.into_iter().map(shift).collect();
            self.nodes.push(rec);
        }
        self.nodes[0].children = self.nodes[0].children.iter().copied().map(shift).collect();
        self.mutations = mutations;
    }

    fn detach_children(&mut self, id: Id) {
        let children = std::mem::take(&mut self.nodes[id.index()].children);
        for child in children {
            self.kill_subtree(child);
        }
    }

    fn kill_subtree(&mut self, id: Id) {
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let rec = &mut self.nodes[node.index()];
            rec.live = false;
            rec.parent = None;
            stack.extend(std::mem::take(&mut rec.children));
        }
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<Id>,
}

impl Iterator for Descendants<'_> {
    type Item = Id;

    fn next(&mut self) -> Option<Id> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<!DOCTYPE html>
<html><body>
  <div id="a" class="toggle-header"><span class="toggle-indicator">+</span>A</div>
  <div id="a-content" class="toggle-content"><p id="inner">x</p></div>
  <div id="b" class="segment" data-offset="7"></div>
</body></html>"#;

    fn by_id(doc: &Document, id: &str) -> Id {
        doc.get_element_by_id(id).expect("fixture element")
    }

    #[test]
    fn parse_builds_navigable_tree() {
        let doc = Document::parse(SAMPLE);
        assert_eq!(doc.doctype(), Some("DOCTYPE html"));
        let header = by_id(&doc, "a");
        let content = by_id(&doc, "a-content");
        assert_eq!(doc.next_element_sibling(header), Some(content));
        assert_eq!(doc.previous_element_sibling(content), Some(header));
        assert_eq!(doc.tag_name(doc.body().unwrap()), Some("body"));
        assert_eq!(doc.text_content(header), "+A");
    }

    #[test]
    fn closest_is_inclusive_and_walks_up() {
        let doc = Document::parse(SAMPLE);
        let inner = by_id(&doc, "inner");
        let content = by_id(&doc, "a-content");
        let sel = Selector::class("toggle-content");
        assert_eq!(doc.closest(inner, &sel), Some(content));
        assert_eq!(doc.closest(content, &sel), Some(content));
        assert_eq!(doc.closest(by_id(&doc, "a"), &sel), None);
    }

    #[test]
    fn class_mutations_only_count_real_changes() {
        let mut doc = Document::parse(SAMPLE);
        let content = by_id(&doc, "a-content");
        let before = doc.mutation_count();
        assert!(doc.add_class(content, "open"));
        assert!(!doc.add_class(content, "open"));
        assert_eq!(doc.attribute(content, "class"), Some("toggle-content open"));
        assert!(!doc.toggle_class(content, "open"));
        assert!(!doc.remove_class(content, "open"));
        assert_eq!(doc.mutation_count(), before + 2);
    }

    #[test]
    fn set_text_content_replaces_children() {
        let mut doc = Document::parse(SAMPLE);
        let indicator = doc
            .query_selector(Document::ROOT, &Selector::class("toggle-indicator"))
            .unwrap();
        assert!(doc.set_text_content(indicator, "\u{2212}"));
        assert!(!doc.set_text_content(indicator, "\u{2212}"));
        assert_eq!(doc.text_content(indicator), "\u{2212}");
    }

    #[test]
    fn set_inner_html_kills_old_subtree() {
        let mut doc = Document::parse(SAMPLE);
        let content = by_id(&doc, "a-content");
        let inner = by_id(&doc, "inner");
        let inserted = doc.set_inner_html(content, r#"<ul class="segment-list"><li>1</li></ul>"#);
        assert_eq!(inserted.len(), 1);
        assert!(!doc.is_live(inner));
        assert_eq!(doc.get_element_by_id("inner"), None);
        assert!(doc.contains(content, inserted[0]));
        assert!(doc.has_class(inserted[0], "segment-list"));
    }

    #[test]
    fn replace_with_markup_invalidates_old_handles() {
        let mut doc = Document::parse(SAMPLE);
        let header = by_id(&doc, "a");
        let count = doc.mutation_count();
        doc.replace_with_markup("<html><body><p id=\"fresh\">new</p></body></html>");
        assert!(!doc.is_live(header));
        assert_eq!(doc.get_element_by_id("a"), None);
        let fresh = by_id(&doc, "fresh");
        assert_ne!(fresh, header);
        assert_eq!(doc.text_content(fresh), "new");
        let body = doc.parent_element(fresh).unwrap();
        assert_eq!(doc.tag_name(body), Some("body"));
        assert_eq!(doc.body(), Some(body));
        assert_eq!(doc.mutation_count(), count + 1);
    }

    #[test]
    fn query_selector_all_is_in_document_order() {
        let doc = Document::parse(
            r#"<div class="segment" id="s1" data-offset="7"><div class="segment" id="s2" data-offset="7"></div></div><div class="segment" id="s3" data-offset="7"></div>"#,
        );
        let sel = Selector::class("segment").with_attribute_equals("data-offset", "7");
        let ids: Vec<_> = doc
            .query_selector_all(Document::ROOT, &sel)
            .into_iter()
            .map(|id| doc.element_id(id).unwrap().to_string())
            .collect();
        assert_eq!(ids, ["s1", "s2", "s3"]);
    }
}
