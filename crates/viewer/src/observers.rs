//! Subscribe once, filter, unsubscribe.
use html::{Document, Id};

type Predicate = Box<dyn Fn(&Document, Id) -> bool>;

/// Observers of fragment swaps. Each entry fires at most once: the first swap whose
/// target satisfies its predicate removes it and hands back its payload.
pub struct OneShot<T> {
    entries: Vec<(Predicate, T)>,
}

impl<T> Default for OneShot<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> OneShot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, predicate: impl Fn(&Document, Id) -> bool + 'static, payload: T) {
        self.entries.push((Box::new(predicate), payload));
    }

    /// Removes and returns, in registration order, every payload whose predicate accepts `target`.
    pub fn take_matching(&mut self, doc: &Document, target: Id) -> Vec<T> {
        let (hits, keep): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|(predicate, _)| predicate(doc, target));
        self.entries = keep;
        hits.into_iter().map(|(_, payload)| payload).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_for_matching_target_only() {
        let doc = Document::parse(r#"<section id="a"><div id="inner"></div></section><section id="b"></section>"#);
        let a = doc.get_element_by_id("a").unwrap();
        let b = doc.get_element_by_id("b").unwrap();
        let inner = doc.get_element_by_id("inner").unwrap();

        let mut observers = OneShot::new();
        observers.register(move |doc: &Document, target| doc.contains(a, target), "seg-7");
        observers.register(move |doc: &Document, target| doc.contains(b, target), "seg-9");

        assert!(observers.take_matching(&doc, Document::ROOT).is_empty());
        assert_eq!(observers.take_matching(&doc, inner), vec!["seg-7"]);
        assert!(observers.take_matching(&doc, inner).is_empty());
        assert_eq!(observers.len(), 1);
        assert_eq!(observers.take_matching(&doc, b), vec!["seg-9"]);
        assert!(observers.is_empty());
    }
}
