use crate::dom::Document;
use crate::types::{Id, NodeKind, Token};

/// Appends the nodes described by `tokens` under `parent` and returns the new top-level nodes.
///
/// Unmatched end tags are ignored; elements still open at the end of input are closed
/// implicitly. A doctype is only honoured when building directly under the document node.
pub(crate) fn build_into(doc: &mut Document, parent: Id, tokens: Vec<Token>) -> Vec<Id> {
    let mut inserted = Vec::new();
    let mut open_elements: Vec<(Id, String)> = Vec::new();

    for token in tokens {
        let current = open_elements.last().map_or(parent, |(id, _)| *id);
        let at_top = open_elements.is_empty();

        let new_node = match token {
            Token::Doctype(doctype) => {
                if parent == Document::ROOT && at_top {
                    doc.set_doctype(doctype);
                }
                None
            }
            Token::Comment(text) => doc.append_node(current, NodeKind::Comment { text }),
            Token::Text(text) => {
                if text.is_empty() {
                    None
                } else {
                    doc.append_node(current, NodeKind::Text { text })
                }
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let id = doc.append_node(
                    current,
                    NodeKind::Element {
                        name: name.clone(),
                        attributes,
                    },
                );
                if let (Some(id), false) = (id, self_closing) {
                    open_elements.push((id, name));
                }
                id
            }
            Token::EndTag(name) => {
                if let Some(pos) = open_elements.iter().rposition(|(_, open)| *open == name) {
                    open_elements.truncate(pos);
                }
                None
            }
        };

        if let (Some(id), true) = (new_node, at_top) {
            inserted.push(id);
        }
    }

    inserted
}

#[cfg(test)]
mod tests {
    use crate::Document;

    #[test]
    fn unmatched_end_tags_are_ignored() {
        let doc = Document::parse("<div id=outer><p>one</span>two</p></div><b id=after></b>");
        let outer = doc.get_element_by_id("outer").unwrap();
        let after = doc.get_element_by_id("after").unwrap();
        assert_eq!(doc.text_content(outer), "onetwo");
        assert_eq!(doc.parent(after), Some(Document::ROOT));
    }

    #[test]
    fn unclosed_elements_are_closed_at_end_of_input() {
        let doc = Document::parse("<section id=s><div id=d>text");
        let s = doc.get_element_by_id("s").unwrap();
        let d = doc.get_element_by_id("d").unwrap();
        assert_eq!(doc.parent(d), Some(s));
        assert_eq!(doc.text_content(s), "text");
    }

    #[test]
    fn build_handles_deep_nesting_without_recursion() {
        let depth = 5_000;
        let markup = format!("{}{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let doc = Document::parse(&markup);
        assert_eq!(doc.descendants(Document::ROOT).count(), depth);
    }

    #[test]
    fn fragment_reports_top_level_nodes_only() {
        let mut doc = Document::parse("<div id=host></div>");
        let host = doc.get_element_by_id("host").unwrap();
        let inserted = doc.set_inner_html(host, "<p><i>a</i></p>text<!--c--><br>");
        assert_eq!(inserted.len(), 4);
        assert!(inserted.iter().all(|id| doc.parent(*id) == Some(host)));
    }
}
