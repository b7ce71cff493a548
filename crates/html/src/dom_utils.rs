use crate::dom::Document;
use crate::types::{Id, NodeKind};

const SNIPPET_CHARS: usize = 40;

fn snippet(text: &str) -> String {
    let flat = text.replace('\n', " ");
    let t = flat.trim();
    if t.chars().count() > SNIPPET_CHARS {
        let cut: String = t.chars().take(SNIPPET_CHARS).collect();
        format!("{cut}…")
    } else {
        t.to_string()
    }
}

/// Indented one-line-per-node dump of the subtree at `scope`, capped at `cap` lines.
///
/// Elements show only `id` and `class`; whitespace-only text is skipped.
pub fn outline(doc: &Document, scope: Id, cap: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack = vec![(scope, 0usize)];

    while let Some((id, depth)) = stack.pop() {
        if out.len() >= cap {
            break;
        }
        let Some(kind) = doc.kind(id) else {
            continue;
        };
        let indent = "  ".repeat(depth);
        match kind {
            NodeKind::Document { doctype } => match doctype {
                Some(dt) => out.push(format!("{indent}<!{dt}>")),
                None => out.push(format!("{indent}#document")),
            },
            NodeKind::Element { name, .. } => {
                let mut line = format!("{indent}<{name}");
                if let Some(v) = doc.element_id(id) {
                    line.push_str(&format!(r#" id="{v}""#));
                }
                if let Some(v) = doc.attribute(id, "class").filter(|v| !v.is_empty()) {
                    line.push_str(&format!(r#" class="{v}""#));
                }
                line.push('>');
                out.push(line);
            }
            NodeKind::Text { text } => {
                let t = snippet(text);
                if !t.is_empty() {
                    out.push(format!("{indent}\"{t}\""));
                }
            }
            NodeKind::Comment { text } => {
                out.push(format!("{indent}<!-- {} -->", snippet(text)));
            }
        }
        for child in doc.children(id).iter().rev() {
            stack.push((*child, depth + 1));
        }
    }
    out
}
