//! Compound simple selectors: `tag`, `*`, `#id`, `.class`, `[attr]`, `[attr=value]`,
//! `[attr^=value]`. No combinators, no pseudo-classes.
use crate::types::NodeKind;
use std::fmt;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected {ch:?} at byte {at} in selector `{input}`")]
    Unexpected { input: String, ch: char, at: usize },
    #[error("missing name after `{marker}` in selector `{input}`")]
    MissingName { input: String, marker: char },
    #[error("unterminated attribute selector in `{0}`")]
    UnterminatedAttribute(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatcher {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttrMatcher>,
}

type Chars<'a> = Peekable<CharIndices<'a>>;

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':'
}

fn take_ident(chars: &mut Chars<'_>) -> String {
    let mut ident = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    ident
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut sel = Selector::default();
        let mut chars = s.char_indices().peekable();

        while let Some(&(at, c)) = chars.peek() {
            match c {
                '*' if at == 0 => {
                    chars.next();
                }
                '#' | '.' => {
                    chars.next();
                    let name = take_ident(&mut chars);
                    if name.is_empty() {
                        return Err(SelectorError::MissingName {
                            input: s.to_string(),
                            marker: c,
                        });
                    }
                    if c == '#' {
                        sel.id = Some(name);
                    } else {
                        sel.classes.push(name);
                    }
                }
                '[' => {
                    chars.next();
                    sel.attributes.push(parse_attribute(s, &mut chars)?);
                }
                c if is_ident_char(c) && at == 0 => {
                    sel.tag = Some(take_ident(&mut chars).to_ascii_lowercase());
                }
                _ => {
                    return Err(SelectorError::Unexpected {
                        input: s.to_string(),
                        ch: c,
                        at,
                    });
                }
            }
        }

        Ok(sel)
    }

    pub fn class(name: &str) -> Self {
        Selector {
            classes: vec![name.to_string()],
            ..Selector::default()
        }
    }

    pub fn with_tag(mut self, name: &str) -> Self {
        self.tag = Some(name.to_ascii_lowercase());
        self
    }

    pub fn with_attribute_equals(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(AttrMatcher {
            name: name.to_ascii_lowercase(),
            op: AttrOp::Equals(value.to_string()),
        });
        self
    }

    pub fn with_attribute(mut self, name: &str) -> Self {
        self.attributes.push(AttrMatcher {
            name: name.to_ascii_lowercase(),
            op: AttrOp::Exists,
        });
        self
    }

    /// Whether a single element satisfies every part of the compound selector.
    pub fn matches(&self, kind: &NodeKind) -> bool {
        let NodeKind::Element { name, .. } = kind else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|t| t != name) {
            return false;
        }
        if let Some(id) = self.id.as_deref() {
            if kind.attribute("id") != Some(id) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| kind.has_class(c)) {
            return false;
        }
        self.attributes.iter().all(|m| {
            let Some(value) = kind.attribute(&m.name) else {
                return false;
            };
            match &m.op {
                AttrOp::Exists => true,
                AttrOp::Equals(expected) => value == expected,
                AttrOp::Prefix(prefix) => value.starts_with(prefix.as_str()),
            }
        })
    }
}

fn parse_attribute(input: &str, chars: &mut Chars<'_>) -> Result<AttrMatcher, SelectorError> {
    let name = take_ident(chars);
    if name.is_empty() {
        return Err(SelectorError::MissingName {
            input: input.to_string(),
            marker: '[',
        });
    }
    let name = name.to_ascii_lowercase();

    let prefix = match chars.next() {
        Some((_, ']')) => {
            return Ok(AttrMatcher {
                name,
                op: AttrOp::Exists,
            });
        }
        Some((_, '=')) => false,
        Some((_, '^')) => match chars.next() {
            Some((_, '=')) => true,
            Some((at, ch)) => {
                return Err(SelectorError::Unexpected {
                    input: input.to_string(),
                    ch,
                    at,
                });
            }
            None => return Err(SelectorError::UnterminatedAttribute(input.to_string())),
        },
        Some((at, ch)) => {
            return Err(SelectorError::Unexpected {
                input: input.to_string(),
                ch,
                at,
            });
        }
        None => return Err(SelectorError::UnterminatedAttribute(input.to_string())),
    };

    let mut value = String::new();
    let quote = match chars.peek() {
        Some(&(_, q @ ('"' | '\''))) => {
            chars.next();
            Some(q)
        }
        _ => None,
    };
    loop {
        match chars.next() {
            Some((_, c)) if Some(c) == quote => {
                match chars.next() {
                    Some((_, ']')) => break,
                    Some((at, ch)) => {
                        return Err(SelectorError::Unexpected {
                            input: input.to_string(),
                            ch,
                            at,
                        });
                    }
                    None => return Err(SelectorError::UnterminatedAttribute(input.to_string())),
                }
            }
            Some((_, ']')) if quote.is_none() => break,
            Some((_, c)) => value.push(c),
            None => return Err(SelectorError::UnterminatedAttribute(input.to_string())),
        }
    }

    let op = if prefix {
        AttrOp::Prefix(value)
    } else {
        AttrOp::Equals(value)
    };
    Ok(AttrMatcher { name, op })
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        if let Some(tag) = &self.tag {
            f.write_str(tag)?;
            wrote = true;
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
            wrote = true;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
            wrote = true;
        }
        for m in &self.attributes {
            match &m.op {
                AttrOp::Exists => write!(f, "[{}]", m.name)?,
                AttrOp::Equals(v) => write!(f, "[{}=\"{v}\"]", m.name)?,
                AttrOp::Prefix(v) => write!(f, "[{}^=\"{v}\"]", m.name)?,
            }
            wrote = true;
        }
        if !wrote {
            f.write_str("*")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(name: &str, attributes: &[(&str, &str)]) -> NodeKind {
        NodeKind::Element {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), Some(v.to_string())))
                .collect(),
        }
    }

    #[test]
    fn compound_selector_matches_all_parts() {
        let sel = Selector::parse("div.toggle-header.lazy[data-src]").unwrap();
        let lazy = element("div", &[("class", "lazy toggle-header"), ("data-src", "/s")]);
        let eager = element("div", &[("class", "toggle-header")]);
        let span = element("span", &[("class", "lazy toggle-header"), ("data-src", "/s")]);
        assert!(sel.matches(&lazy));
        assert!(!sel.matches(&eager));
        assert!(!sel.matches(&span));
    }

    #[test]
    fn attribute_value_operators() {
        let eq = Selector::parse(r#".segment[data-offset="7"]"#).unwrap();
        let prefix = Selector::parse("a[href^=#]").unwrap();
        assert!(eq.matches(&element("div", &[("class", "segment"), ("data-offset", "7")])));
        assert!(!eq.matches(&element("div", &[("class", "segment"), ("data-offset", "70")])));
        assert!(prefix.matches(&element("a", &[("href", "#segment-1")])));
        assert!(!prefix.matches(&element("a", &[("href", "/upload")])));
    }

    #[test]
    fn id_and_universal_selectors() {
        let by_id = Selector::parse("#segments").unwrap();
        assert!(by_id.matches(&element("section", &[("id", "segments")])));
        assert!(!by_id.matches(&element("section", &[("id", "schema")])));
        let any = Selector::parse("*").unwrap();
        assert!(any.matches(&element("p", &[])));
        assert!(!any.matches(&NodeKind::Text { text: "x".into() }));
    }

    #[test]
    fn malformed_selectors_are_rejected() {
        assert_eq!(Selector::parse("  "), Err(SelectorError::Empty));
        assert!(matches!(
            Selector::parse("."),
            Err(SelectorError::MissingName { marker: '.', .. })
        ));
        assert!(matches!(
            Selector::parse("[data-offset=7"),
            Err(SelectorError::UnterminatedAttribute(_))
        ));
        assert!(matches!(
            Selector::parse("div > p"),
            Err(SelectorError::Unexpected { ch: ' ', .. })
        ));
    }

    #[test]
    fn display_round_trips_through_parse() {
        let sel = Selector::class("segment").with_attribute_equals("data-offset", "a b");
        let reparsed: Selector = sel.to_string().parse().unwrap();
        assert_eq!(sel, reparsed);
    }
}
