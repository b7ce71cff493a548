//! Simplified HTML tokenizer for server-rendered report markup.
//!
//! Tag and attribute names are ASCII `[A-Za-z0-9:_-]` and are lowercased on the way out.
//! `script` and `style` bodies are emitted verbatim as a single text token.
//!
//! Known limitations:
//! - No HTML5 parse-error recovery; malformed input degrades to text or is skipped.
//! - Raw-text close tags accept only ASCII whitespace before `>`.
use crate::entities::decode_entities;
use crate::types::Token;
use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

const SCRIPT_CLOSE_TAG: &[u8] = b"</script";
const STYLE_CLOSE_TAG: &[u8] = b"</style";

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Returns `(start, end)` of the first `close_tag` (optionally followed by whitespace) and `>`.
fn find_rawtext_close_tag(haystack: &str, close_tag: &[u8]) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let n = close_tag.len();
    let mut i = 0;
    while i + n <= bytes.len() {
        i += memchr(b'<', &bytes[i..])?;
        if starts_with_ignore_ascii_case_at(bytes, i, close_tag) {
            let mut k = i + n;
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < bytes.len() && bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

struct Cursor<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn take_name(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_name_byte) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// Advance past the next `>` (or to the end of input).
    fn skip_past_gt(&mut self) {
        match memchr(b'>', &self.bytes[self.pos..]) {
            Some(rel) => self.pos += rel + 1,
            None => self.pos = self.bytes.len(),
        }
    }
}

/// Tokenizes `input` into an owned token stream.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut cur = Cursor::new(input);

    // Slices are only cut at ASCII structural bytes, so every endpoint is a char boundary.
    while !cur.at_end() {
        if cur.peek() != Some(b'<') {
            let start = cur.pos;
            cur.pos = memchr(b'<', &cur.bytes[start..]).map_or(cur.bytes.len(), |rel| start + rel);
            let text = decode_entities(&input[start..cur.pos]);
            if !text.is_empty() {
                out.push(Token::Text(text));
            }
            continue;
        }

        let rest = &input[cur.pos..];
        if rest.starts_with(COMMENT_START) {
            let body_start = cur.pos + COMMENT_START.len();
            match input[body_start..].find(COMMENT_END) {
                Some(rel) => {
                    out.push(Token::Comment(input[body_start..body_start + rel].to_string()));
                    cur.pos = body_start + rel + COMMENT_END.len();
                }
                None => {
                    out.push(Token::Comment(input[body_start..].to_string()));
                    break;
                }
            }
            continue;
        }

        if starts_with_ignore_ascii_case_at(cur.bytes, cur.pos, b"<!doctype") {
            let Some(rel) = rest.find('>') else {
                break;
            };
            out.push(Token::Doctype(rest[2..rel].trim().to_string()));
            cur.pos += rel + 1;
            continue;
        }

        if rest.starts_with("</") {
            cur.pos += 2;
            let name = cur.take_name().to_ascii_lowercase();
            cur.skip_past_gt();
            if !name.is_empty() {
                out.push(Token::EndTag(name));
            }
            continue;
        }

        cur.pos += 1;
        let name = cur.take_name().to_ascii_lowercase();
        if name.is_empty() {
            // A stray `<` is literal text.
            out.push(Token::Text("<".to_string()));
            continue;
        }

        let (attributes, mut self_closing) = read_attributes(&mut cur);
        if is_void_element(&name) {
            self_closing = true;
        }

        let rawtext_close = match name.as_str() {
            "script" if !self_closing => Some(SCRIPT_CLOSE_TAG),
            "style" if !self_closing => Some(STYLE_CLOSE_TAG),
            _ => None,
        };

        out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });

        if let Some(close_tag) = rawtext_close {
            let body_start = cur.pos;
            match find_rawtext_close_tag(&input[body_start..], close_tag) {
                Some((rel_start, rel_end)) => {
                    let raw = &input[body_start..body_start + rel_start];
                    if !raw.is_empty() {
                        out.push(Token::Text(raw.to_string()));
                    }
                    out.push(Token::EndTag(name));
                    cur.pos = body_start + rel_end;
                }
                None => {
                    let raw = &input[body_start..];
                    if !raw.is_empty() {
                        out.push(Token::Text(raw.to_string()));
                    }
                    out.push(Token::EndTag(name));
                    break;
                }
            }
        }
    }
    out
}

/// Reads attributes up to and including the closing `>` of a start tag.
fn read_attributes(cur: &mut Cursor<'_>) -> (Vec<(String, Option<String>)>, bool) {
    let mut attributes = Vec::new();
    let mut self_closing = false;

    loop {
        cur.skip_whitespace();
        let Some(b) = cur.peek() else {
            break;
        };
        if b == b'>' {
            cur.pos += 1;
            break;
        }
        if b == b'/' {
            cur.pos += 1;
            if cur.peek() == Some(b'>') {
                cur.pos += 1;
                self_closing = true;
                break;
            }
            continue;
        }

        let key = cur.take_name();
        if key.is_empty() {
            // unexpected byte inside a tag; skip it (may be non-ASCII, so step a whole char)
            let step = cur.input[cur.pos..].chars().next().map_or(1, char::len_utf8);
            cur.pos += step;
            continue;
        }
        let key = key.to_ascii_lowercase();

        cur.skip_whitespace();
        if cur.peek() != Some(b'=') {
            attributes.push((key, None));
            continue;
        }
        cur.pos += 1;
        cur.skip_whitespace();

        let value = match cur.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                cur.pos += 1;
                let start = cur.pos;
                let end = memchr(quote, &cur.bytes[start..]).map_or(cur.bytes.len(), |rel| start + rel);
                let raw = &cur.input[start..end];
                cur.pos = (end + 1).min(cur.bytes.len());
                decode_entities(raw)
            }
            _ => {
                let start = cur.pos;
                while let Some(b) = cur.peek() {
                    if b.is_ascii_whitespace() || b == b'>' {
                        break;
                    }
                    if b == b'/' && cur.bytes.get(cur.pos + 1) == Some(&b'>') {
                        break;
                    }
                    cur.pos += 1;
                }
                decode_entities(&cur.input[start..cur.pos])
            }
        };
        attributes.push((key, Some(value)));
    }

    (attributes, self_closing)
}
