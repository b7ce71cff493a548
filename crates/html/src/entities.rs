/// Decode a small, explicitly limited subset of HTML character references.
///
/// Contract:
/// - Named references from `NAMED` are decoded when terminated by `;`.
/// - Numeric references decode when well-formed and `;`-terminated: `&#8722;`, `&#x2212;`.
/// - Anything else (unknown names, missing `;`, invalid scalars) is left unchanged.
pub(crate) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match decode_one(tail) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

const NAMED: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{00A0}'),
    ("minus", '\u{2212}'),
    ("plus", '+'),
    ("hellip", '\u{2026}'),
];

// 0x10FFFF has 7 decimal digits
const MAX_REFERENCE_LEN: usize = 10;

/// `tail` starts at `&`. Returns the decoded char and the number of bytes consumed.
fn decode_one(tail: &str) -> Option<(char, usize)> {
    let semi = tail.as_bytes()[1..]
        .iter()
        .take(MAX_REFERENCE_LEN + 1)
        .position(|&b| b == b';')?;
    // `;` is ASCII, so `1 + semi` is a char boundary.
    let body = &tail[1..1 + semi];
    let consumed = 1 + semi + 1;

    if let Some(num) = body.strip_prefix('#') {
        let value = if let Some(hex) = num.strip_prefix(['x', 'X']) {
            if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            u32::from_str_radix(hex, 16).ok()?
        } else {
            if num.is_empty() || !num.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            num.parse::<u32>().ok()?
        };
        return char::from_u32(value).map(|ch| (ch, consumed));
    }

    NAMED
        .iter()
        .find(|(name, _)| *name == body)
        .map(|(_, ch)| (*ch, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_entities_preserves_utf8() {
        assert_eq!(decode_entities("120×32"), "120×32");
    }

    #[test]
    fn decode_entities_decodes_named_references() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;tag&gt;"), "<tag>");
        assert_eq!(decode_entities("&minus;"), "\u{2212}");
    }

    #[test]
    fn decode_entities_decodes_numeric_references() {
        assert_eq!(decode_entities("&#43;"), "+");
        assert_eq!(decode_entities("&#x2212;"), "\u{2212}");
        assert_eq!(decode_entities("&#X2212;"), "\u{2212}");
    }

    #[test]
    fn decode_entities_leaves_malformed_references() {
        assert_eq!(decode_entities("&amp"), "&amp");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
        assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
        assert_eq!(decode_entities("&#1114112;"), "&#1114112;");
        assert_eq!(decode_entities("a & b"), "a & b");
        assert_eq!(decode_entities("&&lt;"), "&<");
    }
}
