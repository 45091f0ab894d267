use memchr::memchr;

const NAMED: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{a0}'),
    ("copy", '\u{a9}'),
    ("hellip", '\u{2026}'),
    ("mdash", '\u{2014}'),
    ("ndash", '\u{2013}'),
];

// 0x10FFFF in decimal has 7 digits.
const MAX_NUMERIC_DIGITS: usize = 7;

// Longest reference body between `&` and `;`: `#x` plus the digit limit.
const MAX_REFERENCE_LEN: usize = MAX_NUMERIC_DIGITS + 2;

/// Decode the small entity subset that shows up in page titles, links and
/// metadata. Only semicolon-terminated references decode; anything else is
/// copied through unchanged.
pub(crate) fn decode_entities(s: &str) -> String {
    let Some(first) = memchr(b'&', s.as_bytes()) else {
        return s.to_string();
    };

    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..first]);
    let mut rest = &s[first..];

    while let Some(amp) = memchr(b'&', rest.as_bytes()) {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match decode_one(rest) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// `input` starts at `&`. Returns the decoded char and the byte length consumed.
fn decode_one(input: &str) -> Option<(char, usize)> {
    let semi = find_terminator(input.as_bytes())?;
    let body = &input[1..semi];
    if body.is_empty() {
        return None;
    }

    let ch = if let Some(num) = body.strip_prefix('#') {
        let (digits, radix) = match num.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 16),
            None => (num, 10),
        };
        if digits.is_empty() || digits.len() > MAX_NUMERIC_DIGITS {
            return None;
        }
        let value = u32::from_str_radix(digits, radix).ok()?;
        char::from_u32(value)?
    } else {
        NAMED
            .iter()
            .find(|(name, _)| *name == body)
            .map(|(_, ch)| *ch)?
    };
    Some((ch, semi + 1))
}

/// Index of the `;` closing the reference at the start of `input`. The scan
/// stops at the first byte that cannot be part of a reference.
fn find_terminator(input: &[u8]) -> Option<usize> {
    input
        .iter()
        .enumerate()
        .skip(1)
        .take(MAX_REFERENCE_LEN + 1)
        .find(|(_, b)| !(b.is_ascii_alphanumeric() || **b == b'#'))
        .and_then(|(i, b)| (*b == b';').then_some(i))
}

#[cfg(test)]
mod tests {
    use super::decode_entities;
    use std::time::{Duration, Instant};

    #[test]
    fn decodes_named_and_numeric() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;p&gt;"), "<p>");
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
    }

    #[test]
    fn leaves_unknown_and_unterminated_references() {
        assert_eq!(decode_entities("AT&T"), "AT&T");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
        assert_eq!(decode_entities("&amp"), "&amp");
    }

    #[test]
    fn references_are_bounded() {
        assert_eq!(decode_entities("&#x10FFFF;").chars().count(), 1);
        assert_eq!(decode_entities("&#12345678;"), "&#12345678;");
        assert_eq!(decode_entities("&amp x;"), "&amp x;");
        assert_eq!(decode_entities("a && b &amp; c"), "a && b & c");
    }

    #[test]
    fn bare_ampersands_decode_in_linear_time() {
        let input = "a && b ".repeat(100_000);
        let start = Instant::now();
        let out = decode_entities(&input);
        assert_eq!(out, input);
        assert!(start.elapsed() < Duration::from_secs(2), "{:?}", start.elapsed());
    }
}
