//! Small, forgiving HTML tokenizer.
//!
//! This is not an HTML5 state machine. It covers what server-rendered pages
//! need for soft navigation: tags with quoted/unquoted/bare attributes,
//! comments, doctype, and raw text for `script`/`style`/`textarea`/`title`.
//!
//! Tag and attribute names are ASCII `[A-Za-z0-9:_-]` and are lowercased.
use crate::entities::decode_entities;
use crate::types::{Attributes, Token};
use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

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

/// Elements whose content is not markup. `title`/`textarea` still decode entities.
fn raw_text_kind(name: &str) -> Option<bool> {
    match name {
        "script" | "style" => Some(false),
        "title" | "textarea" => Some(true),
        _ => None,
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(input);
    tokenizer.run();
    tokenizer.out
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    out: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            out: Vec::new(),
        }
    }

    fn bytes(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn run(&mut self) {
        // Positions only ever land on ASCII structural bytes, so every slice
        // endpoint stays on a UTF-8 char boundary.
        while self.pos < self.input.len() {
            if self.bytes()[self.pos] != b'<' {
                self.text();
                continue;
            }
            let rest = self.rest();
            if rest.starts_with(COMMENT_START) {
                self.comment();
            } else if rest.len() >= 9 && rest.as_bytes()[..9].eq_ignore_ascii_case(b"<!doctype") {
                self.doctype();
            } else if rest.starts_with("</") {
                self.end_tag();
            } else if rest.len() > 1 && rest.as_bytes()[1].is_ascii_alphabetic() {
                self.start_tag();
            } else {
                // A lone `<` is text.
                self.push_text("<");
                self.pos += 1;
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Token::Text(prev)) = self.out.last_mut() {
            prev.push_str(text);
        } else {
            self.out.push(Token::Text(text.to_string()));
        }
    }

    fn text(&mut self) {
        let start = self.pos;
        let end = memchr(b'<', &self.bytes()[start..])
            .map(|rel| start + rel)
            .unwrap_or(self.input.len());
        let decoded = decode_entities(&self.input[start..end]);
        self.push_text(&decoded);
        self.pos = end;
    }

    fn comment(&mut self) {
        let body_start = self.pos + COMMENT_START.len();
        match self.input[body_start..].find(COMMENT_END) {
            Some(rel) => {
                let body = &self.input[body_start..body_start + rel];
                self.out.push(Token::Comment(body.to_string()));
                self.pos = body_start + rel + COMMENT_END.len();
            }
            None => {
                self.out
                    .push(Token::Comment(self.input[body_start..].to_string()));
                self.pos = self.input.len();
            }
        }
    }

    fn doctype(&mut self) {
        let body_start = self.pos + 2;
        match memchr(b'>', &self.bytes()[body_start..]) {
            Some(rel) => {
                let body = self.input[body_start..body_start + rel].trim();
                let name = body
                    .get(7..)
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string();
                self.out.push(Token::Doctype(name));
                self.pos = body_start + rel + 1;
            }
            None => self.pos = self.input.len(),
        }
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        let bytes = self.bytes();
        while self.pos < bytes.len() && is_name_byte(bytes[self.pos]) {
            self.pos += 1;
        }
        self.input[start..self.pos].to_ascii_lowercase()
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn skip_past_gt(&mut self) {
        match memchr(b'>', &self.bytes()[self.pos..]) {
            Some(rel) => self.pos += rel + 1,
            None => self.pos = self.input.len(),
        }
    }

    fn end_tag(&mut self) {
        self.pos += 2;
        let name = self.read_name();
        self.skip_past_gt();
        if !name.is_empty() {
            self.out.push(Token::EndTag(name));
        }
    }

    fn start_tag(&mut self) {
        self.pos += 1;
        let name = self.read_name();
        let (attributes, mut self_closing) = self.attributes();
        if is_void_element(&name) {
            self_closing = true;
        }

        let raw = if self_closing {
            None
        } else {
            raw_text_kind(&name)
        };
        self.out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });

        if let Some(decode) = raw {
            self.raw_text(&name, decode);
        }
    }

    fn attributes(&mut self) -> (Attributes, bool) {
        let mut attributes = Attributes::new();
        let len = self.input.len();
        loop {
            self.skip_whitespace();
            if self.pos >= len {
                return (attributes, false);
            }
            match self.bytes()[self.pos] {
                b'>' => {
                    self.pos += 1;
                    return (attributes, false);
                }
                b'/' if self.bytes().get(self.pos + 1) == Some(&b'>') => {
                    self.pos += 2;
                    return (attributes, true);
                }
                b if !is_name_byte(b) => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }

            let key = self.read_name();
            self.skip_whitespace();
            let value = if self.bytes().get(self.pos) == Some(&b'=') {
                self.pos += 1;
                self.skip_whitespace();
                Some(self.attribute_value())
            } else {
                None
            };
            // First occurrence wins, as in browsers.
            if !attributes.iter().any(|(k, _)| *k == key) {
                attributes.push((key, value));
            }
        }
    }

    fn attribute_value(&mut self) -> String {
        let bytes = self.bytes();
        let len = bytes.len();
        if self.pos < len && (bytes[self.pos] == b'"' || bytes[self.pos] == b'\'') {
            let quote = bytes[self.pos];
            let start = self.pos + 1;
            let end = memchr(quote, &bytes[start..])
                .map(|rel| start + rel)
                .unwrap_or(len);
            self.pos = (end + 1).min(len);
            return decode_entities(&self.input[start..end]);
        }

        let start = self.pos;
        while self.pos < len && !bytes[self.pos].is_ascii_whitespace() && bytes[self.pos] != b'>' {
            if bytes[self.pos] == b'/' && bytes.get(self.pos + 1) == Some(&b'>') {
                break;
            }
            self.pos += 1;
        }
        decode_entities(&self.input[start..self.pos])
    }

    fn raw_text(&mut self, name: &str, decode: bool) {
        let (content_end, resume) = match find_close_tag(self.rest(), name) {
            Some((rel_start, rel_end)) => (self.pos + rel_start, self.pos + rel_end),
            None => (self.input.len(), self.input.len()),
        };
        let raw = &self.input[self.pos..content_end];
        if !raw.is_empty() {
            let text = if decode {
                decode_entities(raw)
            } else {
                raw.to_string()
            };
            self.out.push(Token::Text(text));
        }
        self.out.push(Token::EndTag(name.to_string()));
        self.pos = resume;
    }
}

/// Find `</name` followed by optional whitespace and `>`, case-insensitively.
/// Returns (start of close tag, index just past `>`).
fn find_close_tag(haystack: &str, name: &str) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let name = name.as_bytes();
    let mut i = 0;
    while let Some(rel) = memchr(b'<', &bytes[i..]) {
        let at = i + rel;
        let name_start = at + 2;
        let name_end = name_start + name.len();
        if bytes.get(at + 1) == Some(&b'/')
            && bytes.len() >= name_end
            && bytes[name_start..name_end].eq_ignore_ascii_case(name)
        {
            let mut k = name_end;
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if bytes.get(k) == Some(&b'>') {
                return Some((at, k + 1));
            }
        }
        i = at + 1;
    }
    None
}
