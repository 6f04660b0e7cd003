//! Lightweight source scanning shared by the indexer, the rewriter and the config rules.
//!
//! Nothing here parses JavaScript. Bytes are classified as code, string literal or
//! comment, which is enough to match brackets, enumerate the top-level properties of
//! an object literal and strip comments before pattern matching. Template literal
//! substitutions and regex literals are not understood; they are treated as string
//! and code bytes respectively.

use log::trace;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Code,
    Str,
    Comment,
}

pub fn classify(src: &str) -> Vec<Class> {
    let bytes = src.as_bytes();
    let mut classes = vec![Class::Code; bytes.len()];
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = bytes[i..].iter().position(|&b| b == b'\n').map_or(bytes.len(), |p| i + p);
                classes[i..end].fill(Class::Comment);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = src[i + 2..].find("*/").map_or(bytes.len(), |p| i + 2 + p + 2);
                classes[i..end].fill(Class::Comment);
                i = end;
            }
            quote @ (b'"' | b'\'' | b'`') => {
                let mut j = i + 1;
                while j < bytes.len() {
                    match bytes[j] {
                        b'\\' => j += 1,
                        b'\n' if quote != b'`' => break,
                        b if b == quote => break,
                        _ => {}
                    }
                    j += 1;
                }
                let end = (j + 1).min(bytes.len());
                classes[i..end].fill(Class::Str);
                i = end;
            }
            _ => i += 1,
        }
    }

    classes
}

/// Replace comments with spaces, keeping newlines so byte offsets and line numbers hold.
pub fn strip_comments(src: &str) -> String {
    let classes = classify(src);
    let out: Vec<u8> = src
        .bytes()
        .zip(&classes)
        .map(|(b, c)| if *c == Class::Comment && b != b'\n' { b' ' } else { b })
        .collect();
    String::from_utf8_lossy(&out).into_owned()
}

/// Parse JSON that may carry comments and trailing commas, as tsconfig files do.
pub fn parse_jsonc(src: &str) -> serde_json::Result<serde_json::Value> {
    let stripped = strip_comments(src);
    let classes = classify(&stripped);
    let bytes = stripped.as_bytes();
    let mut out = bytes.to_vec();

    for (i, &b) in bytes.iter().enumerate() {
        if b != b',' || classes[i] != Class::Code {
            continue;
        }
        let next = bytes[i + 1..].iter().find(|c| !c.is_ascii_whitespace());
        if matches!(next, Some(b'}') | Some(b']')) {
            trace!("Dropping trailing comma at byte {}", i);
            out[i] = b' ';
        }
    }

    serde_json::from_slice(&out)
}

/// A top-level property of an object literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub key: String,
    /// The whole entry, from the key to the last significant byte before the separator
    pub entry: Range<usize>,
    /// The value after `:`, absent for shorthand, spread and method entries
    pub value: Option<Range<usize>>,
}

/// A classified view of one source text.
pub struct Scanner<'a> {
    src: &'a str,
    classes: Vec<Class>,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, classes: classify(src) }
    }

    pub fn is_code(&self, pos: usize) -> bool {
        self.classes.get(pos) == Some(&Class::Code)
    }

    fn is_significant(&self, pos: usize) -> bool {
        self.classes[pos] != Class::Comment && !self.src.as_bytes()[pos].is_ascii_whitespace()
    }

    /// Index of the bracket closing the one at `open`.
    pub fn matching_close(&self, open: usize) -> Option<usize> {
        let bytes = self.src.as_bytes();
        if !matches!(bytes.get(open), Some(b'{') | Some(b'[') | Some(b'(')) {
            return None;
        }
        let mut depth = 0usize;
        for (i, &b) in bytes.iter().enumerate().skip(open) {
            if self.classes[i] != Class::Code {
                continue;
            }
            match b {
                b'{' | b'[' | b'(' => depth += 1,
                b'}' | b']' | b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Top-level properties of the object literal whose `{` sits at `open`.
    pub fn object_properties(&self, open: usize) -> Option<Vec<Property>> {
        if self.src.as_bytes().get(open) != Some(&b'{') {
            return None;
        }
        let close = self.matching_close(open)?;
        let bytes = self.src.as_bytes();

        let mut segments = Vec::new();
        let mut depth = 0usize;
        let mut seg_start = open + 1;
        for i in open + 1..close {
            if self.classes[i] != Class::Code {
                continue;
            }
            match bytes[i] {
                b'{' | b'[' | b'(' => depth += 1,
                b'}' | b']' | b')' => depth = depth.saturating_sub(1),
                b',' if depth == 0 => {
                    segments.push(seg_start..i);
                    seg_start = i + 1;
                }
                _ => {}
            }
        }
        segments.push(seg_start..close);

        Some(segments.into_iter().filter_map(|seg| self.property_in(seg)).collect())
    }

    fn property_in(&self, seg: Range<usize>) -> Option<Property> {
        let start = seg.clone().find(|&i| self.is_significant(i))?;
        let end = seg.clone().rev().find(|&i| self.is_significant(i))? + 1;
        let bytes = self.src.as_bytes();

        let (key, key_end) = if self.classes[start] == Class::Str {
            let close = (start + 1..end).find(|&i| self.classes[i] != Class::Str).unwrap_or(end);
            (self.src[start + 1..close - 1].to_string(), close)
        } else {
            let len = bytes[start..end]
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_' || **b == b'$')
                .count();
            if len == 0 {
                // spread or computed key
                return Some(Property {
                    key: String::new(),
                    entry: start..end,
                    value: None,
                });
            }
            (self.src[start..start + len].to_string(), start + len)
        };

        let colon = (key_end..end).find(|&i| self.is_significant(i));
        let value = match colon {
            Some(c) if bytes[c] == b':' && self.classes[c] == Class::Code => {
                let value_start = (c + 1..end).find(|&i| self.is_significant(i)).unwrap_or(end);
                Some(value_start..end)
            }
            _ => None,
        };

        Some(Property { key, entry: start..end, value })
    }

    pub fn property(&self, open: usize, key: &str) -> Option<Property> {
        self.object_properties(open)?.into_iter().find(|p| p.key == key)
    }

    /// Leading whitespace of the line containing `pos`.
    pub fn indent_at(&self, pos: usize) -> &'a str {
        let line_start = self.src[..pos].rfind('\n').map_or(0, |p| p + 1);
        let rest = &self.src[line_start..];
        let len = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        &rest[..len]
    }
}
