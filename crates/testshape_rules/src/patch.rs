//! Surgical edits to JS/TS config modules.
//!
//! Each helper returns the input unchanged when its target is already in place, so
//! chains of them are idempotent as long as the canonical values are fixed strings.
//! Patterns are matched against the comment-stripped text, whose offsets equal the
//! original's.

use log::trace;
use regex::Regex;
use std::sync::LazyLock;
use testshape_core::scan::{Scanner, strip_comments};

/// `defineConfig({` or `export default {`
static CONFIG_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:defineConfig\s*\(|export\s+default)\s*\{").unwrap());

static IMPORT_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\b[^;]*?["'][^"'\n]*["'][ \t]*;?"#).unwrap()
});

/// Position of the `{` opening the exported config object.
pub(crate) fn find_config_object(text: &str) -> Option<usize> {
    let code = strip_comments(text);
    let scanner = Scanner::new(text);
    CONFIG_OBJECT.find_iter(&code).find(|m| scanner.is_code(m.start())).map(|m| m.end() - 1)
}

/// Position of the `{` opening the config object's `test: { … }` options block.
pub(crate) fn find_test_block(text: &str) -> Option<usize> {
    let open = find_config_object(text)?;
    let value = Scanner::new(text).property(open, "test")?.value?;
    (text.as_bytes().get(value.start) == Some(&b'{')).then_some(value.start)
}

/// End of the last top-level import statement, or 0 when there is none.
fn imports_end(text: &str) -> usize {
    let code = strip_comments(text);
    let scanner = Scanner::new(text);
    IMPORT_STATEMENT
        .find_iter(&code)
        .filter(|m| scanner.is_code(m.as_str().len() - m.as_str().trim_start().len() + m.start()))
        .last()
        .map_or(0, |m| m.end())
}

/// Inserts `snippet` on its own line after the imports (or at the top).
pub(crate) fn insert_after_imports(text: &str, snippet: &str) -> String {
    let pos = imports_end(text);
    if pos == 0 {
        format!("{}\n{}", snippet.trim_start_matches('\n'), text)
    } else {
        format!("{}\n{}{}", &text[..pos], snippet, &text[pos..])
    }
}

/// Adds `line` unless some import already binds `binding`.
pub(crate) fn ensure_import(text: &str, binding: &str, line: &str) -> String {
    let pattern = format!(
        r"\bimport\s*(?:type\s+)?(?:[\w$]+\s*,\s*)?\{{[^}}]*\b{}\b[^}}]*\}}\s*from",
        regex::escape(binding)
    );
    let Ok(re) = Regex::new(&pattern) else {
        return text.to_string();
    };
    let code = strip_comments(text);
    let scanner = Scanner::new(text);
    if re.find_iter(&code).any(|m| scanner.is_code(m.start())) {
        return text.to_string();
    }
    trace!("Adding import of '{}'", binding);
    insert_after_imports(text, line)
}

/// Sets `key: value` in the object literal opening at `open`.
///
/// An existing entry has its value replaced and a shorthand entry is expanded. A
/// missing key goes right after the last present key of `after` (the keys that
/// precede it in canonical order), or first when none of them is present.
pub(crate) fn ensure_property(
    text: &str,
    open: usize,
    key: &str,
    value: &str,
    after: &[&str],
) -> String {
    let scanner = Scanner::new(text);
    let Some(props) = scanner.object_properties(open) else {
        return text.to_string();
    };

    if let Some(prop) = props.iter().find(|p| p.key == key) {
        return match &prop.value {
            Some(range) if &text[range.clone()] == value => text.to_string(),
            Some(range) => {
                trace!("Replacing '{}' value '{}'", key, &text[range.clone()]);
                splice(text, range.start, range.end, value)
            }
            None => splice(text, prop.entry.start, prop.entry.end, &format!("{}: {}", key, value)),
        };
    }

    trace!("Inserting '{}'", key);
    let block_indent = scanner.indent_at(open);
    let indent = match props.first() {
        Some(first) if text[open..first.entry.start].contains('\n') => {
            scanner.indent_at(first.entry.start).to_string()
        }
        _ => format!("{}  ", block_indent),
    };
    let close = scanner.matching_close(open).unwrap_or(open + 1);

    if props.is_empty() {
        // rebuild the empty body so the closing brace lands on its own line
        let body = format!("\n{}{}: {},\n{}", indent, key, value, block_indent);
        return splice(text, open + 1, close, &body);
    }

    let Some(anchor) = props.iter().filter(|p| after.contains(&p.key.as_str())).last() else {
        return splice(text, open + 1, open + 1, &format!("\n{}{}: {},", indent, key, value));
    };
    let bytes = text.as_bytes();
    match (anchor.entry.end..close).find(|&i| bytes[i] == b',' && scanner.is_code(i)) {
        Some(comma) => splice(text, comma + 1, comma + 1, &format!("\n{}{}: {},", indent, key, value)),
        // the anchor is the last entry and has no trailing comma
        None => splice(
            text,
            anchor.entry.end,
            anchor.entry.end,
            &format!(",\n{}{}: {}", indent, key, value),
        ),
    }
}

/// Ensures `key` holds an object literal whose `flag` is `false`.
pub(crate) fn ensure_disabled(
    text: &str,
    open: usize,
    key: &str,
    flag: &str,
    canonical: &str,
    after: &[&str],
) -> String {
    let scanner = Scanner::new(text);
    let Some(prop) = scanner.property(open, key) else {
        return ensure_property(text, open, key, canonical, after);
    };
    match prop.value {
        Some(range) if text.as_bytes().get(range.start) == Some(&b'{') => {
            ensure_property(text, range.start, flag, "false", &[])
        }
        _ => ensure_property(text, open, key, canonical, after),
    }
}

fn splice(text: &str, start: usize, end: usize, with: &str) -> String {
    let mut out = String::with_capacity(text.len() + with.len());
    out.push_str(&text[..start]);
    out.push_str(with);
    out.push_str(&text[end..]);
    out
}
