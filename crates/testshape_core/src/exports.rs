use log::{debug, trace};
use regex::Regex;
use std::{fs, io::ErrorKind, path::Path, sync::LazyLock};

use crate::{
    error::{MigrateError, Result},
    scan::strip_comments,
    types::ExportSet,
};

/// `export { A, B as C }` and `export type { … }`, with or without a `from` clause.
static EXPORT_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bexport\s+(?:type\s+)?\{([^}]*)\}").unwrap());

/// `export [default] [declare] [abstract] [async] <keyword> Name`
static EXPORT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bexport\s+(?:default\s+)?(?:declare\s+)?(?:abstract\s+)?(?:async\s+)?(?:function\s*\*\s*|(?:const\s+enum|class|interface|function|const|let|var|type|enum|namespace|module)\s+)([A-Za-z_$][\w$]*)",
    )
    .unwrap()
});

/// `export * as ns from "…"`
static EXPORT_STAR_AS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bexport\s+(?:type\s+)?\*\s*as\s+([A-Za-z_$][\w$]*)\s+from\b").unwrap()
});

/// `export * from "…"`, recognized only to be reported
static EXPORT_STAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bexport\s+(?:type\s+)?\*\s*from\s*["']([^"']+)["']"#).unwrap()
});

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][\w$]*$").unwrap());

/// Reads the entry point and indexes its exports. A missing file yields an empty set.
pub fn exports_for(entry: &Path) -> Result<ExportSet> {
    let src = match fs::read_to_string(entry) {
        Ok(src) => src,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No entry point at {}, export set is empty", entry.display());
            return Ok(ExportSet::new());
        }
        Err(e) => return Err(MigrateError::io(entry, e)),
    };
    let exports = exports_from_source(&src);
    debug!("Indexed {} exports from {}", exports.len(), entry.display());
    Ok(exports)
}

/// Collects the names an entry-point source is known to export.
///
/// Wildcard re-exports (`export * from`) contribute nothing: their names cannot be
/// known without reading the target module, and any import that relies on them is
/// routed through the internal alias instead.
pub fn exports_from_source(src: &str) -> ExportSet {
    let src = strip_comments(src);
    let mut exports = ExportSet::new();

    for caps in EXPORT_LIST.captures_iter(&src) {
        for entry in caps[1].split(',') {
            if let Some(name) = exported_name(entry) {
                trace!("Found listed export '{}'", name);
                exports.insert(name);
            }
        }
    }

    for caps in EXPORT_DECL.captures_iter(&src) {
        trace!("Found declaration export '{}'", &caps[1]);
        exports.insert(caps[1].to_string());
    }

    for caps in EXPORT_STAR_AS.captures_iter(&src) {
        trace!("Found namespace re-export '{}'", &caps[1]);
        exports.insert(caps[1].to_string());
    }

    let wildcards = EXPORT_STAR.captures_iter(&src).count();
    if wildcards > 0 {
        debug!("Skipped {} wildcard re-exports", wildcards);
    }

    exports
}

/// The public name of one export-list entry: `B as C` is known as `C`.
fn exported_name(entry: &str) -> Option<String> {
    let entry = entry.trim();
    let entry = entry.strip_prefix("type ").map(str::trim_start).unwrap_or(entry);
    let name = match entry.split_once(" as ") {
        Some((_, alias)) => alias.trim(),
        None => entry,
    };
    let name = name.trim_matches(|c| c == '"' || c == '\'');
    IDENTIFIER.is_match(name).then(|| name.to_string())
}
