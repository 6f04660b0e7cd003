//! Import rewriting for test sources.
//!
//! Recognized grammars, matched on code bytes only:
//!
//! - `import [type] <clause> from "<path>"` (static)
//! - `import "<path>"` (static, side effect)
//! - `import("<path>")` (dynamic)
//! - `require("<path>")` (treated as dynamic, its bindings are not visible)
//!
//! Computed paths (template literals, variables) are never matched and stay as written.

use log::{debug, trace};
use path_clean::clean;
use regex::Regex;
use std::{
    fs,
    ops::Range,
    path::{Component, Path},
    sync::LazyLock,
};

use crate::{
    constants::{CANONICAL_EXTENSION, ENTRY_MODULE, INTERNAL_ALIAS, JS_TS_EXTENSIONS},
    error::{MigrateError, Result},
    gate::FsGate,
    scan::{Scanner, strip_comments},
    types::{ExportSet, ImportBinding, ImportClause, ImportForm, ImportKind, ImportStatement},
};

static STATIC_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\bimport\s+(?:type\s+)?([\w$]+\s*,\s*\{[^}]*\}|[\w$]+\s*,\s*\*\s*as\s+[\w$]+|\{[^}]*\}|\*\s*as\s+[\w$]+|[\w$]+)\s*from\s*["']([^"'\n]+)["']"#,
    )
    .unwrap()
});

static SIDE_EFFECT_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bimport\s*["']([^"'\n]+)["']"#).unwrap());

static DYNAMIC_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bimport\s*\(\s*["']([^"'\n]+)["']\s*[,)]"#).unwrap());

static REQUIRE_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\brequire\s*\(\s*["']([^"'\n]+)["']\s*\)"#).unwrap());

/// What the rewriter needs to know about the project owning a test file.
pub struct RewriteContext<'a> {
    pub project_name: &'a str,
    /// Absolute path of the project's `src` directory
    pub source_dir: &'a Path,
    pub exports: &'a ExportSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportChange {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRewrite {
    pub text: String,
    pub changes: Vec<ImportChange>,
}

/// Finds every recognized import expression, in source order.
pub fn scan_imports(src: &str) -> Vec<ImportStatement> {
    let scanner = Scanner::new(src);
    // offsets are preserved, so matches index `src` directly and none can start in a comment
    let code = strip_comments(src);
    let mut found = Vec::new();

    let mut collect = |re: &Regex, path_group: usize, kind: ImportKind, with_clause: bool| {
        for caps in re.captures_iter(&code) {
            let (Some(whole), Some(target)) = (caps.get(0), caps.get(path_group)) else {
                continue;
            };
            if !scanner.is_code(whole.start()) || scanner.is_code(target.start()) {
                trace!("Ignoring match in comment or string at byte {}", whole.start());
                continue;
            }
            let clause = if with_clause { Some(parse_clause(&caps[1])) } else { None };
            found.push(ImportStatement {
                kind,
                clause,
                target: target.as_str().to_string(),
                target_span: target.range(),
            });
        }
    };

    collect(&*STATIC_IMPORT, 2, ImportKind::Static, true);
    collect(&*SIDE_EFFECT_IMPORT, 1, ImportKind::Static, false);
    collect(&*DYNAMIC_IMPORT, 1, ImportKind::Dynamic, false);
    collect(&*REQUIRE_CALL, 1, ImportKind::Dynamic, false);

    for stmt in found.iter_mut().filter(|s| s.kind == ImportKind::Static && s.clause.is_none()) {
        stmt.clause = Some(ImportClause::SideEffect);
    }
    found.sort_by_key(|s| s.target_span.start);
    found
}

fn parse_clause(clause: &str) -> ImportClause {
    let clause = clause.trim();
    if let Some(ns) = clause.split_once('*').map(|(_, rest)| rest) {
        let name = ns.trim().trim_start_matches("as").trim();
        return ImportClause::Namespace(name.to_string());
    }
    match clause.split_once('{') {
        Some((default, named)) => {
            let bindings = parse_bindings(named.trim_end_matches('}'));
            let default = default.trim().trim_end_matches(',').trim();
            if default.is_empty() {
                ImportClause::Named(bindings)
            } else {
                ImportClause::DefaultAndNamed(default.to_string(), bindings)
            }
        }
        None => ImportClause::Default(clause.to_string()),
    }
}

fn parse_bindings(list: &str) -> Vec<ImportBinding> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let entry = entry.strip_prefix("type ").map(str::trim_start).unwrap_or(entry);
            let (imported, local) = match entry.split_once(" as ") {
                Some((imported, local)) => (imported.trim(), local.trim()),
                None => (entry, entry),
            };
            ImportBinding {
                imported: imported.trim_matches(|c| c == '"' || c == '\'').to_string(),
                local: local.to_string(),
            }
        })
        .collect()
}

impl RewriteContext<'_> {
    /// Module path under `src` that `target` refers to, `/`-separated, or `None` when
    /// the target is the public name, an external package or a path outside `src`.
    pub fn module_path(&self, file_dir: &Path, target: &str) -> Option<String> {
        if target == INTERNAL_ALIAS {
            return Some(String::new());
        }
        if let Some(rest) = target.strip_prefix(INTERNAL_ALIAS).and_then(|r| r.strip_prefix('/')) {
            let cleaned = clean(rest);
            if cleaned.components().any(|c| c == Component::ParentDir) {
                return None;
            }
            return Some(join_components(&cleaned));
        }
        if target.starts_with("./") || target.starts_with("../") || target == "." || target == ".." {
            let resolved = clean(file_dir.join(target));
            let rel = resolved.strip_prefix(clean(self.source_dir)).ok()?;
            return Some(join_components(rel));
        }
        None
    }
}

fn join_components(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(p) => Some(p.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Strips one trailing recognized module extension.
pub fn strip_module_extension(module: &str) -> &str {
    if let Some((stem, ext)) = module.rsplit_once('.')
        && !ext.contains('/')
        && JS_TS_EXTENSIONS.contains(&ext)
    {
        return stem;
    }
    module
}

/// A module whose last segment carries an extension that is not a module extension.
fn is_asset(module: &str) -> bool {
    let last = module.rsplit('/').next().unwrap_or(module);
    last.contains('.') && strip_module_extension(module) == module
}

/// Picks the canonical form for an import of `module` (a path under `src`).
pub fn choose_form(stmt: &ImportStatement, module: &str, exports: &ExportSet) -> ImportForm {
    let stem = strip_module_extension(module);
    if stem.is_empty() || stem == ENTRY_MODULE {
        return ImportForm::Public;
    }

    let exported = |name: &str| exports.contains(name);
    let public = match (stmt.kind, &stmt.clause) {
        (ImportKind::Static, Some(ImportClause::Named(bindings))) => {
            bindings.iter().any(|b| exported(&b.imported))
        }
        (ImportKind::Static, Some(ImportClause::Default(name))) => exported(name),
        (ImportKind::Static, Some(ImportClause::DefaultAndNamed(name, bindings))) => {
            exported(name) || bindings.iter().any(|b| exported(&b.imported))
        }
        // namespace and side-effect imports bind nothing checkable, dynamic ones are
        // not enumerable at the call site
        _ => false,
    };

    if public {
        ImportForm::Public
    } else {
        ImportForm::Internal(format!("{}/{}.{}", INTERNAL_ALIAS, stem, CANONICAL_EXTENSION))
    }
}

/// Rewrites a test file's imports. Returns `None` when nothing changes.
pub fn rewrite_source(ctx: &RewriteContext, file: &Path, src: &str) -> Option<FileRewrite> {
    let file_dir = file.parent().unwrap_or(Path::new(""));
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();
    let mut changes = Vec::new();

    for stmt in scan_imports(src) {
        let Some(module) = ctx.module_path(file_dir, &stmt.target) else {
            continue;
        };
        if is_asset(&module) {
            trace!("Leaving asset import '{}' as written", stmt.target);
            continue;
        }
        let replacement = match choose_form(&stmt, &module, ctx.exports) {
            ImportForm::Public => ctx.project_name.to_string(),
            ImportForm::Internal(path) => path,
        };
        if replacement == stmt.target {
            continue;
        }
        trace!("Rewriting '{}' -> '{}' in {}", stmt.target, replacement, file.display());
        changes.push(ImportChange { from: stmt.target.clone(), to: replacement.clone() });
        edits.push((stmt.target_span, replacement));
    }

    if edits.is_empty() {
        return None;
    }

    let mut text = src.to_string();
    for (span, replacement) in edits.into_iter().rev() {
        text.replace_range(span, &replacement);
    }
    Some(FileRewrite { text, changes })
}

/// Reads, rewrites and (through the gate) writes back one test file.
pub fn rewrite_file(
    ctx: &RewriteContext,
    file: &Path,
    gate: &mut FsGate,
) -> Result<Option<FileRewrite>> {
    let src = fs::read_to_string(file).map_err(|e| MigrateError::io(file, e))?;
    let Some(rewrite) = rewrite_source(ctx, file, &src) else {
        trace!("No imports to rewrite in {}", file.display());
        return Ok(None);
    };
    debug!("Rewrote {} imports in {}", rewrite.changes.len(), file.display());
    gate.write(file, &rewrite.text)?;
    Ok(Some(rewrite))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Mode;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn exports(names: &[&str]) -> ExportSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn rewrite(exports: &ExportSet, file: &str, src: &str) -> String {
        let source_dir = PathBuf::from("/ws/pkg-a/src");
        let ctx = RewriteContext { project_name: "pkgA", source_dir: &source_dir, exports };
        rewrite_source(&ctx, Path::new(file), src).map(|r| r.text).unwrap_or_else(|| src.to_string())
    }

    const TEST_FILE: &str = "/ws/pkg-a/test/a.test.ts";

    #[test]
    fn test_scan_recognizes_all_forms() {
        let src = r#"import { A, B as C } from "../src/a";
import D from '../src/d';
import * as ns from "../src/ns";
import E, { F } from "../src/ef";
import "../src/side";
const lazy = await import("../src/lazy");
const cjs = require("../src/cjs");
"#;
        let found = scan_imports(src);
        let targets: Vec<&str> = found.iter().map(|s| s.target.as_str()).collect();
        assert_eq!(
            targets,
            vec!["../src/a", "../src/d", "../src/ns", "../src/ef", "../src/side", "../src/lazy", "../src/cjs"]
        );
        assert_eq!(
            found[0].clause,
            Some(ImportClause::Named(vec![
                ImportBinding { imported: "A".into(), local: "A".into() },
                ImportBinding { imported: "B".into(), local: "C".into() },
            ]))
        );
        assert_eq!(found[1].clause, Some(ImportClause::Default("D".into())));
        assert_eq!(found[2].clause, Some(ImportClause::Namespace("ns".into())));
        assert!(matches!(found[3].clause, Some(ImportClause::DefaultAndNamed(ref d, _)) if d == "E"));
        assert_eq!(found[4].clause, Some(ImportClause::SideEffect));
        assert_eq!(found[5].kind, ImportKind::Dynamic);
        assert_eq!(found[6].kind, ImportKind::Dynamic);
    }

    #[test]
    fn test_scan_ignores_comments_and_strings() {
        let src = "// import { A } from \"../src/a\";\nconst s = \"import('../src/b')\";\n";
        assert!(scan_imports(src).is_empty());
    }

    #[test]
    fn test_unclosed_clause_in_comment_does_not_hide_next_import() {
        let src = "/* helpers are pulled in with import {\n */\nimport { helper } from \"../src/util\";\n";
        let found = scan_imports(src);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].target, "../src/util");

        let out = rewrite(&exports(&["Foo"]), TEST_FILE, src);
        assert!(out.ends_with("import { helper } from \"$internal/util.js\";\n"));
    }

    #[test]
    fn test_exported_named_import_goes_public() {
        let set = exports(&["A", "B"]);
        let out = rewrite(&set, TEST_FILE, "import { A } from \"../src/util\";");
        assert_eq!(out, "import { A } from \"pkgA\";");
    }

    #[test]
    fn test_unexported_named_import_goes_internal() {
        let set = exports(&["A", "B"]);
        let out = rewrite(&set, TEST_FILE, "import { C } from \"../src/util.ts\";");
        assert_eq!(out, "import { C } from \"$internal/util.js\";");
    }

    #[test]
    fn test_local_alias_resolves_to_source_name() {
        let set = exports(&["A"]);
        let out = rewrite(&set, TEST_FILE, "import { A as Renamed } from '../src/a';");
        assert_eq!(out, "import { A as Renamed } from 'pkgA';");
    }

    #[test]
    fn test_one_exported_symbol_is_enough() {
        let set = exports(&["A"]);
        let out = rewrite(&set, TEST_FILE, "import { A, hidden } from '../src/a';");
        assert_eq!(out, "import { A, hidden } from 'pkgA';");
    }

    #[test]
    fn test_default_import_checks_bound_name() {
        let set = exports(&["Widget"]);
        let src = "import Widget from '../src/widget';\nimport Other from '../src/other';";
        let out = rewrite(&set, TEST_FILE, src);
        assert_eq!(out, "import Widget from 'pkgA';\nimport Other from '$internal/other.js';");
    }

    #[test]
    fn test_dynamic_import_always_internal() {
        let set = exports(&["lazy", "A"]);
        let out = rewrite(&set, TEST_FILE, "const m = await import(\"../src/lazy\");");
        assert_eq!(out, "const m = await import(\"$internal/lazy.js\");");
    }

    #[test]
    fn test_index_import_always_public() {
        let set = ExportSet::new();
        let src = "import { Nothing } from \"../src/index\";\nconst m = import('../src/index.js');\nimport * as all from '../src';\nimport x from '$internal/index.js';";
        let out = rewrite(&set, TEST_FILE, src);
        assert_eq!(
            out,
            "import { Nothing } from \"pkgA\";\nconst m = import('pkgA');\nimport * as all from 'pkgA';\nimport x from 'pkgA';"
        );
    }

    #[test]
    fn test_namespace_and_side_effect_go_internal() {
        let set = exports(&["ns"]);
        let src = "import * as ns from '../src/ns';\nimport '../src/setup.mjs';";
        let out = rewrite(&set, TEST_FILE, src);
        assert_eq!(out, "import * as ns from '$internal/ns.js';\nimport '$internal/setup.js';");
    }

    #[test]
    fn test_nested_test_file_and_subdirectories() {
        let set = ExportSet::new();
        let out = rewrite(&set, "/ws/pkg-a/test/unit/deep/x.test.ts", "import { y } from '../../../src/lib/y';");
        assert_eq!(out, "import { y } from '$internal/lib/y.js';");
    }

    #[test]
    fn test_internal_alias_is_normalized() {
        let set = exports(&["A"]);
        let src = "import { helper } from '$internal/util';\nimport { A } from '$internal/a.ts';";
        let out = rewrite(&set, TEST_FILE, src);
        assert_eq!(out, "import { helper } from '$internal/util.js';\nimport { A } from 'pkgA';");
    }

    #[test]
    fn test_unrelated_targets_untouched() {
        let set = exports(&["A"]);
        let src = "import { A } from 'pkgA';\nimport { expect } from 'vitest';\nimport { fixture } from './fixtures/data';\nimport x from '../../other/src/x';";
        let ctx_src = PathBuf::from("/ws/pkg-a/src");
        let ctx = RewriteContext { project_name: "pkgA", source_dir: &ctx_src, exports: &set };
        assert!(rewrite_source(&ctx, Path::new(TEST_FILE), src).is_none());
    }

    #[test]
    fn test_asset_imports_untouched() {
        let set = ExportSet::new();
        let src = "import data from '../src/fixtures/data.json';";
        assert_eq!(rewrite(&set, TEST_FILE, src), src);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let set = exports(&["Foo"]);
        let src = "import { Foo } from '../src/foo';\nimport { bar } from '../src/bar';\nimport('../src/lazy');";
        let once = rewrite(&set, TEST_FILE, src);
        let twice = rewrite(&set, TEST_FILE, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_strip_module_extension() {
        assert_eq!(strip_module_extension("util.ts"), "util");
        assert_eq!(strip_module_extension("util.js"), "util");
        assert_eq!(strip_module_extension("data.json"), "data.json");
        assert_eq!(strip_module_extension("dir.v2/util"), "dir.v2/util");
        assert_eq!(strip_module_extension("index"), "index");
    }

    #[test]
    fn test_rewrite_file_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let source_dir = root.join("pkg-a/src");
        let test_dir = root.join("pkg-a/test");
        fs::create_dir_all(&test_dir).unwrap();

        let files = [
            ("index.test.ts", "import { Foo } from \"../src/index\";\n", "import { Foo } from \"pkgA\";\n"),
            ("util.test.ts", "import { helper } from \"../src/util\";\n", "import { helper } from \"$internal/util.js\";\n"),
            ("lazy.test.ts", "await import(\"../src/lazy\");\n", "await import(\"$internal/lazy.js\");\n"),
        ];

        let set = exports(&["Foo"]);
        let ctx = RewriteContext { project_name: "pkgA", source_dir: &source_dir, exports: &set };
        let mut gate = FsGate::new(Mode::Apply);

        for (name, before, after) in files {
            let path = test_dir.join(name);
            fs::write(&path, before).unwrap();
            let rewrite = rewrite_file(&ctx, &path, &mut gate).unwrap();
            assert!(rewrite.is_some());
            assert_eq!(fs::read_to_string(&path).unwrap(), after);
        }
        assert_eq!(gate.records().len(), 3);
    }

    #[test]
    fn test_rewrite_file_unchanged_is_not_written() {
        let temp_dir = TempDir::new().unwrap();
        let source_dir = temp_dir.path().join("src");
        let path = temp_dir.path().join("clean.test.ts");
        fs::write(&path, "import { describe } from 'vitest';\n").unwrap();

        let set = ExportSet::new();
        let ctx = RewriteContext { project_name: "pkgA", source_dir: &source_dir, exports: &set };
        let mut gate = FsGate::new(Mode::Apply);
        assert!(rewrite_file(&ctx, &path, &mut gate).unwrap().is_none());
        assert!(gate.records().is_empty());
    }
}
