use log::{debug, trace};
use serde_json::{Map, Value, json};
use std::path::Path;
use testshape_core::{INTERNAL_ALIAS, Result};

use crate::{
    constants::{
        BROWSER_TSCONFIG_EXCLUDE, BROWSER_TSCONFIG_INCLUDE, LEGACY_INTERNAL_KEY, NODE_TSCONFIG_EXCLUDE,
        NODE_TSCONFIG_EXTENDS, NODE_TSCONFIG_INCLUDE, NODE_TSCONFIG_LIB,
    },
    json::{object_entry, parse, render, root_object, set_if_different, string_array},
    rule::{ConfigRule, FileKind, Plan, RuleContext},
};

fn internal_key() -> String {
    format!("{}/*", INTERNAL_ALIAS)
}

/// `compilerOptions.paths` mapping the public name, its subpaths and the internal
/// alias onto the source tree, relative to `test/browser/`.
fn browser_paths(name: &str) -> Map<String, Value> {
    let mut paths = Map::new();
    paths.insert(name.to_string(), json!(["../../src/index.ts"]));
    paths.insert(format!("{}/*", name), json!(["../../src/*"]));
    paths.insert(internal_key(), json!(["../../src/*"]));
    paths
}

pub fn browser_tsconfig_template(name: &str) -> Value {
    json!({
        "compilerOptions": {
            "outDir": "./dist",
            "paths": browser_paths(name),
        },
        "include": string_array(BROWSER_TSCONFIG_INCLUDE),
        "exclude": string_array(BROWSER_TSCONFIG_EXCLUDE),
    })
}

/// `test/browser/tsconfig.json`: regenerated from the template whenever it differs.
pub struct BrowserTypecheckConfig;

impl ConfigRule for BrowserTypecheckConfig {
    fn name(&self) -> &'static str {
        "browser-typecheck-config"
    }

    fn kind(&self) -> FileKind {
        FileKind::BrowserTypecheckConfig
    }

    fn plan(&self, ctx: &RuleContext, path: &Path, current: Option<&str>) -> Result<Plan> {
        let Some(text) = current else {
            return Ok(Plan::Absent);
        };
        let template = browser_tsconfig_template(&ctx.project.name);
        // an unparseable file is simply not compliant; it gets regenerated like any other
        if parse(path, text).is_ok_and(|v| v == template) {
            return Ok(Plan::Compliant);
        }
        Ok(Plan::Write(render(path, &template)?))
    }
}

fn node_required_paths(name: &str) -> [(String, Value); 2] {
    [(name.to_string(), json!(["../src/index.ts"])), (internal_key(), json!(["../src/*"]))]
}

pub fn node_tsconfig_template(name: &str) -> Value {
    let paths: Map<String, Value> = node_required_paths(name).into_iter().collect();
    json!({
        "extends": NODE_TSCONFIG_EXTENDS,
        "compilerOptions": {
            "skipLibCheck": true,
            "lib": string_array(NODE_TSCONFIG_LIB),
            "paths": paths,
        },
        "include": string_array(NODE_TSCONFIG_INCLUDE),
        "exclude": string_array(NODE_TSCONFIG_EXCLUDE),
    })
}

/// Brings an existing node test tsconfig in line without dropping unrelated fields.
pub fn reconcile_node_tsconfig(config: &mut Map<String, Value>, name: &str) {
    set_if_different(config, "extends", json!(NODE_TSCONFIG_EXTENDS));

    let options = object_entry(config, "compilerOptions");
    set_if_different(options, "skipLibCheck", json!(true));

    let paths = object_entry(options, "paths");
    if let Some(legacy) = paths.shift_remove(LEGACY_INTERNAL_KEY) {
        trace!("Migrating legacy '{}' path mapping", LEGACY_INTERNAL_KEY);
        paths.entry(internal_key()).or_insert(legacy);
    }
    for (key, value) in node_required_paths(name) {
        set_if_different(paths, &key, value);
    }

    set_if_different(options, "lib", string_array(NODE_TSCONFIG_LIB));

    if !config.contains_key("include") {
        config.insert("include".to_string(), string_array(NODE_TSCONFIG_INCLUDE));
    }
    if !config.contains_key("exclude") {
        config.insert("exclude".to_string(), string_array(NODE_TSCONFIG_EXCLUDE));
    }
}

/// `test/tsconfig.json`: created when missing, reconciled field by field otherwise.
pub struct NodeTypecheckConfig;

impl ConfigRule for NodeTypecheckConfig {
    fn name(&self) -> &'static str {
        "node-typecheck-config"
    }

    fn kind(&self) -> FileKind {
        FileKind::NodeTypecheckConfig
    }

    fn plan(&self, ctx: &RuleContext, path: &Path, current: Option<&str>) -> Result<Plan> {
        let Some(text) = current else {
            debug!("Creating {}", path.display());
            return Ok(Plan::Write(render(path, &node_tsconfig_template(&ctx.project.name))?));
        };

        let original = parse(path, text)?;
        let mut next = original.clone();
        reconcile_node_tsconfig(root_object(path, &mut next)?, &ctx.project.name);
        if next == original {
            return Ok(Plan::Compliant);
        }
        Ok(Plan::Write(render(path, &next)?))
    }
}
