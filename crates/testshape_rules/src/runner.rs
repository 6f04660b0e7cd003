use log::debug;
use regex::Regex;
use std::{path::Path, sync::LazyLock};
use testshape_core::{
    MigrateError, Result,
    scan::{Scanner, strip_comments},
};

use crate::{
    constants::{
        BROWSER_ALIAS_HELPER, BROWSER_ALIAS_VALUE, BROWSER_INCLUDE_VALUE, DIRNAME_BINDING,
        NODE_ALIAS_HELPER, NODE_ALIAS_VALUE, TIMEOUT_VALUE, TYPECHECK_VALUE, URL_IMPORT,
    },
    patch::{
        ensure_disabled, ensure_import, ensure_property, find_config_object, find_test_block,
        insert_after_imports,
    },
    rule::{ConfigRule, FileKind, Plan, RuleContext, write_if_changed},
};

static DIRNAME_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:const|let|var)\s+dirname\s*=").unwrap());

fn helper_import(helper: &str, module: &str) -> String {
    format!("import {{ {} }} from \"{}\";", helper, module)
}

/// The node test-runner config as a fresh file.
pub fn node_runner_template(ctx: &RuleContext) -> String {
    format!(
        r#"{url_import}
import {{ defineConfig }} from "vitest/config";
{helper_import}

{dirname}

export default defineConfig({{
  test: {{
    alias: {alias},
    hookTimeout: {timeout},
    testTimeout: {timeout},
    typecheck: {typecheck},
  }},
}});
"#,
        url_import = URL_IMPORT,
        helper_import = helper_import(NODE_ALIAS_HELPER, &ctx.helper_module()),
        dirname = DIRNAME_BINDING,
        alias = NODE_ALIAS_VALUE,
        timeout = TIMEOUT_VALUE,
        typecheck = TYPECHECK_VALUE,
    )
}

/// Keys of the node `test` block, in template order.
const NODE_TEST_KEYS: [&str; 4] = ["alias", "hookTimeout", "testTimeout", "typecheck"];

/// Keys the browser `test` block must carry, in the order they are placed.
const BROWSER_TEST_KEYS: [&str; 4] = ["alias", "include", "hookTimeout", "testTimeout"];

/// `vitest.config.ts`: a legacy file whose config object is empty is replaced, anything
/// else is patched in place.
pub struct NodeRunnerConfig;

impl NodeRunnerConfig {
    fn patch(&self, ctx: &RuleContext, path: &Path, text: &str) -> Result<String> {
        let mut text = ensure_import(
            text,
            NODE_ALIAS_HELPER,
            &helper_import(NODE_ALIAS_HELPER, &ctx.helper_module()),
        );
        text = ensure_import(&text, "fileURLToPath", URL_IMPORT);

        let code = strip_comments(&text);
        let scanner = Scanner::new(&text);
        let has_dirname = DIRNAME_DECL.find_iter(&code).any(|m| scanner.is_code(m.start()));
        if !has_dirname {
            text = insert_after_imports(&text, &format!("\n{}", DIRNAME_BINDING));
        }

        for (i, (key, value)) in NODE_TEST_KEYS
            .iter()
            .zip([NODE_ALIAS_VALUE, TIMEOUT_VALUE, TIMEOUT_VALUE, TYPECHECK_VALUE])
            .enumerate()
        {
            let open = test_block(&text, path)?;
            let after = &NODE_TEST_KEYS[..i];
            text = if *key == "typecheck" {
                ensure_disabled(&text, open, key, "enabled", value, after)
            } else {
                ensure_property(&text, open, key, value, after)
            };
        }
        Ok(text)
    }
}

fn test_block(text: &str, path: &Path) -> Result<usize> {
    find_test_block(text).ok_or_else(|| MigrateError::shape(path, "no `test` options block"))
}

impl ConfigRule for NodeRunnerConfig {
    fn name(&self) -> &'static str {
        "node-runner-config"
    }

    fn kind(&self) -> FileKind {
        FileKind::NodeRunnerConfig
    }

    fn plan(&self, ctx: &RuleContext, path: &Path, current: Option<&str>) -> Result<Plan> {
        let Some(text) = current else {
            return Ok(Plan::Absent);
        };
        let open = find_config_object(text)
            .ok_or_else(|| MigrateError::shape(path, "no exported config object literal"))?;
        let scanner = Scanner::new(text);
        let props = scanner.object_properties(open).unwrap_or_default();

        if props.is_empty() {
            debug!("{} is in the legacy shape, replacing it", path.display());
            return Ok(write_if_changed(text, node_runner_template(ctx)));
        }

        let with_block = match props.iter().find(|p| p.key == "test") {
            None => {
                debug!("Adding a `test` block to {}", path.display());
                ensure_property(text, open, "test", "{}", &[])
            }
            Some(prop) if prop.value.as_ref().is_some_and(|v| text.as_bytes()[v.start] == b'{') => {
                text.to_string()
            }
            Some(_) => return Err(MigrateError::shape(path, "`test` is not an object literal")),
        };
        Ok(write_if_changed(text, self.patch(ctx, path, &with_block)?))
    }
}

/// `vitest.config.browser.ts`: always patched in place.
pub struct BrowserRunnerConfig;

impl ConfigRule for BrowserRunnerConfig {
    fn name(&self) -> &'static str {
        "browser-runner-config"
    }

    fn kind(&self) -> FileKind {
        FileKind::BrowserRunnerConfig
    }

    fn plan(&self, ctx: &RuleContext, path: &Path, current: Option<&str>) -> Result<Plan> {
        let Some(text) = current else {
            return Ok(Plan::Absent);
        };
        test_block(text, path)?;

        let mut next = ensure_import(
            text,
            BROWSER_ALIAS_HELPER,
            &helper_import(BROWSER_ALIAS_HELPER, &ctx.helper_module()),
        );
        for (i, (key, value)) in BROWSER_TEST_KEYS
            .iter()
            .zip([BROWSER_ALIAS_VALUE, BROWSER_INCLUDE_VALUE, TIMEOUT_VALUE, TIMEOUT_VALUE])
            .enumerate()
        {
            let open = test_block(&next, path)?;
            next = ensure_property(&next, open, key, value, &BROWSER_TEST_KEYS[..i]);
        }
        Ok(write_if_changed(text, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testshape_core::Project;

    fn plan_node(text: Option<&str>) -> Plan {
        let project = Project::new("pkgA", "packages/pkg-a");
        let ctx = RuleContext::new(Path::new("/ws"), &project);
        NodeRunnerConfig.plan(&ctx, Path::new("vitest.config.ts"), text).unwrap()
    }

    fn plan_browser(text: &str) -> Result<Plan> {
        let project = Project::new("pkgA", "packages/pkg-a");
        let ctx = RuleContext::new(Path::new("/ws"), &project);
        BrowserRunnerConfig.plan(&ctx, Path::new("vitest.config.browser.ts"), Some(text))
    }

    fn written(plan: Plan) -> String {
        match plan {
            Plan::Write(text) => text,
            other => panic!("expected a write, got {:?}", other),
        }
    }

    #[test]
    fn test_absent_node_config_is_skipped() {
        assert_eq!(plan_node(None), Plan::Absent);
    }

    #[test]
    fn test_legacy_node_config_is_replaced() {
        let legacy = "import { defineConfig } from \"vitest/config\";\n\nexport default defineConfig({});\n";
        let out = written(plan_node(Some(legacy)));
        assert!(out.contains("import { nodeAlias } from \"../../vitest.shared\";"));
        assert!(out.contains("alias: nodeAlias(dirname),"));
        assert!(out.contains("hookTimeout: 30000,"));
        assert!(out.contains("typecheck: { enabled: false },"));
        assert_eq!(plan_node(Some(&out)), Plan::Compliant);
    }

    #[test]
    fn test_extended_node_config_is_patched() {
        let extended = r#"import { defineConfig } from "vitest/config";

export default defineConfig({
  test: {
    hookTimeout: 1000,
    setupFiles: ["./test/setup.ts"],
  },
});
"#;
        let out = written(plan_node(Some(extended)));
        let expected = r#"import { defineConfig } from "vitest/config";
import { nodeAlias } from "../../vitest.shared";
import { fileURLToPath } from "node:url";

const dirname = fileURLToPath(new URL(".", import.meta.url));

export default defineConfig({
  test: {
    alias: nodeAlias(dirname),
    hookTimeout: 30000,
    testTimeout: 30000,
    typecheck: { enabled: false },
    setupFiles: ["./test/setup.ts"],
  },
});
"#;
        assert_eq!(out, expected);
        assert_eq!(plan_node(Some(&out)), Plan::Compliant);
    }

    #[test]
    fn test_patched_node_config_matches_template_order() {
        let legacy = "import { defineConfig } from \"vitest/config\";\n\nexport default defineConfig({});\n";
        let template = written(plan_node(Some(legacy)));
        let extended = "import { defineConfig } from \"vitest/config\";\n\nexport default defineConfig({\n  test: {\n    typecheck: true,\n  },\n});\n";
        let patched = written(plan_node(Some(extended)));

        let block = |text: &str| text[text.find("test: {").unwrap()..].to_string();
        assert_eq!(block(&patched), block(&template));
    }

    #[test]
    fn test_node_config_with_other_options_keeps_them() {
        let text = r#"import { defineConfig } from "vitest/config";
import react from "@vitejs/plugin-react";

export default defineConfig({
  plugins: [react()],
  resolve: { conditions: ["browser"] },
});
"#;
        let out = written(plan_node(Some(text)));
        assert!(out.contains("  plugins: [react()],\n"));
        assert!(out.contains(r#"  resolve: { conditions: ["browser"] },"#));
        assert!(out.contains("import react from \"@vitejs/plugin-react\";"));
        assert!(out.contains(
            "  test: {\n    alias: nodeAlias(dirname),\n    hookTimeout: 30000,\n    testTimeout: 30000,\n    typecheck: { enabled: false },\n  },"
        ));
        assert_eq!(plan_node(Some(&out)), Plan::Compliant);
    }

    #[test]
    fn test_node_config_with_shared_test_options_is_not_replaced() {
        let text = r#"import { defineConfig } from "vitest/config";
import react from "@vitejs/plugin-react";
import { shared } from "../../vitest.base";

export default defineConfig({
  plugins: [react()],
  resolve: { conditions: ["browser"] },
  test: shared,
});
"#;
        let project = Project::new("pkgA", "packages/pkg-a");
        let ctx = RuleContext::new(Path::new("/ws"), &project);
        let err = NodeRunnerConfig.plan(&ctx, Path::new("vitest.config.ts"), Some(text)).unwrap_err();
        assert!(matches!(err, MigrateError::UnrecognizedShape { .. }));

        let err = NodeRunnerConfig
            .plan(&ctx, Path::new("vitest.config.ts"), Some("export default defineConfig(shared);\n"))
            .unwrap_err();
        assert!(matches!(err, MigrateError::UnrecognizedShape { .. }));
    }

    #[test]
    fn test_compliant_node_config_with_extra_options() {
        let text = r#"import { fileURLToPath } from "node:url";
import { defineConfig } from "vitest/config";
import { nodeAlias } from "../../vitest.shared";

const dirname = fileURLToPath(new URL(".", import.meta.url));

export default defineConfig({
  test: {
    alias: nodeAlias(dirname),
    hookTimeout: 30000,
    testTimeout: 30000,
    typecheck: { enabled: false, tsconfig: "./test/tsconfig.json" },
    globals: true,
  },
});
"#;
        assert_eq!(plan_node(Some(text)), Plan::Compliant);
    }

    #[test]
    fn test_browser_config_forces_alias_and_include() {
        let text = r#"import { defineConfig } from "vitest/config";

export default defineConfig({
  test: {
    alias: { "pkgA": "./src/index.ts" },
    include: ["test/browser/**/*.test.ts"],
    browser: { enabled: true, name: "chromium" },
  },
});
"#;
        let out = written(plan_browser(text).unwrap());
        let expected = r#"import { defineConfig } from "vitest/config";
import { browserAlias } from "../../vitest.shared";

export default defineConfig({
  test: {
    alias: browserAlias(import.meta.url),
    include: ["test/browser/dist/**/*.test.js"],
    hookTimeout: 30000,
    testTimeout: 30000,
    browser: { enabled: true, name: "chromium" },
  },
});
"#;
        assert_eq!(out, expected);
        assert_eq!(plan_browser(&out).unwrap(), Plan::Compliant);
    }

    #[test]
    fn test_browser_config_without_test_block_is_an_error() {
        let err = plan_browser("export default {};\n").unwrap_err();
        assert!(matches!(err, MigrateError::UnrecognizedShape { .. }));
    }
}
