//! Canonical values of the target test convention.

pub const NODE_RUNNER_CONFIG: &str = "vitest.config.ts";
pub const BROWSER_RUNNER_CONFIG: &str = "vitest.config.browser.ts";
pub const DEPRECATED_RUNNER_CONFIG: &str = "vitest.config.esm.ts";
pub const BROWSER_TYPECHECK_CONFIG: &str = "test/browser/tsconfig.json";
pub const NODE_TYPECHECK_CONFIG: &str = "test/tsconfig.json";
pub const MANIFEST: &str = "package.json";

/// Shared alias helpers, at the workspace root
pub const ALIAS_HELPER_MODULE: &str = "vitest.shared";
pub const NODE_ALIAS_HELPER: &str = "nodeAlias";
pub const BROWSER_ALIAS_HELPER: &str = "browserAlias";

pub const NODE_ALIAS_VALUE: &str = "nodeAlias(dirname)";
pub const BROWSER_ALIAS_VALUE: &str = "browserAlias(import.meta.url)";
pub const TIMEOUT_VALUE: &str = "30000";
pub const BROWSER_INCLUDE_VALUE: &str = r#"["test/browser/dist/**/*.test.js"]"#;
pub const TYPECHECK_VALUE: &str = "{ enabled: false }";

pub const URL_IMPORT: &str = r#"import { fileURLToPath } from "node:url";"#;
pub const DIRNAME_BINDING: &str = r#"const dirname = fileURLToPath(new URL(".", import.meta.url));"#;

pub const TEST_NODE_SCRIPT: &str = "test:node";
pub const TEST_NODE_COMMAND: &str =
    "tsc -p test/tsconfig.json --noEmit && vitest run --config vitest.config.ts";
pub const DEPRECATED_SCRIPT: &str = "test:esm";

pub const NODE_TSCONFIG_EXTENDS: &str = "../tsconfig.json";
pub const NODE_TSCONFIG_LIB: &[&str] = &["ES2022", "DOM"];
pub const NODE_TSCONFIG_INCLUDE: &[&str] = &["./**/*.ts"];
pub const NODE_TSCONFIG_EXCLUDE: &[&str] = &["./browser/**"];
pub const LEGACY_INTERNAL_KEY: &str = "~/*";

pub const BROWSER_TSCONFIG_INCLUDE: &[&str] = &["./**/*.ts"];
pub const BROWSER_TSCONFIG_EXCLUDE: &[&str] = &["./dist"];
