//! Constants for the layout of a package and the target test convention.
//!
//! Every package is expected to follow the same shape:
//!
//! - `src/index.ts`: the public entry point
//! - `test/`: node tests, with `test/browser/` holding browser tests
//!
//! ## Module extensions
//!
//! - **TypeScript**: `.ts`, `.tsx`, `.mts` (ES module), `.cts` (CommonJS)
//! - **JavaScript**: `.js`, `.jsx`, `.mjs` (ES module), `.cjs` (CommonJS)

/// File extensions for source-like files scanned by the import rewriter
pub const JS_TS_EXTENSIONS: &[&str] = &[
    "ts",  // TypeScript
    "tsx", // TypeScript with JSX
    "mts", // TypeScript module
    "cts", // TypeScript CommonJS
    "js",  // JavaScript
    "jsx", // JavaScript with JSX
    "mjs", // JavaScript module
    "cjs", // JavaScript CommonJS
];

/// Extension every internal-form import carries after rewriting
pub const CANONICAL_EXTENSION: &str = "js";

/// Alias prefix for imports that reach into a package's source tree
pub const INTERNAL_ALIAS: &str = "$internal";

/// Module name (extension stripped) of the public entry point
pub const ENTRY_MODULE: &str = "index";

/// Entry point, relative to the package folder
pub const ENTRY_POINT: &str = "src/index.ts";

pub const SOURCE_DIR: &str = "src";
pub const TEST_DIR: &str = "test";

/// Central workspace manifest, relative to the workspace root
pub const WORKSPACE_MANIFEST: &str = "projects.json";

/// Per-package manifest file name
pub const PACKAGE_MANIFEST: &str = "package.json";
