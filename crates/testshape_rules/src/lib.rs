//! Idempotent rewrites of a package's test configuration files.
//!
//! Every rule owns one file kind. Rules never look at other files, and every write
//! or delete they request goes through the caller's [`testshape_core::FsGate`].

mod constants;
mod deprecated;
mod json;
mod manifest;
mod patch;
mod rule;
mod runner;
mod typecheck;

pub use constants::*;
pub use deprecated::DeprecatedRunnerConfig;
pub use manifest::ManifestScripts;
pub use rule::{ConfigRule, FileKind, Plan, RuleContext, RuleOutcome, apply_rule};
pub use runner::{BrowserRunnerConfig, NodeRunnerConfig, node_runner_template};
pub use typecheck::{
    BrowserTypecheckConfig, NodeTypecheckConfig, browser_tsconfig_template,
    node_tsconfig_template, reconcile_node_tsconfig,
};

/// All rules, in the order they run for each project.
pub fn default_rules() -> Vec<Box<dyn ConfigRule>> {
    vec![
        Box::new(NodeRunnerConfig),
        Box::new(BrowserRunnerConfig),
        Box::new(BrowserTypecheckConfig),
        Box::new(NodeTypecheckConfig),
        Box::new(ManifestScripts),
        Box::new(DeprecatedRunnerConfig),
    ]
}
