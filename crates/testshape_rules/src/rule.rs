use log::{debug, trace};
use std::{
    fmt, fs,
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};
use testshape_core::{FsGate, MigrateError, Project, Result};

use crate::constants::{
    ALIAS_HELPER_MODULE, BROWSER_RUNNER_CONFIG, BROWSER_TYPECHECK_CONFIG, DEPRECATED_RUNNER_CONFIG,
    MANIFEST, NODE_RUNNER_CONFIG, NODE_TYPECHECK_CONFIG,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    NodeRunnerConfig,
    BrowserRunnerConfig,
    BrowserTypecheckConfig,
    NodeTypecheckConfig,
    Manifest,
    DeprecatedRunnerConfig,
}

impl FileKind {
    /// Location of this kind of file, relative to the project folder.
    pub fn file_name(self) -> &'static str {
        match self {
            FileKind::NodeRunnerConfig => NODE_RUNNER_CONFIG,
            FileKind::BrowserRunnerConfig => BROWSER_RUNNER_CONFIG,
            FileKind::BrowserTypecheckConfig => BROWSER_TYPECHECK_CONFIG,
            FileKind::NodeTypecheckConfig => NODE_TYPECHECK_CONFIG,
            FileKind::Manifest => MANIFEST,
            FileKind::DeprecatedRunnerConfig => DEPRECATED_RUNNER_CONFIG,
        }
    }
}

/// What a rule wants done with its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Absent,
    Compliant,
    Write(String),
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    SkippedAbsent,
    SkippedCompliant,
    Applied,
}

impl fmt::Display for RuleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleOutcome::SkippedAbsent => write!(f, "skipped (file absent)"),
            RuleOutcome::SkippedCompliant => write!(f, "skipped (already compliant)"),
            RuleOutcome::Applied => write!(f, "applied"),
        }
    }
}

/// Per-project inputs shared by every rule.
#[derive(Debug, Clone)]
pub struct RuleContext<'a> {
    pub project: &'a Project,
    /// Absolute project folder
    pub project_dir: PathBuf,
}

impl<'a> RuleContext<'a> {
    pub fn new(root: &Path, project: &'a Project) -> Self {
        Self { project, project_dir: project.dir(root) }
    }

    /// Import specifier of the shared alias helper, relative to the project folder.
    pub fn helper_module(&self) -> String {
        let depth = self
            .project
            .folder
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .count();
        if depth == 0 {
            format!("./{}", ALIAS_HELPER_MODULE)
        } else {
            format!("{}{}", "../".repeat(depth), ALIAS_HELPER_MODULE)
        }
    }
}

/// One idempotent rewrite of one config file kind.
///
/// `plan` is both detection and transformation: it returns `Compliant` for a file
/// already in the target shape, and running it on its own `Write` output must
/// return `Compliant`.
pub trait ConfigRule {
    fn name(&self) -> &'static str;

    fn kind(&self) -> FileKind;

    /// The owned file, relative to the project folder.
    fn file(&self) -> &'static str {
        self.kind().file_name()
    }

    fn target(&self, ctx: &RuleContext) -> PathBuf {
        ctx.project_dir.join(self.file())
    }

    /// Whether `plan` looks at the file's text. Rules that only care about presence
    /// are handed an empty string.
    fn reads_contents(&self) -> bool {
        true
    }

    fn plan(&self, ctx: &RuleContext, path: &Path, current: Option<&str>) -> Result<Plan>;
}

/// Runs one rule against its file, routing any change through the gate.
pub fn apply_rule(
    rule: &dyn ConfigRule,
    ctx: &RuleContext,
    gate: &mut FsGate,
) -> Result<RuleOutcome> {
    let path = rule.target(ctx);
    trace!("Running rule {} on {}", rule.name(), path.display());

    let current = if !rule.reads_contents() {
        path.is_file().then(String::new)
    } else {
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(MigrateError::io(&path, e)),
        }
    };

    let outcome = match rule.plan(ctx, &path, current.as_deref())? {
        Plan::Absent => RuleOutcome::SkippedAbsent,
        Plan::Compliant => RuleOutcome::SkippedCompliant,
        Plan::Write(text) => {
            gate.write(&path, &text)?;
            RuleOutcome::Applied
        }
        Plan::Delete => {
            gate.delete(&path)?;
            RuleOutcome::Applied
        }
    };
    debug!("Rule {} for {}: {}", rule.name(), ctx.project.name, outcome);
    Ok(outcome)
}

/// Compares a rule's output with the input and picks `Write` or `Compliant`.
pub(crate) fn write_if_changed(current: &str, next: String) -> Plan {
    if next == current { Plan::Compliant } else { Plan::Write(next) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_module_depth() {
        let nested = Project::new("a", "packages/a");
        assert_eq!(RuleContext::new(Path::new("/ws"), &nested).helper_module(), "../../vitest.shared");

        let shallow = Project::new("b", "b");
        assert_eq!(RuleContext::new(Path::new("/ws"), &shallow).helper_module(), "../vitest.shared");

        let root = Project::new("c", "");
        assert_eq!(RuleContext::new(Path::new("/ws"), &root).helper_module(), "./vitest.shared");
    }

    #[test]
    fn test_file_kind_locations() {
        assert_eq!(FileKind::NodeRunnerConfig.file_name(), "vitest.config.ts");
        assert_eq!(FileKind::BrowserTypecheckConfig.file_name(), "test/browser/tsconfig.json");
        assert_eq!(FileKind::DeprecatedRunnerConfig.file_name(), "vitest.config.esm.ts");

        let project = Project::new("a", "packages/a");
        let ctx = RuleContext::new(Path::new("/ws"), &project);
        assert_eq!(
            crate::ManifestScripts.target(&ctx),
            PathBuf::from("/ws/packages/a/package.json")
        );
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(RuleOutcome::Applied.to_string(), "applied");
        assert_eq!(RuleOutcome::SkippedAbsent.to_string(), "skipped (file absent)");
    }
}
