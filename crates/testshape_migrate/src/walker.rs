use anyhow::{Context, Result};
use log::{debug, info, trace, warn};
use std::path::Path;

use testshape_core::{
    FsGate, Project, RewriteContext, collect_test_files, discover_projects, exports_for,
    filter_projects, rewrite_file,
};
use testshape_rules::{ConfigRule, RuleContext, apply_rule, default_rules};

use crate::{
    config::Config,
    types::{ProjectReport, RunResult},
};

/// Migrates every selected project, one at a time, in discovery order.
///
/// Only a discovery failure aborts the run. Rule, index and file failures are
/// recorded in the owning project's report and processing moves on.
pub fn run_migration(mut cfg: Config) -> Result<RunResult> {
    info!("Starting test layout migration");

    cfg.initialize()?;
    let root = cfg.root()?.clone();
    let mut gate = FsGate::new(cfg.mode());
    let mut result = RunResult::new(root.clone(), gate.mode());

    let projects = discover_projects(&root)
        .with_context(|| format!("Failed to discover projects under {}", root.display()))?;
    info!("Discovered {} projects", projects.len());

    let selected = filter_projects(projects, &cfg.filters);
    if selected.is_empty() {
        if cfg.filters.is_empty() {
            warn!("No projects found under {}", root.display());
        } else {
            warn!("Filters {:?} matched no projects", cfg.filters);
            result.filter_miss = true;
        }
        return Ok(result);
    }
    debug!("Selected {} projects", selected.len());

    let rules = default_rules();
    for project in &selected {
        if let Some(report) = migrate_project(&root, project, &rules, &mut gate) {
            result.record(report);
        }
    }

    info!(
        "{} {} projects: {} changes, {} errors",
        if gate.is_dry_run() { "Previewed" } else { "Processed" },
        result.projects_processed,
        result.changes_applied,
        result.errors
    );
    debug!("Gate recorded {} changes", gate.records().len());
    Ok(result)
}

/// Runs the rules and the import rewriter for one project. `None` when the
/// project has no test directory.
fn migrate_project(
    root: &Path,
    project: &Project,
    rules: &[Box<dyn ConfigRule>],
    gate: &mut FsGate,
) -> Option<ProjectReport> {
    let test_dir = project.test_dir(root);
    if !test_dir.is_dir() {
        info!("Skipping {}: no test directory at {}", project.name, test_dir.display());
        return None;
    }
    info!("Migrating {} ({})", project.name, project.folder.display());
    let mut report = ProjectReport::new(project);

    let ctx = RuleContext::new(root, project);
    for rule in rules {
        match apply_rule(rule.as_ref(), &ctx, gate) {
            Ok(outcome) => report.rule(rule.name(), rule.file(), outcome),
            Err(e) => {
                warn!("Rule {} failed for {}: {}", rule.name(), project.name, e);
                report.failure(rule.name(), e);
            }
        }
    }

    let exports = match exports_for(&project.entry_point(root)) {
        Ok(exports) => exports,
        Err(e) => {
            // without the export set every import would be misrouted
            warn!("Could not index exports of {}: {}", project.name, e);
            report.failure("export index", e);
            return Some(report);
        }
    };
    trace!("Exports of {}: {:?}", project.name, exports);

    let files = match collect_test_files(&test_dir) {
        Ok(files) => files,
        Err(e) => {
            warn!("Could not walk {}: {}", test_dir.display(), e);
            report.failure("test file walk", e);
            return Some(report);
        }
    };

    let source_dir = project.source_dir(root);
    let rewrite_ctx =
        RewriteContext { project_name: &project.name, source_dir: &source_dir, exports: &exports };
    let project_dir = ctx.project_dir.as_path();
    for file in &files {
        let display = file.strip_prefix(project_dir).unwrap_or(file).to_path_buf();
        match rewrite_file(&rewrite_ctx, file, gate) {
            Ok(Some(rewrite)) => report.rewrite(display, rewrite.changes),
            Ok(None) => {}
            Err(e) => {
                warn!("Failed to rewrite {}: {}", file.display(), e);
                report.failure(display.display().to_string(), e);
            }
        }
    }

    debug!(
        "{}: {} changes, {} errors over {} test files",
        project.name,
        report.changes_applied,
        report.errors,
        files.len()
    );
    Some(report)
}
