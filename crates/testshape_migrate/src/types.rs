use std::path::PathBuf;
use testshape_core::{ImportChange, Mode, Project};
use testshape_rules::RuleOutcome;

/// One line of a project's report.
#[derive(Debug, Clone)]
pub enum Notice {
    Rule { rule: &'static str, file: &'static str, outcome: RuleOutcome },
    /// A test file whose imports were rewritten. `file` is relative to the project folder.
    Rewrite { file: PathBuf, changes: Vec<ImportChange> },
    Failure { step: String, message: String },
}

#[derive(Debug, Clone)]
pub struct ProjectReport {
    pub name: String,
    pub folder: PathBuf,
    pub notices: Vec<Notice>,
    pub changes_applied: usize,
    pub errors: usize,
}

impl ProjectReport {
    pub fn new(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            folder: project.folder.clone(),
            notices: Vec::new(),
            changes_applied: 0,
            errors: 0,
        }
    }

    pub fn rule(&mut self, rule: &'static str, file: &'static str, outcome: RuleOutcome) {
        if outcome == RuleOutcome::Applied {
            self.changes_applied += 1;
        }
        self.notices.push(Notice::Rule { rule, file, outcome });
    }

    pub fn rewrite(&mut self, file: PathBuf, changes: Vec<ImportChange>) {
        self.changes_applied += 1;
        self.notices.push(Notice::Rewrite { file, changes });
    }

    pub fn failure(&mut self, step: impl Into<String>, error: impl ToString) {
        self.errors += 1;
        self.notices.push(Notice::Failure { step: step.into(), message: error.to_string() });
    }
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub root: PathBuf,
    pub mode: Mode,
    pub projects_processed: usize,
    pub changes_applied: usize,
    pub errors: usize,
    pub projects: Vec<ProjectReport>,
    /// Filters were given and none of them matched a project
    pub filter_miss: bool,
}

impl RunResult {
    pub fn new(root: PathBuf, mode: Mode) -> Self {
        Self {
            root,
            mode,
            projects_processed: 0,
            changes_applied: 0,
            errors: 0,
            projects: Vec::new(),
            filter_miss: false,
        }
    }

    pub fn record(&mut self, report: ProjectReport) {
        self.projects_processed += 1;
        self.changes_applied += report.changes_applied;
        self.errors += report.errors;
        self.projects.push(report);
    }

    pub fn is_dry_run(&self) -> bool {
        self.mode == Mode::DryRun
    }

    /// Whether the process should exit non-zero.
    pub fn failed(&self) -> bool {
        self.filter_miss || self.errors > 0
    }
}
