use colored::Colorize;
use log::debug;
use std::io::{self, Write};
use testshape_rules::RuleOutcome;

use crate::types::{Notice, ProjectReport, RunResult};

pub fn print_filter_miss<W: Write>(writer: &mut W, filters: &[String]) -> io::Result<()> {
    writeln!(
        writer,
        "{} No projects match {}",
        "✗".red().bold(),
        filters.join(", ").yellow()
    )?;
    writer.flush()?;
    Ok(())
}

fn print_project<W: Write>(writer: &mut W, report: &ProjectReport, dry_run: bool) -> io::Result<()> {
    writeln!(
        writer,
        "\n{} {} {}",
        "●".bright_blue(),
        report.name.bold(),
        format!("({})", report.folder.display()).dimmed()
    )?;

    for notice in &report.notices {
        match notice {
            Notice::Rule { rule, file, outcome } => {
                let status = match outcome {
                    RuleOutcome::Applied if dry_run => "would apply".yellow(),
                    RuleOutcome::Applied => outcome.to_string().green(),
                    _ => outcome.to_string().dimmed(),
                };
                writeln!(writer, "  {} {} {}", rule, file.dimmed(), status)?;
            }
            Notice::Rewrite { file, changes } => {
                let verb = if dry_run { "would rewrite" } else { "rewrote" };
                writeln!(
                    writer,
                    "  {} {} {} {}",
                    "↳".cyan(),
                    file.display(),
                    verb.green(),
                    format!("({} imports)", changes.len()).dimmed()
                )?;
                for change in changes {
                    writeln!(writer, "      \"{}\" → \"{}\"", change.from.dimmed(), change.to.cyan())?;
                }
            }
            Notice::Failure { step, message } => {
                writeln!(writer, "  {} {}: {}", "✗".red().bold(), step, message.red())?;
            }
        }
    }
    Ok(())
}

/// Writes every project's notices followed by the run summary.
pub fn print_report<W: Write>(writer: &mut W, result: &RunResult) -> io::Result<()> {
    debug!("Printing report for {} projects", result.projects.len());
    let dry_run = result.is_dry_run();
    for report in &result.projects {
        print_project(writer, report, dry_run)?;
    }

    let changes_label = if dry_run { "changes previewed" } else { "changes applied" };
    let errors = if result.errors > 0 {
        result.errors.to_string().red().bold()
    } else {
        result.errors.to_string().green()
    };
    writeln!(writer)?;
    writeln!(writer, "{} projects processed", result.projects_processed.to_string().cyan())?;
    writeln!(writer, "{} {}", result.changes_applied.to_string().cyan(), changes_label)?;
    writeln!(writer, "{} errors encountered", errors)?;
    if dry_run {
        writeln!(writer, "{}", "Dry run: no files were modified.".yellow())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use testshape_core::{ImportChange, Mode, Project};

    fn render(result: &RunResult) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        print_report(&mut out, result).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn sample(mode: Mode) -> RunResult {
        let mut report = ProjectReport::new(&Project::new("pkgA", "packages/pkg-a"));
        report.rule("node-runner-config", "vitest.config.ts", RuleOutcome::Applied);
        report.rule("browser-runner-config", "vitest.config.browser.ts", RuleOutcome::SkippedAbsent);
        report.rewrite(
            PathBuf::from("test/a.test.ts"),
            vec![ImportChange { from: "../src/index".into(), to: "pkgA".into() }],
        );
        let mut result = RunResult::new(PathBuf::from("/ws"), mode);
        result.record(report);
        result
    }

    #[test]
    fn test_apply_report() {
        let out = render(&sample(Mode::Apply));
        assert!(out.contains("pkgA (packages/pkg-a)"));
        assert!(out.contains("node-runner-config vitest.config.ts applied"));
        assert!(out.contains("browser-runner-config vitest.config.browser.ts skipped (file absent)"));
        assert!(out.contains("test/a.test.ts rewrote (1 imports)"));
        assert!(out.contains("\"../src/index\" → \"pkgA\""));
        assert!(out.contains("1 projects processed"));
        assert!(out.contains("2 changes applied"));
        assert!(out.contains("0 errors encountered"));
        assert!(!out.contains("Dry run"));
    }

    #[test]
    fn test_dry_run_report() {
        let out = render(&sample(Mode::DryRun));
        assert!(out.contains("node-runner-config vitest.config.ts would apply"));
        assert!(out.contains("2 changes previewed"));
        assert!(out.contains("Dry run: no files were modified."));
    }

    #[test]
    fn test_filter_miss_message() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        print_filter_miss(&mut out, &["ui".to_string(), "core".to_string()]).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No projects match ui, core"));
    }
}
