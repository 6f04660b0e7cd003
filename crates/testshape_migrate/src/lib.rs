//! Workspace-wide test layout migration.
//!
//! Walks every selected project, runs the config rules and rewrites test imports,
//! then reports what changed (or, with `--dry-run`, what would change).
//!
//! # Examples
//!
//! ```no_run
//! use std::io::{BufWriter, Write};
//! use testshape_migrate::{Config, print_report, run_migration};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config {
//!     root: Some(std::path::PathBuf::from("/path/to/workspace")),
//!     dry_run: true,
//!     filters: vec![],
//! };
//!
//! let result = run_migration(cfg)?;
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! print_report(&mut stdout, &result)?;
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```

mod config;
mod reporter;
mod types;
mod walker;

// Re-export public API
pub use config::Config;
pub use reporter::{print_filter_miss, print_report};
pub use types::{Notice, ProjectReport, RunResult};
pub use walker::run_migration;
