use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use log::{debug, info};
use std::io::{BufWriter, Write};
use std::time::Instant;
use testshape_migrate::Config;

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cfg = Config::parse();
    debug!("Parsed CLI arguments: {:?}", cfg);
    info!(
        "Running migration ({})",
        if cfg.dry_run { "dry run" } else { "applying changes" }
    );

    let start = Instant::now();
    let result = testshape_migrate::run_migration(cfg.clone())?;

    if result.filter_miss {
        testshape_migrate::print_filter_miss(&mut stdout, &cfg.filters)?;
        std::process::exit(1);
    }

    testshape_migrate::print_report(&mut stdout, &result)?;
    writeln!(
        stdout,
        "\n{} Finished in {}ms.",
        "●".bright_blue(),
        start.elapsed().as_millis().to_string().cyan()
    )?;
    stdout.flush()?;

    if result.failed() {
        // Non-zero exit to fail CI
        std::process::exit(1);
    }
    Ok(())
}
