use ledger::PositionLedger;
use order_book::BookRegistry;
use scenario::ScenarioRunner;
use std::path::PathBuf;
use tracing::{info, warn};

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        anyhow::bail!("usage: scenario <file-or-directory>...");
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for arg in args {
        let path = PathBuf::from(arg);
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(&path)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
                .collect();
            entries.sort();
            paths.extend(entries);
        } else {
            paths.push(path);
        }
    }

    let books = BookRegistry::new();
    let ledger = PositionLedger::default();
    let mut runner = ScenarioRunner::new(&books, &ledger);

    for path in &paths {
        let report = runner.run_file(path)?;
        if report.passed {
            info!(
                scenario = %report.name,
                orders = report.orders_processed,
                trades = report.trades_executed,
                ms = format!("{:.2}", report.execution_time_ms),
                "passed"
            );
        } else {
            for failure in &report.failures {
                warn!(scenario = %report.name, line = failure.line, "{}", failure.message);
            }
            warn!(
                scenario = %report.name,
                failures = report.failures.len(),
                "failed"
            );
        }
    }

    let stats = runner.stats();
    info!(
        total = stats.total_scenarios,
        passed = stats.passed_scenarios,
        failed = stats.failed_scenarios,
        avg_ms = format!("{:.2}", stats.avg_execution_time_ms),
        "scenario run complete"
    );

    if stats.failed_scenarios > 0 {
        std::process::exit(1);
    }
    Ok(())
}
