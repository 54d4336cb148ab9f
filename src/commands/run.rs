use anyhow::Result;
use colored::*;

use crate::core::artifact::OutputArtifact;
use crate::core::config::{usage_text, RawParams, RunConfig};
use crate::core::context::RunContext;
use crate::core::counters::LiveCounterSource;
use crate::core::inventory::InventoryCollector;
use crate::core::query::{QueryTarget, SqliteQueryExecutor};
use crate::core::sampler::{PerformanceSampler, CSV_HEADER};
use crate::core::shutdown::{install_ctrlc_handler, CancelToken};

/// Validate the parameters and execute the full run: inventory snapshot
/// first, then the bounded sampling loop, finalizing each artifact as soon
/// as its writes are complete.
pub fn execute(params: RawParams) -> Result<()> {
    let config = match params.validate() {
        Ok(config) => config,
        Err(missing) => {
            println!(
                "{}",
                format!("Missing or invalid parameters: {}", missing.join(", "))
                    .yellow()
                    .bold()
            );
            println!();
            println!("{}", usage_text());
            std::process::exit(2);
        }
    };

    run_collection(&config)
}

fn run_collection(config: &RunConfig) -> Result<()> {
    let ctx = RunContext::capture();
    let cancel = CancelToken::new();
    install_ctrlc_handler(&cancel)?;

    println!(
        "{} {} {}",
        "Diagnostic run on".white(),
        ctx.hostname.cyan().bold(),
        format!("({})", ctx.started_at_display()).dimmed()
    );
    println!("{}", "Press Ctrl+C at any time to stop the run safely".dimmed());
    println!();

    let executor = SqliteQueryExecutor;
    let target = QueryTarget::from_config(config);

    // Inventory: collected and finalized before any sampling starts.
    println!("{}", "Collecting inventory snapshot...".cyan());
    let report = InventoryCollector::new(&executor, &target).collect();

    let mut inventory = OutputArtifact::create_inventory(&config.out_log, &ctx)?;
    inventory.append(&report.render())?;
    let inventory_path = inventory.finalize(&ctx)?;
    println!(
        "{} {}",
        "Inventory written to".green(),
        inventory_path.display().to_string().cyan().bold()
    );
    println!();

    // Performance sampling loop.
    println!(
        "{} {}",
        "Sampling performance counters every".cyan(),
        format!(
            "{}s for {} minute(s)",
            config.interval.as_secs(),
            config.duration.as_secs() / 60
        )
        .yellow()
    );

    let mut source = LiveCounterSource::new(config, Box::new(SqliteQueryExecutor))?;
    let mut perf = OutputArtifact::open_performance(&config.perf_log, CSV_HEADER)?;

    let mut sampler = PerformanceSampler::new(
        &mut source,
        config.duration,
        config.interval,
        cancel.clone(),
    );
    let stats = sampler.run(&mut perf)?;
    let perf_path = perf.finalize(&ctx)?;

    println!();
    if stats.cancelled {
        println!("{}", "Run stopped early by operator request.".yellow().bold());
    }
    println!(
        "{} {} {}",
        "Appended".green().bold(),
        format!("{} sample(s)", stats.rows).yellow().bold(),
        format!("to {}", perf_path.display()).white()
    );
    if stats.sentinel_fields > 0 {
        println!(
            "{}",
            format!(
                "{} counter reading(s) were unavailable and recorded as empty cells (see log)",
                stats.sentinel_fields
            )
            .yellow()
        );
    }

    Ok(())
}
