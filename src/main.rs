use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use colored::*;

use dbdiag::commands;
use dbdiag::core::config::RawParams;

fn main() -> Result<()> {
    dbdiag::init_logging();

    let matches = Command::new("dbdiag")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Diagnostic data collector for database server hosts")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("server")
                .long("server")
                .value_name("HOST[\\INSTANCE]")
                .help("Target server address, with an optional named instance"),
        )
        .arg(
            Arg::new("database")
                .long("database")
                .value_name("NAME")
                .help("Target database name"),
        )
        .arg(
            Arg::new("query-timeout")
                .long("query-timeout")
                .value_name("SECONDS")
                .help("Timeout applied to every engine query"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .value_name("LOGIN")
                .help("Login used for engine queries"),
        )
        .arg(
            Arg::new("password")
                .long("password")
                .value_name("PASSWORD")
                .help("Password used for engine queries"),
        )
        .arg(
            Arg::new("perf-log")
                .long("perf-log")
                .value_name("PATH")
                .help("Performance time-series output file (CSV)"),
        )
        .arg(
            Arg::new("out-log")
                .long("out-log")
                .value_name("PATH")
                .help("Inventory report output file"),
        )
        .arg(
            Arg::new("duration")
                .long("duration")
                .value_name("MINUTES")
                .help("Total sampling window in minutes"),
        )
        .arg(
            Arg::new("interval")
                .long("interval")
                .value_name("SECONDS")
                .help("Pause between samples in seconds"),
        )
        .get_matches();

    if matches.get_flag("version") {
        println!("dbdiag version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if let Err(e) = commands::run::execute(raw_params(&matches)) {
        println!("{}", format!("Error: {}", e).red().bold());
        std::process::exit(1);
    }

    Ok(())
}

fn raw_params(matches: &ArgMatches) -> RawParams {
    let get = |name: &str| matches.get_one::<String>(name).cloned();

    RawParams {
        server: get("server"),
        database: get("database"),
        query_timeout_secs: get("query-timeout"),
        username: get("user"),
        password: get("password"),
        perf_log: get("perf-log"),
        out_log: get("out-log"),
        duration_minutes: get("duration"),
        interval_secs: get("interval"),
    }
}
