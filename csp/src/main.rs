// csp/src/main.rs
use std::path::Path;
use std::{env, fs, process};

use clap::Parser;
use colored::Colorize;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

mod actions;
mod cli;
use cli::CliArgs;

fn init_logging(verbose: u8, log_dir: Option<&Path>) {
    // The runner sets RUNNER_DEBUG=1 when step debug logging is enabled.
    let runner_debug = env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1");
    let verbose = if runner_debug { verbose.max(1) } else { verbose };

    let level_filter = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let max_log_level = level_filter.into_level().unwrap_or(tracing::Level::INFO);

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("CSP_LOG")
        .from_env_lossy();

    let Some(log_dir) = log_dir else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .without_time()
            .try_init();
        return;
    };

    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!(
            "{} Failed to create log directory {}: {}",
            "Error:".red().bold(),
            log_dir.display(),
            e
        );
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .without_time()
            .try_init();
        return;
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, "csp.log");
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_writer = std::io::stderr.with_max_level(max_log_level);
    let file_writer = non_blocking_appender.with_max_level(max_log_level);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(stderr_writer.and(file_writer))
        .with_ansi(true)
        .without_time()
        .try_init();

    Box::leak(Box::new(guard)); // Keep guard alive

    debug!("Writing logs to: {}/csp.log", log_dir.display());
}

// Steps run one at a time and process calls block, so a single thread is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli_args = CliArgs::parse();
    init_logging(cli_args.verbose, cli_args.log_dir.as_deref());

    if let Err(e) = cli_args.command.run().await {
        error!("Command failed: {:#}", e);
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        actions::report_error(&e.to_string());
        process::exit(1);
    }

    debug!("Command completed successfully.");
}
