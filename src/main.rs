use clap::Parser;
use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;

use bundle_advisor::config::{CommandLineArgs, Config, LoggingConfig};
use bundle_advisor::services::bundle::{self, RoleTable};
use bundle_advisor::services::{BundleAnalyzer, CompletionClient, Reporter};

#[tokio::main]
async fn main() -> ExitCode {
    // Missing or bad arguments exit here with usage text (code 2)
    let cli_args = CommandLineArgs::parse();

    // Config overrides and warnings are logged before the final subscriber exists
    let startup_level = Config::startup_log_level(&cli_args, |key| std::env::var(key).ok());
    let loaded = tracing::subscriber::with_default(startup_subscriber(&startup_level), || {
        Config::load(&cli_args)
    });
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        },
    };

    let (subscriber, _guard) = build_subscriber(&config.logging);
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(&cli_args, &config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!("Run failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        },
    }
}

async fn run(cli_args: &CommandLineArgs, config: &Config) -> anyhow::Result<ExitCode> {
    let client = CompletionClient::from_config(&config.llm)?;
    if !cli_args.dry_run {
        client.ensure_credential()?;
    }

    let contents = bundle::read_bundle_file(&cli_args.bundle)?;
    tracing::info!("Loaded bundle {} ({} entries)", cli_args.bundle.display(), contents.len());

    let analyzer = BundleAnalyzer::new(client, RoleTable::default(), &config.bundle);

    let stdout = std::io::stdout();
    let styled = stdout.is_terminal();
    let mut reporter = Reporter::new(stdout.lock(), std::io::stderr().lock(), styled);

    let stats = analyzer.run(&contents, &mut reporter, cli_args.dry_run).await?;
    tracing::info!(
        "Analysis finished: selected={}, succeeded={}, failed={}",
        stats.selected,
        stats.succeeded,
        stats.failed
    );

    if stats.all_failed() {
        anyhow::bail!("all {} file analyses failed", stats.failed);
    }
    Ok(ExitCode::SUCCESS)
}

fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|e| {
        eprintln!("Invalid log level '{}': {} (falling back to warn)", level, e);
        EnvFilter::new("warn")
    })
}

/// Stderr-only subscriber used while the configuration is loading
fn startup_subscriber(level: &str) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::registry()
        .with(log_filter(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
}

/// Logging to stderr, plus a daily-rolling file when configured.
///
/// The returned guard must live until exit so buffered file logs are flushed.
fn build_subscriber(
    config: &LoggingConfig,
) -> (Box<dyn tracing::Subscriber + Send + Sync>, Option<WorkerGuard>) {
    let registry = tracing_subscriber::registry().with(log_filter(&config.level));

    let Some(log_file) = &config.file else {
        let subscriber =
            registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
        return (Box::new(subscriber), None);
    };

    let log_path = Path::new(log_file);
    if let Some(parent) = log_path.parent()
        && !parent.as_os_str().is_empty()
    {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_dir = log_path
        .parent()
        .and_then(|p| p.to_str())
        .filter(|p| !p.is_empty())
        .unwrap_or(".");
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("bundle-advisor.log");
    // Remove .log extension if present (rolling appender adds date suffix)
    let file_prefix = file_name.strip_suffix(".log").unwrap_or(file_name);

    let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let subscriber = registry
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    (Box::new(subscriber), Some(guard))
}
