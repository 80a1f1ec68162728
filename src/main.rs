use std::process::ExitCode;

use crate::runtime::docker::DockerRuntime;
use crate::status::StatusCollector;
use crate::telemetry::MetricsExporter;

mod cli;
mod config;
mod runtime;
mod signals;
mod status;
mod telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::get_cli_args();
    match &args.env_file {
        Some(path) => {
            if let Err(err) = dotenv::from_path(path) {
                eprintln!("Unable to read env file {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        }
        None => {
            let _ = dotenv::dotenv();
        }
    }

    env_logger::init();

    let mut config = config::Config::from_env();
    if let Some(secs) = args.interval {
        config.poll_interval = std::time::Duration::from_secs(secs);
    }

    let runtime = match DockerRuntime::connect() {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("Failed to create Docker client: {err}");
            return ExitCode::FAILURE;
        }
    };
    let collector = StatusCollector::new(runtime);

    let mut exporter = match MetricsExporter::connect(&config) {
        Ok(exporter) => exporter,
        Err(err) => {
            log::error!("Failed to initialize the OTLP exporter: {err}");
            return ExitCode::FAILURE;
        }
    };

    let _ = sd_notify::notify(true, &[sd_notify::NotifyState::Ready]);
    log::info!(
        "Started the exporter with a {} seconds interval",
        config.poll_interval.as_secs()
    );

    let shutdown = signals::shutdown_signal();
    tokio::pin!(shutdown);

    // The first tick fires immediately, then once per interval. Ticks never
    // overlap: the next one is not polled until the current one finishes.
    let mut ticker = tokio::time::interval(config.poll_interval);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                match collector.collect().await {
                    Ok(records) => exporter.send(&records).await,
                    Err(err) => log::error!("Failed to collect container statuses: {err}"),
                }
            }
        }
    }

    let _ = sd_notify::notify(true, &[sd_notify::NotifyState::Stopping]);
    log::info!("Shutting down");
    ExitCode::SUCCESS
}
