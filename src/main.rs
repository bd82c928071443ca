//! Pokedex - browse the Pokemon catalog from the terminal
//!
//! Loads the catalog and every thumbnail once, then prints the list, a
//! search result or a single entry.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;

use pokedex::cli::{describe_event, Cli};
use pokedex::config::{self, ServiceConfig};
use pokedex::{log_debug, log_error, log_info, log_warn, logging, CatalogService};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init(!cli.no_log_file);
    logging::set_log_level(cli.debug);

    log_info!("main", "=== {} Starting ===", config::app::DISPLAY_NAME);
    log_info!("main", "Version: {}", env!("CARGO_PKG_VERSION"));
    log_info!(
        "main",
        "OS: {} {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );

    let settings = cli.service_config(ServiceConfig::from_env());
    log_info!("main", "Catalog URL: {}", settings.catalog_url);
    log_debug!("main", "Settings: {:?}", settings);

    let service = match CatalogService::from_config(&settings) {
        Ok(service) => service,
        Err(e) => {
            log_error!("main", "{}", e);
            return ExitCode::FAILURE;
        }
    };

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            if let Some(line) = describe_event(&event) {
                log_info!("main", "{}", line);
            }
        }
    });

    let task = Arc::new(service.with_events(events_tx)).spawn();

    let cancel = task.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log_warn!("main", "Interrupted, cancelling fetch");
            cancel.cancel();
        }
    });

    let result = task.wait().await;

    // The event sender lives in the service, which the fetch task drops when it ends
    if let Err(e) = printer.await {
        log_warn!("main", "Event printer stopped: {}", e);
    }

    let items = match result {
        Ok(items) => items,
        Err(e) => {
            log_error!("main", "Failed to load the Pokedex: {}", e);
            eprintln!("Failed to load the Pokedex: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let output = match cli.render(&items) {
        Ok(output) => output,
        Err(e) => {
            log_error!("main", "Failed to render output: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout.write_all(output.as_bytes()).and_then(|_| stdout.flush()) {
        log_error!("main", "Failed to write output: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
