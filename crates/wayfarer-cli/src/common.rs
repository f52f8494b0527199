//! Helpers shared by the CLI subcommands.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing_subscriber::EnvFilter;
use wayfarer_core::credentials;
use wayfarer_core::{
    ActivityList, CannedGenerator, Config, Database, HttpTextGenerator, RegenerationOrchestrator, TextGenerator,
};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Log to stderr so stdout stays machine readable. `RUST_LOG` wins over
/// `logging.level` from the config file.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Config::load_or_default().logging.level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn block_on<F: std::future::Future>(future: F) -> CliResult<F::Output> {
    let runtime = tokio::runtime::Runtime::new()?;
    Ok(runtime.block_on(future))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Read an activity list from a JSON file, wrapped or bare.
pub fn read_activities(path: &Path) -> CliResult<ActivityList> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let mut list: ActivityList =
        serde_json::from_str(&content).map_err(|e| format!("{}: {e}", path.display()))?;
    list.sort_by_time();
    Ok(list)
}

pub fn write_activities(path: &Path, activities: &ActivityList) -> CliResult {
    std::fs::write(path, serde_json::to_string_pretty(activities)?)?;
    Ok(())
}

/// Orchestrator over the local database.
///
/// `response_file` swaps the configured generator for a canned answer,
/// which keeps the whole loop usable offline.
pub fn orchestrator(db: Database, response_file: Option<&Path>) -> CliResult<RegenerationOrchestrator<Database>> {
    let config = Config::load()?;
    let mut orchestrator = RegenerationOrchestrator::new(Arc::new(db))
        .with_timeout(Duration::from_secs(config.generator.timeout_secs));

    let generator: Option<Arc<dyn TextGenerator>> = match response_file {
        Some(path) => {
            let response = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
            let canned: Arc<dyn TextGenerator> = Arc::new(CannedGenerator::new(response));
            Some(canned)
        }
        None if config.has_generator() => {
            let api_key = credentials::generator_api_key(&config.generator.api_key_env)?;
            let http: Arc<dyn TextGenerator> = Arc::new(
                HttpTextGenerator::new(config.generator.endpoint.trim(), &config.generator.model).with_api_key(api_key),
            );
            Some(http)
        }
        None => None,
    };
    if let Some(generator) = generator {
        orchestrator = orchestrator.with_generator(generator);
    }
    Ok(orchestrator)
}
