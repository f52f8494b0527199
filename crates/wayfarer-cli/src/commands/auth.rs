//! Generator API key management.

use clap::Subcommand;
use wayfarer_core::credentials::{self, GENERATOR_API_KEY};
use wayfarer_core::Config;

use crate::common::CliResult;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store the generator API key in the OS keyring
    SetKey {
        /// API key
        key: String,
    },
    /// Remove the stored generator API key
    Clear,
    /// Show where the generator API key would come from
    Status,
}

pub fn run(action: AuthAction) -> CliResult {
    match action {
        AuthAction::SetKey { key } => {
            let key = key.trim();
            if key.is_empty() {
                return Err("API key must not be empty".into());
            }
            credentials::set(GENERATOR_API_KEY, key)?;
            println!("generator API key stored");
        }
        AuthAction::Clear => {
            credentials::delete(GENERATOR_API_KEY)?;
            println!("generator API key removed");
        }
        AuthAction::Status => {
            let config = Config::load()?;
            let env_var = &config.generator.api_key_env;
            let from_env = std::env::var(env_var).map(|v| !v.trim().is_empty()).unwrap_or(false);
            let source = if from_env {
                format!("environment ({env_var})")
            } else if credentials::get(GENERATOR_API_KEY)?.is_some() {
                "keyring".to_string()
            } else {
                "not configured".to_string()
            };
            println!("generator endpoint: {}", display_or_unset(&config.generator.endpoint));
            println!("api key: {source}");
        }
    }
    Ok(())
}

fn display_or_unset(value: &str) -> &str {
    if value.trim().is_empty() {
        "(unset)"
    } else {
        value
    }
}
