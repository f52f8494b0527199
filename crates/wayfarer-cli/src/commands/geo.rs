//! Country and city reference data.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use clap::Subcommand;
use wayfarer_core::{Config, FixtureGeo, GeoDirectory};

use crate::common::{block_on, print_json, CliResult};

#[derive(Subcommand)]
pub enum GeoAction {
    /// List countries, sorted by name
    Countries {
        /// JSON file with countries and cities
        #[arg(long)]
        fixture: PathBuf,
    },
    /// List the cities of a country
    Cities {
        /// Country name or ISO code
        country: String,
        /// JSON file with countries and cities
        #[arg(long)]
        fixture: PathBuf,
    },
}

fn directory(fixture: &Path) -> CliResult<GeoDirectory> {
    let config = Config::load()?;
    let source = FixtureGeo::load(fixture)?;
    Ok(GeoDirectory::from_config(Arc::new(source), &config.cache))
}

pub fn run(action: GeoAction) -> CliResult {
    match action {
        GeoAction::Countries { fixture } => {
            let countries = block_on(directory(&fixture)?.countries(Utc::now()))??;
            print_json(&countries)
        }
        GeoAction::Cities { country, fixture } => {
            let cities = block_on(directory(&fixture)?.cities(&country, Utc::now()))??;
            print_json(&cities)
        }
    }
}
