use clap::{Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "wayfarer", version, about = "Wayfarer adaptive itinerary CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trip management
    Trip {
        #[command(subcommand)]
        action: commands::trip::TripAction,
    },
    /// Day plan management
    Day {
        #[command(subcommand)]
        action: commands::day::DayAction,
    },
    /// Mood classification and reports
    Mood {
        #[command(subcommand)]
        action: commands::mood::MoodAction,
    },
    /// Feed a weather observation into the adaptive loop
    Signal {
        #[command(subcommand)]
        action: commands::signal::SignalAction,
    },
    /// Ask for a revised day plan without saving it
    Chat(commands::chat::ChatArgs),
    /// Compare a day plan against a proposed activity list
    Diff(commands::diff::DiffArgs),
    /// Merge a proposed activity list into a day plan slot by slot
    Reconcile(commands::reconcile::ReconcileArgs),
    /// Country and city reference data
    Geo {
        #[command(subcommand)]
        action: commands::geo::GeoAction,
    },
    /// Audit log
    Audit {
        #[command(subcommand)]
        action: commands::audit::AuditAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generator API key management
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
}

fn main() {
    let cli = Cli::parse();
    common::init_logging();

    let result = match cli.command {
        Commands::Trip { action } => commands::trip::run(action),
        Commands::Day { action } => commands::day::run(action),
        Commands::Mood { action } => commands::mood::run(action),
        Commands::Signal { action } => commands::signal::run(action),
        Commands::Chat(args) => commands::chat::run(args),
        Commands::Diff(args) => commands::diff::run(args),
        Commands::Reconcile(args) => commands::reconcile::run(args),
        Commands::Geo { action } => commands::geo::run(action),
        Commands::Audit { action } => commands::audit::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Auth { action } => commands::auth::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
