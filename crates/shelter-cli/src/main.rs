//! Shelter CLI
//!
//! Command-line interface for Shelter - track the pets in an animal shelter.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use shelter_core::{Column, Config, Gender, PetProvider, ShelterError};

mod commands;
mod editor;
mod output;

use commands::pet::PetFields;
use output::{Output, OutputFormat};

/// Environment variable holding a tracing filter, e.g. `shelter_core=debug`
const LOG_ENV: &str = "SHELTER_LOG";

#[derive(Parser)]
#[command(name = "shelter")]
#[command(about = "Shelter - Track the pets in an animal shelter")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all pets
    #[command(alias = "ls")]
    List {
        /// Column to sort by (id, name, breed, gender, weight)
        #[arg(short, long)]
        sort: Option<Column>,
        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
    },
    /// Show pet details
    Show {
        /// Pet ID
        id: i64,
    },
    /// Add a pet
    #[command(alias = "create")]
    Add {
        /// Name of the pet
        #[arg(short, long)]
        name: String,
        /// Breed of the pet
        #[arg(short, long)]
        breed: Option<String>,
        /// Gender (unknown, male, female or 0, 1, 2)
        #[arg(short, long)]
        gender: Option<Gender>,
        /// Weight in kg
        #[arg(short, long)]
        weight: Option<i64>,
    },
    /// Edit a pet; only the given fields change
    Edit {
        /// Pet ID
        id: i64,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New breed (empty to clear)
        #[arg(short, long)]
        breed: Option<String>,
        /// New gender
        #[arg(short, long)]
        gender: Option<Gender>,
        /// New weight in kg
        #[arg(short, long)]
        weight: Option<i64>,
    },
    /// Delete a pet
    #[command(alias = "rm")]
    Delete {
        /// Pet ID
        id: i64,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete all pets
    DeleteAll {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Insert a sample pet
    Seed,
    /// Show status (database, schema version, pet count)
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, authority, log_level)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    if let Err(e) = run(cli.command, &output) {
        eprintln!("Error: {:#}", e);
        if let Some(hint) = e
            .downcast_ref::<ShelterError>()
            .and_then(ShelterError::recovery_suggestion)
        {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

fn run(command: Commands, output: &Output) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    init_logging(&config.log_level);

    // Commands that don't need the store
    let command = match command {
        Commands::Config { command } => return handle_config_command(command, output),
        command => command,
    };

    let provider = PetProvider::open(&config);

    let result = match command {
        Commands::List { sort, desc } => commands::pet::list(&provider, sort, desc, output),
        Commands::Show { id } => commands::pet::show(&provider, id, output),
        Commands::Add {
            name,
            breed,
            gender,
            weight,
        } => {
            let fields = PetFields {
                name: Some(name),
                breed,
                gender,
                weight,
            };
            commands::pet::add(&provider, fields, output)
        }
        Commands::Edit {
            id,
            name,
            breed,
            gender,
            weight,
        } => {
            let fields = PetFields {
                name,
                breed,
                gender,
                weight,
            };
            commands::pet::edit(&provider, id, fields, output)
        }
        Commands::Delete { id, yes } => commands::pet::delete(&provider, id, yes, output),
        Commands::DeleteAll { yes } => commands::pet::delete_all(&provider, yes, output),
        Commands::Seed => commands::pet::seed(&provider, output),
        Commands::Status => commands::status::show(&provider, output),
        Commands::Config { .. } => unreachable!(), // Handled above
    };

    if let Err(e) = provider.store().close() {
        warn!("Failed to close database: {}", e);
    }

    result
}

fn handle_config_command(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(output),
        Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, output),
    }
}

/// Log to stderr so JSON on stdout stays clean
///
/// `SHELTER_LOG` takes precedence over the configured level.
fn init_logging(log_level: &str) {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(format!("shelter_core={},shelter={}", log_level, log_level))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
