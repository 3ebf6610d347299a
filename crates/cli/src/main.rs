//! Folio CLI - database migrations and site management.
//!
//! # Usage
//!
//! ```bash
//! # Run site database migrations
//! folio-cli migrate
//!
//! # Load captcha icons from YAML
//! folio-cli icons seed crates/cli/seeds/captcha_icons.yaml
//!
//! # Show captcha icons
//! folio-cli icons list
//!
//! # Register a user for passwordless login
//! folio-cli users add -e me@example.com -n "Me" --phone "+44 20 7946 0018" -r phone
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "folio-cli")]
#[command(author, version, about = "Folio CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage captcha icons
    Icons {
        #[command(subcommand)]
        action: IconAction,
    },
    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum IconAction {
    /// Insert or update icons from a YAML file
    Seed {
        /// Path to the YAML file
        file: String,
    },
    /// List all icons
    List,
}

#[derive(Subcommand)]
enum UserAction {
    /// Add a user
    Add {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name shown next to comments
        #[arg(short, long, default_value = "")]
        name: String,

        /// Phone number for login codes
        #[arg(short, long)]
        phone: Option<String>,

        /// Where login codes are sent (`email` or `phone`)
        #[arg(short, long, default_value = "email")]
        route: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Icons { action } => match action {
            IconAction::Seed { file } => {
                commands::icons::seed(&file).await?;
            }
            IconAction::List => commands::icons::list().await?,
        },
        Commands::Users { action } => match action {
            UserAction::Add {
                email,
                name,
                phone,
                route,
            } => {
                commands::users::add(&email, &name, phone.as_deref(), &route).await?;
            }
        },
    }
    Ok(())
}
