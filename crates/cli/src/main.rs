//! Shopfront CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations (including the session table)
//! shopfront-cli migrate
//!
//! # Insert demo products
//! shopfront-cli seed
//!
//! # Create a staff user
//! shopfront-cli user create -e admin@example.com -p 'long password' --staff
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the catalog with demo products
//! - `user create` / `user staff` - Manage accounts

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shopfront-cli")]
#[command(author, version, about = "Shopfront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog with demo products
    Seed,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Allow the user into the admin
        #[arg(long)]
        staff: bool,
    },
    /// Grant or revoke admin access
    Staff {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Remove admin access instead of granting it
        #[arg(long)]
        revoke: bool,
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
        Commands::Seed => commands::seed::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                password,
                staff,
            } => {
                commands::user::create(&email, &password, staff).await?;
            }
            UserAction::Staff { email, revoke } => {
                commands::user::set_staff(&email, !revoke).await?;
            }
        },
    }
    Ok(())
}
