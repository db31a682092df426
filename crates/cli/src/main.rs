//! Cartwise CLI - Database migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (application schema + session store)
//! cartwise migrate
//!
//! # Create a shopper account
//! cartwise user create -e shopper@example.com -p 'long-password'
//!
//! # Browse the chat log
//! cartwise chat list --user shopper@example.com --search refund --limit 50
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create shopper accounts
//! - `chat list` - List chat records, newest first

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cartwise")]
#[command(author, version, about = "Cartwise operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage shopper accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Inspect the chat log
    Chat {
        #[command(subcommand)]
        action: ChatAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new shopper account
    Create {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum ChatAction {
    /// List chat records, newest first
    List {
        /// Only records owned by this email
        #[arg(short, long)]
        user: Option<String>,

        /// Case-insensitive match on request, response, or user email
        #[arg(short, long)]
        search: Option<String>,

        /// Maximum records to show
        #[arg(short, long, default_value_t = 100)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create { email, password } => {
                commands::user::create(&email, &password).await?;
            }
        },
        Commands::Chat { action } => match action {
            ChatAction::List {
                user,
                search,
                limit,
            } => {
                commands::chat::list(user.as_deref(), search, limit).await?;
            }
        },
    }
    Ok(())
}
