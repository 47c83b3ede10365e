//! CLI administration tool for linkcache.
//!
//! Creates and resolves short codes through the same services the HTTP server
//! uses, and performs database diagnostics.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL that expires in one hour
//! cargo run --bin admin -- shorten https://example.com/some/long/path --expire-in 60
//!
//! # Resolve a short code
//! cargo run --bin admin -- resolve X088r5mw
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; see [`linkcache::config`]. Redis is used when configured
//! so cached and rate-limit state is shared with running servers.

use linkcache::AppError;
use linkcache::config::{self, Config};
use linkcache::server::{build_state, connect_database};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;

/// CLI tool for managing linkcache.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Create a short code for a URL
    Shorten {
        /// URL to shorten
        url: String,

        /// Lifetime in minutes (0 = never expires)
        #[arg(short, long, default_value_t = 0)]
        expire_in: i64,

        /// Caller identity mixed into the code
        #[arg(short, long, default_value = "admin-cli")]
        identity: String,
    },

    /// Resolve a short code to its URL
    Resolve {
        /// Short code
        code: String,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let pool = connect_database(&config).await?;

    match cli.command {
        Commands::Shorten {
            url,
            expire_in,
            identity,
        } => shorten(&config, pool, &url, expire_in, &identity).await?,
        Commands::Resolve { code } => resolve(&config, pool, &code).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Creates a short code and prints it with its expiry.
async fn shorten(
    config: &Config,
    pool: PgPool,
    url: &str,
    expire_in: i64,
    identity: &str,
) -> Result<()> {
    println!("{}", "🔗 Shorten URL".bright_blue().bold());
    println!();

    let state = build_state(config, pool).await;

    match state
        .shortener
        .create_short_url(url, expire_in, identity)
        .await
    {
        Ok(shortened) => {
            println!("  URL:     {}", url.cyan());
            println!(
                "  Short:   {}{}",
                config.short_url_prefix,
                shortened.code.bright_yellow().bold()
            );
            println!("  Expires: {}", shortened.expiry_message.bright_white());
            println!();
            println!("{}", "✅ Short code created".green().bold());
        }
        Err(AppError::Collision { .. }) => {
            println!(
                "{}",
                "⚠️  Generated code is already in use, try again".yellow()
            );
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to shorten URL: {}", e)),
    }
    println!();

    Ok(())
}

/// Resolves a short code and prints the stored record.
async fn resolve(config: &Config, pool: PgPool, code: &str) -> Result<()> {
    println!("{}", "🔍 Resolve short code".bright_blue().bold());
    println!();

    let state = build_state(config, pool).await;

    match state.shortener.get_url_by_code(code).await {
        Ok(record) => {
            println!("  Code:    {}", record.short_code.cyan());
            println!("  URL:     {}", record.original_url.bright_white());
            println!(
                "  Created: {}",
                record
                    .created_at
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
                    .bright_black()
            );
            let expires = if record.has_expiration() {
                record.expire_at.format("%Y-%m-%d %H:%M:%S").to_string()
            } else {
                "never".to_string()
            };
            println!("  Expires: {}", expires.bright_black());
        }
        Err(AppError::NotFound { .. }) => {
            println!("{}", "❌ Short code not found".red());
        }
        Err(AppError::Expired { .. }) => {
            println!("{}", "⌛ Short code has expired".yellow());
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to resolve code: {}", e)),
    }
    println!();

    Ok(())
}

/// Displays link counts.
///
/// Shows:
/// - Total number of links
/// - Links that never expire
/// - Links already past their expiry
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
        .fetch_one(pool)
        .await?;

    let permanent: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE expire_at = created_at")
            .fetch_one(pool)
            .await?;

    let expired: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM urls WHERE expire_at <> created_at AND expire_at < NOW()",
    )
    .fetch_one(pool)
    .await?;

    println!("  Links:     {}", total.to_string().bright_green().bold());
    println!(
        "  Permanent: {}",
        permanent.to_string().bright_green().bold()
    );
    println!("  Expired:   {}", expired.to_string().yellow().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
        DbAction::Migrate => {
            println!("{}", "🛠  Applying migrations...".bright_blue());

            sqlx::migrate!("./migrations").run(pool).await?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}
