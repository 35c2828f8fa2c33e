//! CLI argument definitions for the Squad binary.

use clap::{Parser, Subcommand};

/// Squad sales-incentive dashboard server
#[derive(Parser, Debug)]
#[command(name = "squad")]
#[command(about = "Squad: sales-incentive dashboard gateway")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the dashboard server
    Serve(ServeArgs),
    /// Check health of a running server
    Health(HealthArgs),
    /// Issue a session token for an account
    Token(TokenArgs),
}

/// Session signing and domain policy, shared by `serve` and `token`
#[derive(clap::Args, Debug)]
pub struct SessionArgs {
    /// Secret used to sign session tokens
    #[arg(long, env = "SQUAD_SESSION_SECRET", hide_env_values = true)]
    pub session_secret: String,

    /// Comma-separated email domains allowed to sign in
    #[arg(long, default_value = "cronberry.com", env = "ALLOWED_GOOGLE_WORKSPACE_DOMAIN")]
    pub allowed_domains: String,

    /// Session lifetime in days
    #[arg(long, default_value_t = 30, env = "SQUAD_SESSION_MAX_AGE_DAYS")]
    pub session_max_age_days: u64,

    /// Mark the session cookie Secure (serve behind HTTPS)
    #[arg(long, env = "SQUAD_SECURE_COOKIES")]
    pub secure_cookies: bool,
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "SQUAD_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "SQUAD_HOST")]
    pub host: String,

    /// Apps Script exec URL serving the sales data
    #[arg(long, env = "SQUAD_BACKEND_URL")]
    pub backend_url: String,

    /// Timeout in seconds for a single backend request
    #[arg(long, default_value_t = 10, env = "SQUAD_BACKEND_TIMEOUT_SECS")]
    pub backend_timeout: u64,

    /// Seconds before cached backend data is refetched
    #[arg(long, default_value_t = 900, env = "SQUAD_STALE_AFTER_SECS")]
    pub stale_after: u64,

    /// Retries after a failed backend request
    #[arg(long, default_value_t = 3, env = "SQUAD_MAX_RETRIES")]
    pub max_retries: u32,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Port of the server to check
    #[arg(short, long, default_value_t = 3000, env = "SQUAD_PORT")]
    pub port: u16,

    /// Host of the server to check
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Arguments for the token command
#[derive(clap::Args, Debug)]
pub struct TokenArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Account email
    #[arg(long)]
    pub email: String,

    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Subject identifier; defaults to the email
    #[arg(long)]
    pub subject: Option<String>,
}
