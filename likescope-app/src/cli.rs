use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Fetch and chart tweet engagement for a set of accounts.
#[derive(Debug, Parser)]
#[command(name = "likescope", version)]
pub struct Cli {
    /// Settings file; skipped when the default one is absent.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Bearer token, taking precedence over the config file and TWITTERTOKEN.
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collect tweets for comma-separated handles inside a date window.
    Fetch {
        #[arg(long)]
        handles: String,
        /// First day, inclusive (YYYY-MM-DD).
        #[arg(long)]
        start: String,
        /// Upper bound (YYYY-MM-DD); omitted means up to now.
        #[arg(long)]
        end: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Fail instead of reporting accounts whose timeline could not be read.
        #[arg(long)]
        strict: bool,
    },
    /// Resolve handles to ids and baseline metrics.
    Accounts {
        #[arg(long)]
        handles: String,
    },
    /// Print the oEmbed HTML for one post.
    Embed {
        #[arg(long)]
        account: String,
        #[arg(long)]
        id: String,
    },
    /// Run the browser dashboard.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}
