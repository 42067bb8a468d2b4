use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "feedwatch")]
#[command(about = "Keyword-filtered feed watcher with Slack notifications")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the stored settings and the last run time
    Settings,

    /// Store the Slack credentials and the poll interval
    Configure {
        /// Slack bot token (sent as the bearer credential)
        #[arg(long)]
        token: String,

        /// Slack channel id to deliver to
        #[arg(long)]
        channel: String,

        /// Poll interval in minutes
        #[arg(long, default_value_t = 30)]
        interval: u32,
    },

    /// Manage match keywords
    #[command(subcommand)]
    Keyword(KeywordCommands),

    /// Manage feed sources
    #[command(subcommand)]
    Source(SourceCommands),

    /// Poll all sources once, now
    Run,

    /// Poll on the configured interval until interrupted
    Watch,
}

#[derive(Subcommand)]
pub enum KeywordCommands {
    /// Add a keyword
    Add {
        /// Keyword to match against entry title and summary
        keyword: String,
    },

    /// Remove a keyword
    Remove {
        keyword: String,
    },

    /// List all keywords
    List,
}

#[derive(Subcommand)]
pub enum SourceCommands {
    /// Add a feed URL
    Add {
        /// Feed URL to poll
        url: String,
    },

    /// Remove a feed URL
    Remove {
        url: String,
    },

    /// List all feed URLs
    List,

    /// Import feed URLs from an OPML file
    Import {
        /// Path to OPML file
        path: String,
    },

    /// Export feed URLs to OPML format
    Export {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}
