pub mod commands;
pub mod context;
pub mod output;

use clap::{Parser, Subcommand};

/// Organize certificate key lists by fingerprint, issuer and filter.
#[derive(Parser, Debug)]
#[command(name = "certlist", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to alternative config file
    #[arg(long, global = true, env = "CERTLIST_CONFIG")]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show certificates as a tree of issuer chains
    Tree {
        /// JSON keyring to read
        keyring: String,
        /// Feed the keyring to the tree in batches of this size
        #[arg(long)]
        batch_size: Option<usize>,
        /// Only show certificates matching this filter id
        #[arg(long)]
        filter: Option<String>,
        /// Only show certificates whose fingerprint or user ID contains this text
        #[arg(long)]
        search: Option<String>,
    },

    /// Show certificates as a flat list ordered by fingerprint
    List {
        /// JSON keyring to read
        keyring: String,
    },

    /// Show which filter classifies each certificate
    Classify {
        /// JSON keyring to read
        keyring: String,
        /// List every matching filter, not just the most specific one
        #[arg(long)]
        all: bool,
    },

    /// List the available key filters in priority order
    Filters,
}
