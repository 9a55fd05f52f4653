//! CLI argument definitions using clap
//!
//! Commands:
//! - mangastore init --config <path>
//! - mangastore add --config <path>            (record JSON on stdin)
//! - mangastore get <term> --config <path>
//! - mangastore update <term> --config <path>  (patch JSON on stdin)
//! - mangastore delete <term> --config <path>
//! - mangastore list --config <path>
//! - mangastore import <file> --config <path>
//! - mangastore titles --config <path>
//! - mangastore reindex --config <path>
//! - mangastore stats --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mangastore - a persistent, indexed manga catalog
#[derive(Parser, Debug)]
#[command(name = "mangastore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and empty catalog files
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./mangastore.json")]
        config: PathBuf,
    },

    /// Add one record read as JSON from stdin
    Add {
        /// Path to configuration file
        #[arg(long, default_value = "./mangastore.json")]
        config: PathBuf,
    },

    /// Show the record matching a key, title or title fragment
    Get {
        /// Key, title or part of a title
        term: String,
        /// Path to configuration file
        #[arg(long, default_value = "./mangastore.json")]
        config: PathBuf,
    },

    /// Apply a JSON patch from stdin to the matching record
    Update {
        /// Key, title or part of a title
        term: String,
        /// Path to configuration file
        #[arg(long, default_value = "./mangastore.json")]
        config: PathBuf,
    },

    /// Soft-delete the matching record
    Delete {
        /// Key, title or part of a title
        term: String,
        /// Path to configuration file
        #[arg(long, default_value = "./mangastore.json")]
        config: PathBuf,
    },

    /// List active records in storage order
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./mangastore.json")]
        config: PathBuf,
    },

    /// Bulk import a `;` delimited text file
    Import {
        /// Text file, one record per line
        file: PathBuf,
        /// Path to configuration file
        #[arg(long, default_value = "./mangastore.json")]
        config: PathBuf,
    },

    /// Dump the title index with normalized forms
    Titles {
        /// Path to configuration file
        #[arg(long, default_value = "./mangastore.json")]
        config: PathBuf,
    },

    /// Rebuild both indexes from the data file
    Reindex {
        /// Path to configuration file
        #[arg(long, default_value = "./mangastore.json")]
        config: PathBuf,
    },

    /// Show index and data file counts
    Stats {
        /// Path to configuration file
        #[arg(long, default_value = "./mangastore.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
