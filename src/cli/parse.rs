//! CLI parse: clap types for upspin-ui. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// upspin-ui - browse and manage an Upspin namespace
#[derive(Parser)]
#[command(name = "upspin-ui")]
#[command(about = "Browse, copy and remove trees in an Upspin namespace")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Act as this user instead of the configured one
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Namespace store directory (overrides storage.store_path)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a configuration for a user and create their root directory
    Init {
        /// User name, e.g. ann@example.com
        user: String,
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// List a directory, or describe a single entry
    Ls {
        /// Upspin path, e.g. ann@example.com/dir
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Create a directory
    Mkdir { path: String },
    /// Copy files, links and directory trees into a directory
    Cp {
        /// Sources followed by the destination directory
        #[arg(required = true, num_args = 2..)]
        paths: Vec<String>,
    },
    /// Remove files, links and directory trees
    Rm {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Store a local file at an Upspin path
    Put {
        path: String,
        /// Local file to read
        file: PathBuf,
    },
    /// Read a file's content
    Get {
        path: String,
        /// Write the content to this local file instead of standard output
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Create a link pointing at a target
    Ln { target: String, link: String },
    /// Show the effective configuration
    Config {
        /// Print the global config file location instead
        #[arg(long)]
        path: bool,
    },
}
