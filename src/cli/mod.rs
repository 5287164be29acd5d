//! CLI module - Command-line interface for solestore
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// solestore - shoe storefront backend
#[derive(Parser)]
#[command(name = "solestore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    Init,

    /// Create an administrator account
    CreateAdmin {
        /// Display name (prompted when omitted)
        #[arg(long)]
        name: Option<String>,
        /// Email address (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
        /// Login name (prompted when omitted)
        #[arg(long)]
        username: Option<String>,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Password confirmation (prompted when omitted)
        #[arg(long)]
        confirm_password: Option<String>,
    },

    /// Write all orders to a CSV file
    ExportOrders {
        /// Destination file
        path: PathBuf,
    },
}

pub use commands::*;
