//! CLI argument definitions using clap
//!
//! Commands:
//! - orderdesk init --config <path>
//! - orderdesk serve --config <path>
//! - orderdesk import-products --config <path> --file <products.json>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// orderdesk - token-authenticated users, products and orders API
#[derive(Parser, Debug)]
#[command(name = "orderdesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the record directories under data_dir
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./orderdesk.json")]
        config: PathBuf,
    },

    /// Run the HTTP API
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./orderdesk.json")]
        config: PathBuf,
    },

    /// Load products from a JSON array file into the catalog
    ImportProducts {
        /// Path to configuration file
        #[arg(long, default_value = "./orderdesk.json")]
        config: PathBuf,

        /// JSON file holding `[{id, name, description, priceCents}]`
        #[arg(long)]
        file: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
