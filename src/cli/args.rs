//! Command-line argument parsing
//!
//! Clap-based CLI with subcommands and verbosity control.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// kbassist - answer product-support questions from the scraped KB
#[derive(Parser, Debug)]
#[command(name = "kbassist")]
#[command(version)]
#[command(about = "Hybrid KB retrieval and streaming answers for product support", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Force lexical search even when vector mode is configured
    #[arg(long)]
    pub lexical: bool,

    /// Verbosity: default (warn), -v (info), -vv (debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a question and stream the grounded answer
    Ask {
        /// The question to answer
        question: String,
    },

    /// Show the ranked KB articles for a query
    Search {
        /// The search query
        query: String,

        /// Result cap (configuration default when omitted)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Display the resolved configuration
    Config,
}
