// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
// =============================================================================

use clap::{Parser, Subcommand};
use site_guardian::DEFAULT_CONCURRENCY;
use std::path::PathBuf;

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "site-guardian",
    version,
    about = "Check a built static site for broken internal links and missing images",
    long_about = "site-guardian scans the HTML output of a static site generator and reports \
                  links to pages or anchors that do not exist, and images that are missing. \
                  It never touches the network, so it is fast enough to run on every CI build."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every internal link and local image of a built site
    ///
    /// Example: site-guardian check ./public --json
    Check {
        /// Directory containing the built site (e.g., ./public or ./dist)
        dir: PathBuf,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        /// How many files are parsed (and pages checked) at once
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,
    },

    /// Print the site index (pages, anchors, links, images) as JSON
    ///
    /// Useful to see how file paths were turned into page paths.
    ///
    /// Example: site-guardian index ./public
    Index {
        /// Directory containing the built site
        dir: PathBuf,

        /// How many files are parsed at once
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,
    },
}
