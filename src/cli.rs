//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Download a web page for offline viewing.
///
/// Page loader saves the page at URL together with the images, stylesheets
/// and scripts it loads from the same origin, and rewrites the page so it
/// uses the local copies.
#[derive(Parser, Debug)]
#[command(name = "page-loader")]
#[command(author, version, about)]
pub struct Args {
    /// Page to download (http or https)
    pub url: String,

    /// Output directory (must already exist) [default: current directory]
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Maximum concurrent resource downloads and writes (1-100) [default: 10]
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: Option<u8>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
