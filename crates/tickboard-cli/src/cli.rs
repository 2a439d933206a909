//! CLI argument definitions for tickboard.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `list` | Print the navigation list |
//! | `show` | Select one item and print its chart and summary |
//! | `prefetch` | Run the background prefetch pass and report each item |
//!
//! # Global Options
//!
//! Each option overrides the matching `TICKBOARD_*` environment variable.
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--api-url` | `http://backend:8000` | Backend base URL |
//! | `--stagger-ms` | `300` | Delay between background prefetches |
//! | `--timeout-ms` | none | Per-request timeout |

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tickboard_core::DashboardConfig;

#[derive(Debug, Parser)]
#[command(
    name = "tickboard",
    author,
    version,
    about = "Ticker dashboard in the terminal",
    long_about = "Browse the ticker catalog served by the tickboard backend, view an item's \
price history and forecast summary, or warm every item with a staggered prefetch pass.\n\
\n\
Set RUST_LOG (e.g. RUST_LOG=tickboard_core=debug) for diagnostics on stderr."
)]
pub struct Cli {
    /// Backend base URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Delay between background prefetches in milliseconds.
    #[arg(long, global = true)]
    pub stagger_ms: Option<u64>,

    /// Per-request timeout in milliseconds. Without it a slow backend is
    /// waited on.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Environment defaults with any flags applied on top.
    pub fn config(&self) -> DashboardConfig {
        let mut config = DashboardConfig::from_env();
        if let Some(url) = &self.api_url {
            config = config.with_api_url(url.clone());
        }
        if let Some(ms) = self.stagger_ms {
            config = config.with_prefetch_stagger(Duration::from_millis(ms));
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_request_timeout_ms(ms);
        }
        config
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every item in catalog order.
    ///
    ///   tickboard list
    List,

    /// Select one item and print its header, price history and summary.
    ///
    ///   tickboard show AAPL
    ///   tickboard show 3
    Show(ShowArgs),

    /// Fetch every item at the configured stagger and print a report.
    ///
    ///   tickboard prefetch --stagger-ms 100
    Prefetch,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Symbol (case-insensitive) or navigation index.
    pub target: String,
}
