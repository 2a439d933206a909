mod list;
mod prefetch;
mod show;

use std::sync::Arc;

use tickboard_core::{HttpClient, ReqwestHttpClient};
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = cli.config();
    debug!(?config, "resolved configuration");
    let client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());

    match &cli.command {
        Command::List => list::run(config, client).await,
        Command::Show(args) => show::run(args, config, client).await,
        Command::Prefetch => prefetch::run(config, client).await,
    }
}
