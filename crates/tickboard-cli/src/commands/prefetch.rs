use std::io;
use std::sync::Arc;

use tickboard_core::{Dashboard, DashboardConfig, HttpClient};
use tracing::info;

use crate::error::CliError;
use crate::output::{format_report, TextSink};

pub async fn run(config: DashboardConfig, client: Arc<dyn HttpClient>) -> Result<(), CliError> {
    let stagger = config.prefetch_stagger;
    let handle = Dashboard::start(config, client, Box::new(TextSink::new(io::stdout()))).await?;

    let catalog = handle.snapshot().await?;
    info!(
        items = catalog.len(),
        stagger_ms = stagger.as_millis() as u64,
        "prefetching catalog"
    );

    handle.wait_until_settled().await?;
    let catalog = handle.snapshot().await?;
    print!("{}", format_report(&catalog));

    handle.shutdown().await?;
    Ok(())
}
