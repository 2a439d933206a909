use std::sync::Arc;

use tickboard_core::{DashboardConfig, DataFetcher, HttpClient, NavEntry};

use crate::error::CliError;
use crate::output::format_navigation;

pub async fn run(config: DashboardConfig, client: Arc<dyn HttpClient>) -> Result<(), CliError> {
    let catalog = DataFetcher::new(client, &config).fetch_list().await?;
    print!("{}", format_navigation(&NavEntry::from_catalog(&catalog)));
    Ok(())
}
