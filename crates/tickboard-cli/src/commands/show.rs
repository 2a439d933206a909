use std::io;
use std::sync::Arc;
use std::time::Duration;

use tickboard_core::{
    Catalog, Dashboard, DashboardConfig, DashboardHandle, DataKind, HttpClient, Item,
};
use tracing::info;

use crate::cli::ShowArgs;
use crate::error::CliError;
use crate::output::TextSink;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

pub async fn run(
    args: &ShowArgs,
    config: DashboardConfig,
    client: Arc<dyn HttpClient>,
) -> Result<(), CliError> {
    let handle = Dashboard::start(config, client, Box::new(TextSink::new(io::stdout()))).await?;

    let catalog = handle.snapshot().await?;
    let index = resolve(&catalog, &args.target)?;
    info!(index, symbol = %catalog.get(index).symbol(), "showing item");
    handle.select(index)?;

    let item = wait_for_item(&handle, index).await?;
    if item.failed(DataKind::History) {
        println!("No price data available for {}", item.symbol());
    }
    handle.shutdown().await?;
    Ok(())
}

/// A navigation index, then an exact symbol, then a symbol that matches
/// ignoring ASCII case as long as only one does.
fn resolve(catalog: &Catalog, target: &str) -> Result<usize, CliError> {
    if let Ok(index) = target.parse::<usize>() {
        if catalog.try_get(index).is_some() {
            return Ok(index);
        }
    }
    if let Some(index) = catalog.position(target) {
        return Ok(index);
    }

    let mut folded = catalog
        .iter()
        .filter(|item| item.symbol().as_str().eq_ignore_ascii_case(target))
        .map(|item| item.id().index());
    match (folded.next(), folded.next()) {
        (Some(index), None) => Ok(index),
        _ => Err(CliError::UnknownItem {
            target: target.to_owned(),
        }),
    }
}

/// Polls until the history has settled and, when it succeeded, the
/// prediction too. Waits as long as the backend does.
async fn wait_for_item(handle: &DashboardHandle, index: usize) -> Result<Item, CliError> {
    loop {
        let catalog = handle.snapshot().await?;
        let item = catalog.get(index);
        if item.failed(DataKind::History) || (item.is_fetched() && prediction_settled(item)) {
            return Ok(item.clone());
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

fn prediction_settled(item: &Item) -> bool {
    item.prediction().is_some() || item.failed(DataKind::Prediction)
}

#[cfg(test)]
mod tests {
    use tickboard_core::FixtureHttpClient;

    use super::*;

    const LIST: &str = r#"{
        "AAA": {"company": "Alpha Co", "sector": "Tech"},
        "BBB": {"company": "Beta Co", "sector": "Energy"},
        "7203.T": {"company": "Toyota Motor Corp.", "sector": "Automotive"},
        "abc": {"company": "Lower Co", "sector": "Retail"},
        "ABC": {"company": "Upper Co", "sector": "Retail"}
    }"#;

    fn catalog() -> Catalog {
        Catalog::from_json(LIST).expect("valid list payload")
    }

    #[test]
    fn resolves_index_then_symbol() {
        let catalog = catalog();
        assert_eq!(resolve(&catalog, "1").expect("index"), 1);
        assert_eq!(resolve(&catalog, "bbb").expect("case-folded symbol"), 1);
        assert_eq!(resolve(&catalog, "7203.T").expect("symbol"), 2);
        assert_eq!(resolve(&catalog, "abc").expect("exact symbol"), 3);
        assert_eq!(resolve(&catalog, "ABC").expect("exact symbol"), 4);
    }

    #[test]
    fn unknown_or_ambiguous_targets_are_rejected() {
        let catalog = catalog();
        for target in ["7", "ZZZ", "Abc"] {
            assert!(
                matches!(resolve(&catalog, target), Err(CliError::UnknownItem { .. })),
                "{target}"
            );
        }
    }

    #[tokio::test]
    async fn show_finishes_when_history_fails() {
        let client = FixtureHttpClient::new()
            .with_json("/api/list", LIST)
            .with_json("/api/predict/BBB", r#"{"predictions": []}"#);
        let args = ShowArgs {
            target: String::from("BBB"),
        };

        run(&args, DashboardConfig::default(), Arc::new(client))
            .await
            .expect("a missing history is reported, not an error");
    }

    #[tokio::test]
    async fn show_finishes_once_both_requests_report() {
        let client = FixtureHttpClient::new()
            .with_json("/api/list", LIST)
            .with_json(
                "/api/history/AAA",
                r#"{
                    "data": [{"Date": "2024-01-01", "Open": 1, "High": 2, "Low": 0.5,
                              "Close": 1.5}],
                    "min52": 0.5,
                    "max52": 2
                }"#,
            )
            .with_json(
                "/api/predict/AAA",
                r#"{"predictions":[{"date":"2024-01-02","predicted_price":2.5}]}"#,
            );
        let args = ShowArgs {
            target: String::from("0"),
        };

        run(&args, DashboardConfig::default(), Arc::new(client))
            .await
            .expect("item rendered");
    }
}
