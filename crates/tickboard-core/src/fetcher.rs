//! Remote calls against the dashboard API and normalization of their payloads.
//!
//! | Endpoint | Method | Result |
//! |----------|--------|--------|
//! | `/api/list` | [`DataFetcher::fetch_list`] | [`Catalog`] |
//! | `/api/history/{symbol}` | [`DataFetcher::fetch_history`] | [`HistoryPayload`] |
//! | `/api/predict/{symbol}` | [`DataFetcher::fetch_prediction`] | [`Prediction`] |
//!
//! Every call is a single attempt. Failures are reported, never retried.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::config::DashboardConfig;
use crate::domain::{parse_market_date, PriceHistory, PriceRow, Prediction, Range52, Symbol};
use crate::error::{CatalogLoadError, DataKind, FetchFailed, ValidationError};
use crate::http_client::{HttpClient, HttpRequest};

/// Normalized history response: the price series and its 52-week bounds,
/// which always travel together.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPayload {
    pub history: PriceHistory,
    pub range52: Range52,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    data: Vec<HistoryRow>,
    min52: f64,
    max52: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HistoryRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    predictions: Vec<PredictionPoint>,
}

#[derive(Debug, Deserialize)]
struct PredictionPoint {
    date: String,
    predicted_price: f64,
}

/// Stateless client for the three dashboard endpoints.
#[derive(Clone)]
pub struct DataFetcher {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: Option<u64>,
}

impl std::fmt::Debug for DataFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataFetcher")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl DataFetcher {
    pub fn new(http_client: Arc<dyn HttpClient>, config: &DashboardConfig) -> Self {
        Self {
            http_client,
            base_url: config.api_url.trim_end_matches('/').to_owned(),
            timeout_ms: config.request_timeout_ms,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/list` and build the catalog from it.
    pub async fn fetch_list(&self) -> Result<Catalog, CatalogLoadError> {
        let url = format!("{}/api/list", self.base_url);
        debug!(%url, "fetching catalog");

        let response = self.http_client.execute(self.request(url)).await?;
        if !response.is_success() {
            return Err(CatalogLoadError::Status {
                status: response.status,
            });
        }
        Catalog::from_json(&response.body)
    }

    /// `GET /api/history/{symbol}`.
    pub async fn fetch_history(&self, symbol: &Symbol) -> Result<HistoryPayload, FetchFailed> {
        let body = self.get_body(symbol, DataKind::History, "history").await?;
        let fail = |reason: String| FetchFailed::new(symbol.as_str(), DataKind::History, reason);

        let parsed: HistoryResponse =
            serde_json::from_str(&body).map_err(|e| fail(format!("invalid payload: {e}")))?;
        normalize_history(parsed).map_err(|e| fail(e.to_string()))
    }

    /// `GET /api/predict/{symbol}`.
    pub async fn fetch_prediction(&self, symbol: &Symbol) -> Result<Prediction, FetchFailed> {
        let body = self
            .get_body(symbol, DataKind::Prediction, "predict")
            .await?;
        let fail = |reason: String| FetchFailed::new(symbol.as_str(), DataKind::Prediction, reason);

        let parsed: PredictionResponse =
            serde_json::from_str(&body).map_err(|e| fail(format!("invalid payload: {e}")))?;
        normalize_prediction(parsed).map_err(|e| fail(e.to_string()))
    }

    async fn get_body(
        &self,
        symbol: &Symbol,
        kind: DataKind,
        route: &str,
    ) -> Result<String, FetchFailed> {
        let url = format!(
            "{}/api/{route}/{}",
            self.base_url,
            urlencoding::encode(symbol.as_str())
        );
        debug!(%url, %kind, "fetching item data");

        let response = self
            .http_client
            .execute(self.request(url))
            .await
            .map_err(|e| FetchFailed::new(symbol.as_str(), kind, format!("transport error: {e}")))?;

        if !response.is_success() {
            return Err(FetchFailed::new(
                symbol.as_str(),
                kind,
                format!("upstream returned status {}", response.status),
            ));
        }
        Ok(response.body)
    }

    fn request(&self, url: String) -> HttpRequest {
        HttpRequest::get(url)
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms)
    }
}

fn normalize_history(response: HistoryResponse) -> Result<HistoryPayload, ValidationError> {
    let rows = response
        .data
        .into_iter()
        .map(|row| {
            Ok(PriceRow {
                date: parse_market_date(&row.date)?,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
            })
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    Ok(HistoryPayload {
        history: PriceHistory::from_rows(rows)?,
        range52: Range52::new(response.min52, response.max52)?,
    })
}

fn normalize_prediction(response: PredictionResponse) -> Result<Prediction, ValidationError> {
    let points = response
        .predictions
        .into_iter()
        .map(|point| Ok((parse_market_date(&point.date)?, point.predicted_price)))
        .collect::<Result<Vec<_>, ValidationError>>()?;
    Prediction::from_points(points)
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::http_client::{FixtureHttpClient, HttpResponse};

    const HISTORY: &str = r#"{
        "data": [
            {"Date": "2024-01-01", "Open": 1, "High": 2, "Low": 0.5, "Close": 1.5,
             "Volume": 100},
            {"Date": "2024-01-02", "Open": 1.5, "High": 2.5, "Low": 1.0, "Close": 2.0,
             "Volume": 120}
        ],
        "min52": 0.5,
        "max52": 2.5
    }"#;

    const PREDICTION: &str = r#"{
        "predictions": [
            {"date": "2024-01-03", "predicted_price": 2.1},
            {"date": "2024-01-04", "predicted_price": 2.3}
        ]
    }"#;

    fn fetcher(client: FixtureHttpClient) -> DataFetcher {
        DataFetcher::new(Arc::new(client), &DashboardConfig::default())
    }

    fn aapl() -> Symbol {
        Symbol::new("AAPL").expect("valid symbol")
    }

    #[tokio::test]
    async fn history_rows_become_column_series_with_bounds() {
        let fetcher = fetcher(FixtureHttpClient::new().with_json("/api/history/AAPL", HISTORY));

        let payload = fetcher.fetch_history(&aapl()).await.expect("history parses");
        assert_eq!(
            payload.history.dates(),
            &[date!(2024 - 01 - 01), date!(2024 - 01 - 02)]
        );
        assert_eq!(payload.history.high(), &[2.0, 2.5]);
        assert_eq!(payload.history.low(), &[0.5, 1.0]);
        assert_eq!(payload.range52, Range52 { min: 0.5, max: 2.5 });
    }

    #[tokio::test]
    async fn prediction_points_are_normalized() {
        let fetcher = fetcher(FixtureHttpClient::new().with_json("/api/predict/AAPL", PREDICTION));

        let prediction = fetcher.fetch_prediction(&aapl()).await.expect("prediction parses");
        assert_eq!(prediction.prices(), &[2.1, 2.3]);
        assert_eq!(prediction.dates()[0], date!(2024 - 01 - 03));
    }

    #[tokio::test]
    async fn error_status_is_reported_as_fetch_failure() {
        let fetcher = fetcher(FixtureHttpClient::new().with_response(
            "/api/history/AAPL",
            HttpResponse::with_status(400, r#"{"detail":"invalid ticker"}"#),
        ));

        let error = fetcher.fetch_history(&aapl()).await.expect_err("400 fails");
        assert_eq!(error.kind, DataKind::History);
        assert_eq!(error.symbol, "AAPL");
        assert!(error.reason.contains("400"), "{}", error.reason);
    }

    #[tokio::test]
    async fn malformed_payload_is_reported_as_fetch_failure() {
        let fetcher = fetcher(
            FixtureHttpClient::new().with_json("/api/predict/AAPL", r#"{"predictions": 3}"#),
        );

        let error = fetcher.fetch_prediction(&aapl()).await.expect_err("bad shape");
        assert_eq!(error.kind, DataKind::Prediction);
        assert!(error.reason.contains("invalid payload"), "{}", error.reason);
    }

    #[tokio::test]
    async fn symbols_are_percent_encoded_in_paths() {
        let fetcher = fetcher(
            FixtureHttpClient::new()
                .with_json("/api/history/%5EGSPC", HISTORY)
                .with_json("/api/history/BTC_USD", HISTORY),
        );

        for key in ["^GSPC", "BTC_USD"] {
            let symbol = Symbol::new(key).expect("valid symbol");
            assert!(fetcher.fetch_history(&symbol).await.is_ok(), "{key}");
        }
    }

    #[tokio::test]
    async fn lowercase_key_is_requested_as_listed() {
        let fetcher = fetcher(FixtureHttpClient::new().with_json("/api/history/aapl", HISTORY));
        let symbol = Symbol::new("aapl").expect("valid symbol");
        assert!(fetcher.fetch_history(&symbol).await.is_ok());
    }

    #[tokio::test]
    async fn list_failure_status_is_a_load_error() {
        let fetcher = fetcher(
            FixtureHttpClient::new().with_response("/api/list", HttpResponse::with_status(503, "")),
        );
        assert_eq!(
            fetcher.fetch_list().await,
            Err(CatalogLoadError::Status { status: 503 })
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = DashboardConfig::default().with_api_url("http://localhost:8000/");
        let fetcher = DataFetcher::new(Arc::new(FixtureHttpClient::new()), &config);
        assert_eq!(fetcher.base_url(), "http://localhost:8000");
    }
}
