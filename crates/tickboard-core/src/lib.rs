//! # Tickboard Core
//!
//! Client-side data orchestration for the tickboard ticker dashboard.
//!
//! ## Overview
//!
//! - **Catalog** of tradable items loaded once from the list endpoint
//! - **Fetcher** for per-item price history and price predictions
//! - **Prefetch scheduler** that walks the catalog at a fixed stagger
//! - **View controller** that keeps the displayed item in sync with data that
//!   arrives out of order
//!
//! Rendering is not done here. Front ends implement [`PresentationSink`].
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`catalog`] | Ordered items and their cached data |
//! | [`config`] | API URL, stagger interval, request timeout |
//! | [`dashboard`] | Event loop and the handle used to drive it |
//! | [`domain`] | Symbols, items and price series |
//! | [`error`] | Error taxonomy |
//! | [`fetcher`] | Remote calls and payload normalization |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`scheduler`] | Staggered background prefetch |
//! | [`sink`] | Presentation interface |
//! | [`view`] | Active-selection state machine |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickboard_core::{Dashboard, DashboardConfig, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handle = Dashboard::start(
//!         DashboardConfig::from_env(),
//!         Arc::new(ReqwestHttpClient::new()),
//!         Box::new(MySink::default()),
//!     )
//!     .await?;
//!
//!     handle.select(0)?;
//!     handle.wait_until_settled().await?;
//!     handle.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! A malformed or unreachable list endpoint fails [`Dashboard::start`] with a
//! [`CatalogLoadError`]. Per-item failures never surface as errors: they are
//! logged, the item keeps its missing fields, and no request is retried. A
//! failed history leaves the item [`FetchState::NotFetched`]; a failed
//! prediction only leaves the prediction absent.

pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod scheduler;
pub mod sink;
pub mod view;

pub use catalog::Catalog;

pub use config::DashboardConfig;

pub use dashboard::{Dashboard, DashboardHandle, Selector};

pub use domain::{
    parse_market_date, FetchState, Item, ItemId, ItemMeta, PriceHistory, PriceRow, Prediction,
    Range52, Symbol,
};

pub use error::{CatalogLoadError, CoreError, DataKind, FetchFailed, ValidationError};

pub use fetcher::{DataFetcher, HistoryPayload};

pub use http_client::{
    FixtureHttpClient, HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};

pub use scheduler::{PrefetchPlan, PrefetchScheduler, ScheduledFetch};

pub use sink::{NavEntry, PresentationSink, Summary};

pub use view::{Selection, ViewController, ViewState};
