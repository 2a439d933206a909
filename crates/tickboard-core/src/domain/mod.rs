//! # Domain Models
//!
//! Value types shared by the catalog, the fetcher and the presentation layer.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | List payload key, kept verbatim |
//! | [`Item`] | One catalog entry with its cached data |
//! | [`ItemId`] | Stable catalog position of an item |
//! | [`FetchState`] | Monotonic fetched flag |
//! | [`PriceHistory`] | Column-oriented daily OHLC series |
//! | [`Range52`] | 52-week low/high bounds |
//! | [`Prediction`] | Forecast dates and prices |
//!
//! Series types validate their invariants at construction: finite prices and
//! chronologically ordered dates.

mod item;
mod series;
mod symbol;

pub use item::{FetchState, Item, ItemId, ItemMeta};
pub use series::{parse_market_date, PriceHistory, PriceRow, Prediction, Range52};
pub use symbol::Symbol;
