//! The rendering interface the core drives.
//!
//! The core never draws anything itself. A front end implements
//! [`PresentationSink`] and is handed to the dashboard at startup; the event
//! loop owns it from then on and calls it only from that loop.

use time::Date;

use crate::catalog::Catalog;
use crate::dashboard::Selector;
use crate::domain::{Item, Symbol};

/// One row of the navigation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub index: usize,
    pub symbol: Symbol,
    pub name: String,
}

impl NavEntry {
    pub fn from_catalog(catalog: &Catalog) -> Vec<Self> {
        catalog
            .iter()
            .map(|item| Self {
                index: item.id().index(),
                symbol: item.symbol().clone(),
                name: item.name().to_owned(),
            })
            .collect()
    }
}

/// Figures shown under the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub min52: f64,
    pub max52: f64,
    pub predicted_avg: Option<f64>,
    pub predicted_max: Option<f64>,
}

impl Summary {
    /// `None` until the item's history (and with it the 52-week range) is cached.
    pub fn for_item(item: &Item) -> Option<Self> {
        let range = item.range52()?;
        let prediction = item.prediction();
        Some(Self {
            min52: range.min,
            max52: range.max,
            predicted_avg: prediction.and_then(|p| p.average()),
            predicted_max: prediction.and_then(|p| p.max()),
        })
    }
}

pub trait PresentationSink: Send {
    /// Draw the navigation list. `selector` feeds clicks back into the core.
    fn render_navigation(&mut self, entries: &[NavEntry], selector: Selector);

    fn render_header(&mut self, name: &str, description: &str);

    /// Highlight the navigation entry at `index`.
    fn set_active_entry(&mut self, index: usize) {
        let _ = index;
    }

    /// Plot the daily high and low series.
    fn render_chart(&mut self, dates: &[Date], high: &[f64], low: &[f64]);

    fn render_summary(&mut self, summary: &Summary);
}

/// Push chart and summary for `item`. Returns `false` if it has no history yet.
pub(crate) fn render_item(sink: &mut dyn PresentationSink, item: &Item) -> bool {
    let (Some(history), Some(summary)) = (item.history(), Summary::for_item(item)) else {
        return false;
    };
    sink.render_chart(history.dates(), history.high(), history.low());
    sink.render_summary(&summary);
    true
}
