//! Plain-text rendering.
//!
//! Figures are printed with four decimals, matching the web dashboard.

use std::io::Write;

use time::Date;
use tracing::warn;

use tickboard_core::{Catalog, Item, NavEntry, PresentationSink, Selector, Summary};

/// Number of trailing history rows printed under the chart line.
const CHART_TAIL: usize = 5;

pub fn format_navigation(entries: &[NavEntry]) -> String {
    let width = entries
        .iter()
        .map(|entry| entry.symbol.as_str().len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "{:>3}  {:<width$}  {}\n",
            entry.index,
            entry.symbol.as_str(),
            entry.name
        ));
    }
    out
}

pub fn format_summary(summary: &Summary) -> String {
    let mut out = format!(
        "52-Week Low: {:.4} | 52-Week High: {:.4}",
        summary.min52, summary.max52
    );
    if let (Some(avg), Some(max)) = (summary.predicted_avg, summary.predicted_max) {
        out.push_str(&format!("\nPredicted Avg: {avg:.4} | Max Pred: {max:.4}"));
    }
    out
}

pub fn format_chart(dates: &[Date], high: &[f64], low: &[f64]) -> String {
    let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
        return String::from("No price history\n");
    };
    let mut out = format!("Price history: {} days, {first} to {last}\n", dates.len());
    let skip = dates.len().saturating_sub(CHART_TAIL);
    for ((date, high), low) in dates.iter().zip(high).zip(low).skip(skip) {
        out.push_str(&format!("  {date}  high {high:.4}  low {low:.4}\n"));
    }
    out
}

/// One line per item after a prefetch pass.
pub fn format_report(catalog: &Catalog) -> String {
    let mut out = String::new();
    for item in catalog.iter() {
        out.push_str(&format!(
            "{:>3}  {:<8} {}\n",
            item.id().index(),
            item.symbol().as_str(),
            report_status(item)
        ));
    }
    out.push_str(&format!(
        "{} of {} items fetched\n",
        catalog.fetched_count(),
        catalog.len()
    ));
    out
}

fn report_status(item: &Item) -> String {
    let Some(summary) = Summary::for_item(item) else {
        return String::from("unavailable");
    };
    match summary.predicted_avg {
        Some(avg) => format!(
            "low {:.4}  high {:.4}  predicted avg {avg:.4}",
            summary.min52, summary.max52
        ),
        None => format!("low {:.4}  high {:.4}", summary.min52, summary.max52),
    }
}

/// [`PresentationSink`] that writes each render call as text.
pub struct TextSink<W> {
    out: W,
    failed: bool,
}

impl<W: Write + Send> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, failed: false }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if self.failed {
            return;
        }
        if let Err(error) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            warn!(%error, "output closed; further rendering dropped");
            self.failed = true;
        }
    }
}

impl<W: Write + Send> PresentationSink for TextSink<W> {
    fn render_navigation(&mut self, entries: &[NavEntry], _selector: Selector) {
        self.emit(&format_navigation(entries));
        self.emit("\n");
    }

    fn render_header(&mut self, name: &str, description: &str) {
        self.emit(&format!("{name}\n{description}\n"));
    }

    fn render_chart(&mut self, dates: &[Date], high: &[f64], low: &[f64]) {
        self.emit(&format_chart(dates, high, low));
    }

    fn render_summary(&mut self, summary: &Summary) {
        self.emit(&format!("{}\n", format_summary(summary)));
    }
}
