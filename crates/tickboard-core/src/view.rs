//! Active-selection state machine.
//!
//! The one rule that matters: a completion only reaches the screen if the
//! completed item is, at that moment, the active selection. The cache is
//! updated regardless.

use tracing::debug;

use crate::catalog::Catalog;
use crate::domain::{ItemId, PriceHistory, Prediction, Range52};
use crate::error::DataKind;
use crate::sink::{render_item, PresentationSink, Summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    NoSelection,
    Viewing(ItemId),
}

/// What `select_item` did, and what the caller still has to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Chart and summary were pushed from the cache.
    Rendered,
    /// Not cached and never requested: the caller must fetch it now.
    FetchNow(ItemId),
    /// A request is already in flight; its completion will render.
    Pending,
    /// The history request failed. Only the header is shown.
    Unavailable,
}

#[derive(Debug, Clone, Default)]
pub struct ViewController {
    state: ViewState,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self) -> ViewState {
        self.state
    }

    pub const fn active(&self) -> Option<ItemId> {
        match self.state {
            ViewState::NoSelection => None,
            ViewState::Viewing(id) => Some(id),
        }
    }

    pub fn is_active(&self, id: ItemId) -> bool {
        self.active() == Some(id)
    }

    /// User picked the navigation entry at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the catalog.
    pub fn select_item(
        &mut self,
        catalog: &Catalog,
        sink: &mut dyn PresentationSink,
        index: usize,
    ) -> Selection {
        let item = catalog.get(index);
        self.state = ViewState::Viewing(item.id());

        sink.set_active_entry(index);
        sink.render_header(item.name(), item.description());

        if render_item(sink, item) {
            return Selection::Rendered;
        }
        if !item.attempted(DataKind::History) {
            return Selection::FetchNow(item.id());
        }
        if item.failed(DataKind::History) {
            Selection::Unavailable
        } else {
            Selection::Pending
        }
    }

    /// A history fetch finished for `id`, with whatever prediction is known.
    ///
    /// Returns whether the view was refreshed.
    pub fn on_fetch_complete(
        &self,
        catalog: &mut Catalog,
        sink: &mut dyn PresentationSink,
        id: ItemId,
        history: PriceHistory,
        range52: Range52,
        prediction: Option<Prediction>,
    ) -> bool {
        if !catalog.mark_fetched(id, history, range52, prediction) {
            debug!(item = %id, "item already fetched; keeping cached data");
        }

        if !self.is_active(id) {
            debug!(
                item = %id,
                active = ?self.active(),
                "fetched item is not active; view untouched"
            );
            return false;
        }
        render_item(sink, catalog.item(id))
    }

    /// A prediction arrived on its own for `id`. Refreshes the summary if the
    /// item is already fetched and on screen.
    pub fn on_prediction_complete(
        &self,
        catalog: &mut Catalog,
        sink: &mut dyn PresentationSink,
        id: ItemId,
        prediction: Prediction,
    ) -> bool {
        if !catalog.attach_prediction(id, prediction) || !self.is_active(id) {
            return false;
        }
        match Summary::for_item(catalog.item(id)) {
            Some(summary) => {
                sink.render_summary(&summary);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::date;
    use time::Date;

    use super::*;
    use crate::dashboard::Selector;
    use crate::domain::PriceRow;
    use crate::sink::NavEntry;

    #[derive(Debug, Default)]
    struct CountingSink {
        headers: Vec<String>,
        charts: usize,
        summaries: Vec<Summary>,
        active: Option<usize>,
    }

    impl PresentationSink for CountingSink {
        fn render_navigation(&mut self, _entries: &[NavEntry], _selector: Selector) {}

        fn render_header(&mut self, name: &str, _description: &str) {
            self.headers.push(name.to_owned());
        }

        fn set_active_entry(&mut self, index: usize) {
            self.active = Some(index);
        }

        fn render_chart(&mut self, _dates: &[Date], _high: &[f64], _low: &[f64]) {
            self.charts += 1;
        }

        fn render_summary(&mut self, summary: &Summary) {
            self.summaries.push(*summary);
        }
    }

    fn catalog() -> Catalog {
        Catalog::load(&json!({
            "AAA": {"company": "Alpha Co", "sector": "Tech"},
            "BBB": {"company": "Beta Co", "sector": "Energy"},
        }))
        .expect("valid payload")
    }

    fn history() -> (PriceHistory, Range52) {
        let history = PriceHistory::from_rows([PriceRow {
            date: date!(2024 - 01 - 01),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
        }])
        .expect("valid row");
        (history, Range52::new(0.5, 2.0).expect("valid range"))
    }

    #[test]
    fn selecting_unfetched_item_asks_for_fetch_without_charting() {
        let catalog = catalog();
        let mut sink = CountingSink::default();
        let mut view = ViewController::new();

        let outcome = view.select_item(&catalog, &mut sink, 0);

        assert_eq!(outcome, Selection::FetchNow(ItemId::new(0)));
        assert_eq!(view.state(), ViewState::Viewing(ItemId::new(0)));
        assert_eq!(sink.headers, ["Alpha Co"]);
        assert_eq!(sink.active, Some(0));
        assert_eq!(sink.charts, 0);
    }

    #[test]
    fn selecting_in_flight_item_waits() {
        let mut catalog = catalog();
        catalog.begin_attempt(ItemId::new(1), DataKind::History);
        let mut view = ViewController::new();

        let outcome = view.select_item(&catalog, &mut CountingSink::default(), 1);
        assert_eq!(outcome, Selection::Pending);
    }

    #[test]
    fn selecting_failed_item_is_unavailable() {
        let mut catalog = catalog();
        catalog.begin_attempt(ItemId::new(1), DataKind::History);
        catalog.record_failure(ItemId::new(1), DataKind::History);
        let mut sink = CountingSink::default();
        let mut view = ViewController::new();

        assert_eq!(view.select_item(&catalog, &mut sink, 1), Selection::Unavailable);
        assert_eq!(sink.headers, ["Beta Co"]);
        assert_eq!(sink.charts, 0);
    }

    #[test]
    fn selecting_cached_item_renders_immediately() {
        let mut catalog = catalog();
        let (h, r) = history();
        catalog.mark_fetched(ItemId::new(1), h, r, None);
        let mut sink = CountingSink::default();
        let mut view = ViewController::new();

        assert_eq!(view.select_item(&catalog, &mut sink, 1), Selection::Rendered);
        assert_eq!(sink.charts, 1);
        assert_eq!(sink.summaries.len(), 1);
    }

    #[test]
    fn completion_for_inactive_item_updates_cache_only() {
        let mut catalog = catalog();
        let mut sink = CountingSink::default();
        let mut view = ViewController::new();
        view.select_item(&catalog, &mut sink, 1);

        let (h, r) = history();
        let rendered = view.on_fetch_complete(&mut catalog, &mut sink, ItemId::new(0), h, r, None);

        assert!(!rendered);
        assert_eq!(sink.charts, 0);
        assert!(catalog.get(0).is_fetched());
        assert_eq!(catalog.get(0).range52(), Some(Range52 { min: 0.5, max: 2.0 }));
    }

    #[test]
    fn completion_for_active_item_renders() {
        let mut catalog = catalog();
        let mut sink = CountingSink::default();
        let mut view = ViewController::new();
        view.select_item(&catalog, &mut sink, 0);

        let (h, r) = history();
        assert!(view.on_fetch_complete(&mut catalog, &mut sink, ItemId::new(0), h, r, None));
        assert_eq!(sink.charts, 1);
    }

    #[test]
    fn late_prediction_refreshes_active_summary() {
        let mut catalog = catalog();
        let mut sink = CountingSink::default();
        let mut view = ViewController::new();
        view.select_item(&catalog, &mut sink, 0);
        let (h, r) = history();
        view.on_fetch_complete(&mut catalog, &mut sink, ItemId::new(0), h, r, None);

        let prediction =
            Prediction::from_points([(date!(2024 - 01 - 02), 4.0)]).expect("valid forecast");
        assert!(view.on_prediction_complete(&mut catalog, &mut sink, ItemId::new(0), prediction));

        let last = sink.summaries.last().expect("summary rendered");
        assert_eq!(last.predicted_avg, Some(4.0));
        assert_eq!(last.predicted_max, Some(4.0));
        assert_eq!(sink.charts, 1);
    }

    #[test]
    fn prediction_before_history_does_not_render() {
        let mut catalog = catalog();
        let mut sink = CountingSink::default();
        let mut view = ViewController::new();
        view.select_item(&catalog, &mut sink, 0);

        let prediction =
            Prediction::from_points([(date!(2024 - 01 - 02), 4.0)]).expect("valid forecast");
        assert!(!view.on_prediction_complete(&mut catalog, &mut sink, ItemId::new(0), prediction));
        assert!(sink.summaries.is_empty());
        assert!(!catalog.get(0).is_fetched());
    }
}
