use std::fmt::{Display, Formatter};

use crate::domain::{PriceHistory, Prediction, Range52, Symbol};
use crate::error::DataKind;

/// Stable identity of an item: its catalog position, assigned once at load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(usize);

impl ItemId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether an item's time series has been retrieved. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchState {
    #[default]
    NotFetched,
    Fetched,
}

/// Company metadata from the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMeta {
    pub company: String,
    pub sector: String,
}

/// One tradable instrument and whatever data has been cached for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    id: ItemId,
    symbol: Symbol,
    name: String,
    sector: String,
    description: String,
    fetch_state: FetchState,
    history: Option<PriceHistory>,
    range52: Option<Range52>,
    prediction: Option<Prediction>,
    history_attempted: bool,
    prediction_attempted: bool,
    history_failed: bool,
    prediction_failed: bool,
}

impl Item {
    pub(crate) fn new(id: ItemId, symbol: Symbol, meta: ItemMeta) -> Self {
        let description = format!("{} - {} - {}", meta.company, meta.sector, symbol);
        Self {
            id,
            symbol,
            name: meta.company,
            sector: meta.sector,
            description,
            fetch_state: FetchState::NotFetched,
            history: None,
            range52: None,
            prediction: None,
            history_attempted: false,
            prediction_attempted: false,
            history_failed: false,
            prediction_failed: false,
        }
    }

    pub const fn id(&self) -> ItemId {
        self.id
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sector(&self) -> &str {
        &self.sector
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn fetch_state(&self) -> FetchState {
        self.fetch_state
    }

    pub fn is_fetched(&self) -> bool {
        self.fetch_state == FetchState::Fetched
    }

    pub fn history(&self) -> Option<&PriceHistory> {
        self.history.as_ref()
    }

    pub fn range52(&self) -> Option<Range52> {
        self.range52
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }

    /// Whether a request of `kind` has ever been issued for this item.
    pub const fn attempted(&self, kind: DataKind) -> bool {
        match kind {
            DataKind::History => self.history_attempted,
            DataKind::Prediction => self.prediction_attempted,
        }
    }

    /// Whether the single `kind` request for this item came back without data.
    pub const fn failed(&self, kind: DataKind) -> bool {
        match kind {
            DataKind::History => self.history_failed,
            DataKind::Prediction => self.prediction_failed,
        }
    }

    pub(crate) fn record_failure(&mut self, kind: DataKind) {
        match kind {
            DataKind::History => self.history_failed = true,
            DataKind::Prediction => self.prediction_failed = true,
        }
    }

    pub(crate) fn begin_attempt(&mut self, kind: DataKind) -> bool {
        let flag = match kind {
            DataKind::History => &mut self.history_attempted,
            DataKind::Prediction => &mut self.prediction_attempted,
        };
        !std::mem::replace(flag, true)
    }

    pub(crate) fn mark_fetched(
        &mut self,
        history: PriceHistory,
        range52: Range52,
        prediction: Option<Prediction>,
    ) -> bool {
        if self.is_fetched() {
            return false;
        }
        self.history = Some(history);
        self.range52 = Some(range52);
        if self.prediction.is_none() {
            self.prediction = prediction;
        }
        self.fetch_state = FetchState::Fetched;
        true
    }

    pub(crate) fn attach_prediction(&mut self, prediction: Prediction) -> bool {
        if self.prediction.is_some() {
            return false;
        }
        self.prediction = Some(prediction);
        true
    }
}
