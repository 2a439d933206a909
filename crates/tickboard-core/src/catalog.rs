//! The item catalog: ordered items and their cached data.
//!
//! Positions are assigned once by [`Catalog::load`] and never change, so an
//! index handed to the navigation list stays valid for the catalog's lifetime.

use serde_json::Value;

use crate::domain::{Item, ItemId, ItemMeta, PriceHistory, Prediction, Range52, Symbol};
use crate::error::{CatalogLoadError, DataKind};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    /// Build a catalog from a `symbol -> {company, sector}` JSON object, keeping
    /// the object's key order. Keys become symbols unchanged; object keys are
    /// unique, so symbols are too. Either every entry loads or none does.
    pub fn load(payload: &Value) -> Result<Self, CatalogLoadError> {
        let entries = payload.as_object().ok_or(CatalogLoadError::NotAMapping)?;

        let mut items = Vec::with_capacity(entries.len());
        for (index, (key, entry)) in entries.iter().enumerate() {
            let symbol = Symbol::new(key.as_str()).map_err(|_| CatalogLoadError::EmptySymbol)?;
            let meta = parse_meta(key, entry)?;
            items.push(Item::new(ItemId::new(index), symbol, meta));
        }

        Ok(Self { items })
    }

    /// Parse `body` as JSON and [`load`](Self::load) it.
    pub fn from_json(body: &str) -> Result<Self, CatalogLoadError> {
        let payload: Value = serde_json::from_str(body)?;
        Self::load(&payload)
    }

    /// Item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range. Indices come from this catalog's own
    /// navigation list; use [`try_get`](Self::try_get) for untrusted input.
    pub fn get(&self, index: usize) -> &Item {
        &self.items[index]
    }

    pub fn try_get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn item(&self, id: ItemId) -> &Item {
        self.get(id.index())
    }

    /// Position of the item whose symbol is exactly `symbol`.
    pub fn position(&self, symbol: &str) -> Option<usize> {
        self.items.iter().position(|item| *item.symbol() == *symbol)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter()
    }

    /// Record that a `kind` request is about to be issued for `id`.
    ///
    /// Returns `false` when one was already issued, in which case the caller
    /// must not send another.
    pub fn begin_attempt(&mut self, id: ItemId, kind: DataKind) -> bool {
        self.items[id.index()].begin_attempt(kind)
    }

    /// Store fetched data and flip the item to `Fetched`.
    ///
    /// A no-op returning `false` if the item is already fetched. A prediction
    /// attached earlier through [`attach_prediction`](Self::attach_prediction)
    /// is kept.
    pub fn mark_fetched(
        &mut self,
        id: ItemId,
        history: PriceHistory,
        range52: Range52,
        prediction: Option<Prediction>,
    ) -> bool {
        self.items[id.index()].mark_fetched(history, range52, prediction)
    }

    /// Store a prediction that arrived on its own. Never changes the fetch
    /// state; the first stored prediction wins.
    pub fn attach_prediction(&mut self, id: ItemId, prediction: Prediction) -> bool {
        self.items[id.index()].attach_prediction(prediction)
    }

    /// Remember that the `kind` request for `id` produced no data. The item's
    /// fetch state is left untouched.
    pub fn record_failure(&mut self, id: ItemId, kind: DataKind) {
        self.items[id.index()].record_failure(kind);
    }

    pub fn fetched_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_fetched()).count()
    }
}

fn parse_meta(symbol: &str, entry: &Value) -> Result<ItemMeta, CatalogLoadError> {
    let fields = entry
        .as_object()
        .ok_or_else(|| CatalogLoadError::EntryNotAnObject {
            symbol: symbol.to_owned(),
        })?;

    let text_field = |field: &'static str| {
        fields
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| CatalogLoadError::MissingField {
                symbol: symbol.to_owned(),
                field,
            })
    };

    Ok(ItemMeta {
        company: text_field("company")?,
        sector: text_field("sector")?,
    })
}
