//! Staggered background prefetch.
//!
//! The schedule is computed upfront as `(item, delay)` pairs with
//! `delay = index × stagger`, then replayed against the tokio clock. Whether a
//! due entry still needs fetching is decided by the receiver when it fires.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tracing::trace;

use crate::catalog::Catalog;
use crate::domain::ItemId;

/// One planned prefetch, relative to the start of the scheduling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledFetch {
    pub item: ItemId,
    pub delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrefetchPlan {
    entries: Vec<ScheduledFetch>,
}

impl PrefetchPlan {
    pub fn entries(&self) -> &[ScheduledFetch] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Offset of the last entry, i.e. how long the whole pass takes.
    pub fn span(&self) -> Duration {
        self.entries.last().map_or(Duration::ZERO, |entry| entry.delay)
    }
}

impl IntoIterator for PrefetchPlan {
    type Item = ScheduledFetch;
    type IntoIter = std::vec::IntoIter<ScheduledFetch>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchScheduler {
    stagger: Duration,
}

impl PrefetchScheduler {
    pub const fn new(stagger: Duration) -> Self {
        Self { stagger }
    }

    pub const fn stagger(&self) -> Duration {
        self.stagger
    }

    /// One entry per catalog item, in index order.
    pub fn plan(&self, catalog: &Catalog) -> PrefetchPlan {
        let entries = catalog
            .iter()
            .map(|item| ScheduledFetch {
                item: item.id(),
                delay: self.stagger.saturating_mul(
                    u32::try_from(item.id().index()).unwrap_or(u32::MAX),
                ),
            })
            .collect();
        PrefetchPlan { entries }
    }

    /// Replay `plan` in real (or paused test) time, calling `fire` for each
    /// entry once its delay has elapsed since the pass started.
    ///
    /// Stops early when `fire` returns `false`, e.g. because the receiving
    /// event loop has shut down.
    pub async fn run(plan: PrefetchPlan, mut fire: impl FnMut(ItemId) -> bool) {
        let start = Instant::now();
        for entry in plan {
            sleep_until(start + entry.delay).await;
            trace!(item = %entry.item, delay_ms = entry.delay.as_millis() as u64, "prefetch due");
            if !fire(entry.item) {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn catalog(n: usize) -> Catalog {
        let entries: serde_json::Map<_, _> = (0..n)
            .map(|i| {
                (
                    format!("T{i}"),
                    json!({"company": format!("Company {i}"), "sector": "Tech"}),
                )
            })
            .collect();
        Catalog::load(&serde_json::Value::Object(entries)).expect("valid catalog")
    }

    #[test]
    fn plan_staggers_by_index() {
        let scheduler = PrefetchScheduler::new(Duration::from_millis(300));
        let plan = scheduler.plan(&catalog(3));

        let delays: Vec<_> = plan.entries().iter().map(|e| e.delay).collect();
        assert_eq!(
            delays,
            [
                Duration::ZERO,
                Duration::from_millis(300),
                Duration::from_millis(600)
            ]
        );
        assert_eq!(plan.span(), Duration::from_millis(600));
    }

    #[test]
    fn empty_catalog_yields_empty_plan() {
        let plan = PrefetchScheduler::new(Duration::from_millis(300)).plan(&Catalog::default());
        assert!(plan.is_empty());
        assert_eq!(plan.span(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_when_receiver_refuses() {
        let plan = PrefetchScheduler::new(Duration::from_secs(1)).plan(&catalog(5));
        let mut fired = Vec::new();

        PrefetchScheduler::run(plan, |item| {
            fired.push(item);
            fired.len() < 2
        })
        .await;

        assert_eq!(fired, [ItemId::new(0), ItemId::new(1)]);
    }
}
