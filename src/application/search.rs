use crate::domain::ports::SharedCatalog;
use crate::domain::product::Product;
use crate::error::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Quiet period after the last keystroke before a query is issued.
pub const QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Queries shorter than this settle to an empty result with no catalog
/// call.
pub const MIN_QUERY_LEN: usize = 2;

/// Outcome of one settled search, tagged with the query that produced it.
#[derive(Debug)]
pub struct SearchUpdate {
    pub query: String,
    pub outcome: Result<Vec<Product>>,
}

/// Debounced catalog search as a cancellable scheduled task.
///
/// Each keystroke cancels the pending task and schedules a new one after
/// the quiet period, so exactly one search is issued per pause in typing.
/// A generation counter makes delivery last-query-wins: an in-flight search
/// superseded by a newer keystroke is discarded, never merged into the
/// result list.
pub struct SearchDebouncer {
    catalog: SharedCatalog,
    updates: mpsc::UnboundedSender<SearchUpdate>,
    quiet_period: Duration,
    location: Option<u32>,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
}

impl SearchDebouncer {
    pub fn new(catalog: SharedCatalog, updates: mpsc::UnboundedSender<SearchUpdate>) -> Self {
        Self::with_quiet_period(catalog, updates, QUIET_PERIOD)
    }

    pub fn with_quiet_period(
        catalog: SharedCatalog,
        updates: mpsc::UnboundedSender<SearchUpdate>,
        quiet_period: Duration,
    ) -> Self {
        Self {
            catalog,
            updates,
            quiet_period,
            location: None,
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    /// Scopes subsequent searches to a location.
    pub fn set_location(&mut self, location: Option<u32>) {
        self.location = location;
    }

    /// Feeds one keystroke's worth of input.
    ///
    /// Cancels any pending search; sub-minimum queries settle to an empty
    /// update immediately so the caller clears its result list.
    pub fn on_input(&mut self, query: &str) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim().to_string();
        if query.chars().count() < MIN_QUERY_LEN {
            let _ = self.updates.send(SearchUpdate {
                query,
                outcome: Ok(Vec::new()),
            });
            return;
        }

        let catalog = Arc::clone(&self.catalog);
        let updates = self.updates.clone();
        let latest = Arc::clone(&self.generation);
        let location = self.location;
        let quiet_period = self.quiet_period;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            let outcome = catalog.search(&query, location).await;
            // A newer keystroke may have arrived while the search was in
            // flight; its results win and these are dropped.
            if latest.load(Ordering::SeqCst) != generation {
                tracing::debug!(query = %query, "discarding superseded search result");
                return;
            }
            let _ = updates.send(SearchUpdate { query, outcome });
        }));
    }
}
