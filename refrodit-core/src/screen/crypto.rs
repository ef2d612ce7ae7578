use std::sync::Arc;

use tracing::info;

use crate::{
    CryptoQuote,
    feed::CryptoFeed,
    fetch::{Delivery, DeliverySender, FetchOutcome, FetchSlot},
};

#[derive(Debug, Clone, PartialEq)]
pub enum CryptoPhase {
    Loading,
    Error(String),
    /// The feed answered with an empty list.
    Empty,
    Loaded(Vec<CryptoQuote>),
}

/// What the crypto list screen should draw.
#[derive(Debug, Clone, PartialEq)]
pub enum CryptoView<'a> {
    Loading,
    Error(&'a str),
    NoResults,
    Quotes(Vec<&'a CryptoQuote>),
}

/// Searchable list of quotes, loaded once on attach.
#[derive(Debug)]
pub struct CryptoScreen {
    phase: CryptoPhase,
    query: String,
    fetch: FetchSlot,
}

impl Default for CryptoScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoScreen {
    pub fn new() -> Self {
        Self { phase: CryptoPhase::Loading, query: String::new(), fetch: FetchSlot::new() }
    }

    /// Mount hook: starts the one-shot feed fetch.
    pub fn attach(
        &mut self,
        feed: Arc<dyn CryptoFeed>,
        tx: DeliverySender<Vec<CryptoQuote>>,
    ) -> u64 {
        self.phase = CryptoPhase::Loading;
        self.fetch.start(async move { feed.fetch_crypto_feed().await }, tx)
    }

    /// Unmount hook: cancels the fetch; later deliveries are ignored.
    pub fn detach(&mut self) {
        self.fetch.detach();
    }

    /// Applies a fetch result. Returns false when the delivery was stale.
    pub fn apply(&mut self, delivery: Delivery<Vec<CryptoQuote>>) -> bool {
        if !self.fetch.settle(delivery.generation) {
            return false;
        }

        self.phase = match delivery.outcome {
            FetchOutcome::Success(quotes) if quotes.is_empty() => CryptoPhase::Empty,
            FetchOutcome::Success(quotes) => {
                info!(count = quotes.len(), "crypto quotes loaded");
                CryptoPhase::Loaded(quotes)
            }
            FetchOutcome::Failure(message) => CryptoPhase::Error(message),
        };
        true
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn phase(&self) -> &CryptoPhase {
        &self.phase
    }

    pub fn is_attached(&self) -> bool {
        self.fetch.is_attached()
    }

    /// Quotes matching the current query, always filtered from the full list.
    pub fn visible(&self) -> Vec<&CryptoQuote> {
        match &self.phase {
            CryptoPhase::Loaded(quotes) => filter_quotes(quotes, &self.query),
            _ => Vec::new(),
        }
    }

    pub fn view(&self) -> CryptoView<'_> {
        match &self.phase {
            CryptoPhase::Loading => CryptoView::Loading,
            CryptoPhase::Error(message) => CryptoView::Error(message),
            CryptoPhase::Empty => CryptoView::NoResults,
            CryptoPhase::Loaded(_) => {
                let visible = self.visible();
                if visible.is_empty() { CryptoView::NoResults } else { CryptoView::Quotes(visible) }
            }
        }
    }
}

/// Case-insensitive substring match on `currency`, keeping the original order.
/// A blank query matches everything.
pub fn filter_quotes<'a>(quotes: &'a [CryptoQuote], query: &str) -> Vec<&'a CryptoQuote> {
    if query.trim().is_empty() {
        return quotes.iter().collect();
    }

    let needle = query.to_lowercase();
    quotes.iter().filter(|q| q.currency.to_lowercase().contains(&needle)).collect()
}
