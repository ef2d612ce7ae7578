use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{CryptoQuote, FetchError};

use super::{CryptoFeed, get_json};

/// Static JSON array of `{currency, price}` records served over plain GET.
#[derive(Debug, Clone)]
pub struct HttpCryptoFeed {
    url: String,
    http: Client,
}

impl HttpCryptoFeed {
    pub fn new(url: String) -> Self {
        Self { url, http: Client::new() }
    }
}

#[async_trait]
impl CryptoFeed for HttpCryptoFeed {
    async fn fetch_crypto_feed(&self) -> Result<Vec<CryptoQuote>, FetchError> {
        debug!(url = %self.url, "fetching crypto feed");
        let quotes: Vec<CryptoQuote> = get_json(self.http.get(&self.url)).await?;
        debug!(count = quotes.len(), "crypto feed decoded");
        Ok(quotes)
    }
}
