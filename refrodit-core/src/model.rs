use serde::{Deserialize, Serialize};

/// Placeholder shown when the weather feed carries no description.
pub const MISSING_DESCRIPTION: &str = "N/A";

/// One row of the crypto feed. The price stays in its display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoQuote {
    pub currency: String,
    pub price: String,
}

/// Coarse price bucket used for color-coding a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTier {
    Low,
    Mid,
    High,
}

impl CryptoQuote {
    pub fn new(currency: impl Into<String>, price: impl Into<String>) -> Self {
        Self { currency: currency.into(), price: price.into() }
    }

    /// Numeric value of the display price: everything but digits and `.` is
    /// dropped, and anything unparsable counts as `0.0`.
    pub fn price_value(&self) -> f64 {
        let digits: String =
            self.price.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
        digits.parse().unwrap_or(0.0)
    }

    pub fn tier(&self) -> PriceTier {
        let value = self.price_value();
        if value > 30_000.0 {
            PriceTier::High
        } else if value < 1_000.0 {
            PriceTier::Low
        } else {
            PriceTier::Mid
        }
    }
}

/// Current conditions for a single city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub city_name: String,
    pub temperature: f64,
    pub humidity: i32,
    pub description: String,
}
