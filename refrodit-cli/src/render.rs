use chrono::{DateTime, Local};
use refrodit_core::{CryptoView, PriceTier, Units, WeatherView};

fn tier_label(tier: PriceTier) -> &'static str {
    match tier {
        PriceTier::High => "high",
        PriceTier::Mid => "mid",
        PriceTier::Low => "low",
    }
}

pub fn crypto(view: &CryptoView<'_>, fetched_at: DateTime<Local>) -> String {
    match view {
        CryptoView::Loading => "Loading crypto prices...".to_string(),
        CryptoView::Error(message) => format!("Error: {message}"),
        CryptoView::NoResults => "No results found.".to_string(),
        CryptoView::Quotes(quotes) => {
            let mut out = format!("Crypto prices (updated {})\n", fetched_at.format("%H:%M:%S"));
            for quote in quotes {
                out.push_str(&format!(
                    "{:<20} {:>16}  {}\n",
                    quote.currency,
                    quote.price,
                    tier_label(quote.tier())
                ));
            }
            out.truncate(out.trim_end().len());
            out
        }
    }
}

pub fn weather(view: &WeatherView<'_>, units: Units, fetched_at: DateTime<Local>) -> String {
    match view {
        WeatherView::Prompt => "Enter a city to fetch the weather.".to_string(),
        WeatherView::Loading => "Loading weather...".to_string(),
        WeatherView::Error(message) => format!("Error: {message}"),
        WeatherView::Card { city, reading } => format!(
            "Weather in {city}\n  Description: {}\n  Temperature: {}{}\n  Humidity:    {}%\n  Updated:     {}",
            reading.description,
            reading.temperature,
            units.temperature_suffix(),
            reading.humidity,
            fetched_at.format("%H:%M:%S"),
        ),
    }
}
