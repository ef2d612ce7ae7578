use std::sync::Arc;

use tracing::info;

use crate::{
    WeatherReading,
    feed::WeatherFeed,
    fetch::{Delivery, DeliverySender, FetchOutcome, FetchSlot},
};

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherPhase {
    Idle,
    Loading,
    Error(String),
    Loaded(WeatherReading),
}

/// What the weather screen should draw below the city input.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherView<'a> {
    Prompt,
    Loading,
    Error(&'a str),
    Card { city: &'a str, reading: &'a WeatherReading },
}

/// City lookup screen. Fetches only when the user submits.
#[derive(Debug)]
pub struct WeatherScreen {
    city: String,
    phase: WeatherPhase,
    fetch: FetchSlot,
}

impl WeatherScreen {
    pub fn new(city: impl Into<String>) -> Self {
        Self { city: city.into(), phase: WeatherPhase::Idle, fetch: FetchSlot::new() }
    }

    pub fn set_city(&mut self, city: impl Into<String>) {
        self.city = city.into();
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Fetches weather for the current city. Allowed from any phase; an older
    /// outstanding fetch is superseded.
    pub fn submit(&mut self, feed: Arc<dyn WeatherFeed>, tx: DeliverySender<WeatherReading>) -> u64 {
        let city = self.city.clone();
        self.phase = WeatherPhase::Loading;
        self.fetch.start(async move { feed.fetch_weather(&city).await }, tx)
    }

    pub fn detach(&mut self) {
        self.fetch.detach();
    }

    /// Applies a fetch result. Returns false when the delivery was stale.
    pub fn apply(&mut self, delivery: Delivery<WeatherReading>) -> bool {
        if !self.fetch.settle(delivery.generation) {
            return false;
        }

        self.phase = match delivery.outcome {
            FetchOutcome::Success(reading) => {
                info!(city = %reading.city_name, "weather loaded");
                WeatherPhase::Loaded(reading)
            }
            FetchOutcome::Failure(message) => WeatherPhase::Error(message),
        };
        true
    }

    pub fn phase(&self) -> &WeatherPhase {
        &self.phase
    }

    pub fn view(&self) -> WeatherView<'_> {
        match &self.phase {
            WeatherPhase::Idle => WeatherView::Prompt,
            WeatherPhase::Loading => WeatherView::Loading,
            WeatherPhase::Error(message) => WeatherView::Error(message),
            WeatherPhase::Loaded(reading) => WeatherView::Card { city: &self.city, reading },
        }
    }
}
