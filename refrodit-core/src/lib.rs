//! Core library for the `refrodit` client.
//!
//! This crate defines:
//! - Configuration (feed locations, API key, units)
//! - Remote feeds for crypto quotes and current weather
//! - The fetch orchestrator that runs requests off the rendering task
//! - Per-screen view state and its pure view projection
//!
//! It is used by `refrodit-cli`, but any front end that can drain a tokio
//! channel on its rendering task can drive the screens.

pub mod config;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod model;
pub mod screen;

pub use config::{Config, CryptoConfig, Units, WeatherConfig};
pub use error::FetchError;
pub use feed::{CryptoFeed, WeatherFeed};
pub use fetch::{Delivery, DeliverySender, FetchHandle, FetchOutcome, FetchSlot};
pub use model::{CryptoQuote, PriceTier, WeatherReading};
pub use screen::{CryptoScreen, CryptoView, WeatherScreen, WeatherView};
