//! Per-screen view state.
//!
//! A screen owns its phase, its user input and one [`FetchSlot`](crate::fetch::FetchSlot).
//! Fetch results reach it only through `apply`, and whatever gets drawn comes
//! from `view`, which is a pure function of the screen.

pub mod crypto;
pub mod weather;

pub use crypto::{CryptoPhase, CryptoScreen, CryptoView, filter_quotes};
pub use weather::{WeatherPhase, WeatherScreen, WeatherView};
