//! AnkiConnect client and card types.
//!
//! Talks to the AnkiConnect add-on's local HTTP API (http://127.0.0.1:8765 by default).
//! Only the reviewer actions needed for a learning session are wrapped.

mod client;
mod types;

pub use client::{AnkiApi, AnkiClient, AnkiError, DEFAULT_ENDPOINT};
pub use types::{CardInfo, CurrentCard, Ease, FieldValue, InvalidEase};

#[cfg(test)]
pub(crate) mod fake;
