//! Payloads exchanged with AnkiConnect.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How well the user recalled a card. Sent to `guiAnswerCard` as its numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ease {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("ease must be 1-4 (1=Again, 2=Hard, 3=Good, 4=Easy), got {0}")]
pub struct InvalidEase(pub i64);

impl Ease {
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl TryFrom<i64> for Ease {
    type Error = InvalidEase;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Ease::Again),
            2 => Ok(Ease::Hard),
            3 => Ok(Ease::Good),
            4 => Ok(Ease::Easy),
            other => Err(InvalidEase(other)),
        }
    }
}

impl std::fmt::Display for Ease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Ease::Again => "again",
            Ease::Hard => "hard",
            Ease::Good => "good",
            Ease::Easy => "easy",
        };
        write!(f, "{} ({})", name, self.value())
    }
}

/// Card currently shown in Anki's reviewer (`guiCurrentCard`).
/// Everything except the id is read defensively: missing or `null` fields become empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentCard {
    /// Used only for log lines.
    #[serde(default)]
    pub card_id: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub template: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub deck_name: String,
    /// Question side, rendered HTML.
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    /// Answer side, rendered HTML.
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    /// Ease buttons the reviewer currently offers (e.g. `[1, 2, 3, 4]`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub buttons: Vec<u8>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub next_reviews: Vec<String>,
}

/// Treat an explicit JSON `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One note field as returned in `cardsInfo`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldValue {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub order: u32,
}

/// Detailed card record from `cardsInfo`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInfo {
    pub card_id: u64,
    #[serde(default)]
    pub note: u64,
    #[serde(default)]
    pub deck_name: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub ord: u32,
    #[serde(default)]
    pub interval: i64,
    #[serde(default)]
    pub due: i64,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub lapses: u32,
    #[serde(default)]
    pub fields: HashMap<String, FieldValue>,
}
