//! AnkiConnect HTTP client.
//! Every action is a POST of `{ "action", "version": 6, "params" }` to the endpoint root;
//! every reply must be exactly `{ "result", "error" }`.

use async_trait::async_trait;
use serde::Serialize;

use super::types::{CardInfo, CurrentCard, Ease};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8765";

const API_VERSION: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnkiError {
    /// Transport failure: connection refused, DNS, broken body.
    #[error("AnkiConnect is not reachable at {endpoint} ({reason}); is Anki running with the AnkiConnect add-on?")]
    ServiceUnavailable { endpoint: String, reason: String },
    /// Reply did not have the `{result, error}` shape. Usually an incompatible AnkiConnect version.
    #[error("invalid response from AnkiConnect: {0}")]
    Protocol(String),
    /// AnkiConnect answered with a non-null `error`.
    #[error("AnkiConnect error: {0}")]
    Application(String),
    /// Reviewer answered `null` for the current card.
    #[error("no card is currently shown in the Anki reviewer")]
    NoCurrentCard,
}

/// The slice of AnkiConnect a learning session needs. Implemented by [`AnkiClient`];
/// tests substitute an in-memory fake.
#[async_trait]
pub trait AnkiApi: Send + Sync {
    /// `guiCurrentCard`: the card on screen in the reviewer.
    async fn gui_current_card(&self) -> Result<CurrentCard, AnkiError>;
    /// `guiShowAnswer`: flip the reviewer to the answer side.
    async fn gui_show_answer(&self) -> Result<(), AnkiError>;
    /// `guiAnswerCard`: rate the current card, advancing the scheduler.
    async fn gui_answer_card(&self, ease: Ease) -> Result<(), AnkiError>;
    /// `cardsInfo`: detailed records for the given card ids.
    async fn cards_info(&self, card_ids: &[u64]) -> Result<Vec<CardInfo>, AnkiError>;
}

/// Client for the AnkiConnect HTTP API.
#[derive(Clone)]
pub struct AnkiClient {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct AnkiRequest<'a> {
    action: &'a str,
    version: u32,
    params: serde_json::Value,
}

impl AnkiClient {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one AnkiConnect action and return its `result`. `params` defaults to `{}`.
    pub async fn invoke(
        &self,
        action: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, AnkiError> {
        let body = AnkiRequest {
            action,
            version: API_VERSION,
            params: params.unwrap_or_else(|| serde_json::json!({})),
        };
        log::debug!("anki: {} -> {}", action, self.endpoint);
        let res = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.unavailable(e))?;
        let status = res.status();
        let text = res.text().await.map_err(|e| self.unavailable(e))?;
        let result = parse_envelope(&text).map_err(|e| match e {
            AnkiError::Protocol(payload) if !status.is_success() => {
                AnkiError::Protocol(format!("{} {}", status, payload))
            }
            other => other,
        })?;
        Ok(result)
    }

    fn unavailable(&self, e: reqwest::Error) -> AnkiError {
        log::error!("unable to reach AnkiConnect @ {}: {}", self.endpoint, e);
        AnkiError::ServiceUnavailable {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        }
    }
}

/// Validate the `{result, error}` envelope and unwrap `result`.
pub(crate) fn parse_envelope(text: &str) -> Result<serde_json::Value, AnkiError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|_| AnkiError::Protocol(text.to_string()))?;
    let obj = match value.as_object() {
        Some(obj) if obj.len() == 2 && obj.contains_key("result") && obj.contains_key("error") => {
            obj
        }
        _ => return Err(AnkiError::Protocol(value.to_string())),
    };
    match obj.get("error") {
        Some(serde_json::Value::Null) | None => {}
        Some(serde_json::Value::String(s)) => return Err(AnkiError::Application(s.clone())),
        Some(other) => return Err(AnkiError::Application(other.to_string())),
    }
    Ok(obj.get("result").cloned().unwrap_or(serde_json::Value::Null))
}

fn decode<T: serde::de::DeserializeOwned>(
    action: &str,
    result: serde_json::Value,
) -> Result<T, AnkiError> {
    serde_json::from_value(result.clone())
        .map_err(|e| AnkiError::Protocol(format!("{}: unexpected result {} ({})", action, result, e)))
}

#[async_trait]
impl AnkiApi for AnkiClient {
    async fn gui_current_card(&self) -> Result<CurrentCard, AnkiError> {
        let result = self.invoke("guiCurrentCard", None).await?;
        if result.is_null() {
            return Err(AnkiError::NoCurrentCard);
        }
        decode("guiCurrentCard", result)
    }

    async fn gui_show_answer(&self) -> Result<(), AnkiError> {
        self.invoke("guiShowAnswer", None).await?;
        Ok(())
    }

    async fn gui_answer_card(&self, ease: Ease) -> Result<(), AnkiError> {
        let result = self
            .invoke(
                "guiAnswerCard",
                Some(serde_json::json!({ "ease": ease.value() })),
            )
            .await?;
        if result == serde_json::Value::Bool(false) {
            log::warn!("anki: reviewer did not accept ease {}", ease);
        }
        Ok(())
    }

    async fn cards_info(&self, card_ids: &[u64]) -> Result<Vec<CardInfo>, AnkiError> {
        let result = self
            .invoke("cardsInfo", Some(serde_json::json!({ "cards": card_ids })))
            .await?;
        decode("cardsInfo", result)
    }
}
