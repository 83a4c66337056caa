//! In-memory [`AnkiApi`] for unit tests: hands out queued current-card results and records every call.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{AnkiApi, AnkiError, CardInfo, CurrentCard, Ease};

#[derive(Default)]
pub(crate) struct FakeAnki {
    calls: Mutex<Vec<String>>,
    current: Mutex<VecDeque<Result<CurrentCard, AnkiError>>>,
    show_answer_error: Option<AnkiError>,
    answer_error: Option<AnkiError>,
}

impl FakeAnki {
    pub fn with_cards(cards: Vec<Result<CurrentCard, AnkiError>>) -> Self {
        Self {
            current: Mutex::new(cards.into()),
            ..Self::default()
        }
    }

    pub fn failing_show_answer(mut self, e: AnkiError) -> Self {
        self.show_answer_error = Some(e);
        self
    }

    pub fn failing_answer(mut self, e: AnkiError) -> Self {
        self.answer_error = Some(e);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl AnkiApi for FakeAnki {
    async fn gui_current_card(&self) -> Result<CurrentCard, AnkiError> {
        self.record("guiCurrentCard");
        self.current
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(AnkiError::NoCurrentCard))
    }

    async fn gui_show_answer(&self) -> Result<(), AnkiError> {
        self.record("guiShowAnswer");
        match &self.show_answer_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn gui_answer_card(&self, ease: Ease) -> Result<(), AnkiError> {
        self.record(format!("guiAnswerCard:{}", ease.value()));
        match &self.answer_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn cards_info(&self, card_ids: &[u64]) -> Result<Vec<CardInfo>, AnkiError> {
        self.record("cardsInfo");
        Ok(card_ids
            .iter()
            .map(|&card_id| CardInfo {
                card_id,
                ..CardInfo::default()
            })
            .collect())
    }
}

pub(crate) fn vocab_card() -> CurrentCard {
    CurrentCard {
        card_id: Some(1001),
        model_name: "Vocabulary".to_string(),
        template: "card1".to_string(),
        deck_name: "English::Words".to_string(),
        question: r#"<p>apple</p><div class="audio">[sound:apple.mp3]</div>"#.to_string(),
        answer: "<p>apple</p><br><p>苹果</p>".to_string(),
        ..CurrentCard::default()
    }
}

pub(crate) fn unavailable() -> AnkiError {
    AnkiError::ServiceUnavailable {
        endpoint: "http://127.0.0.1:8765".to_string(),
        reason: "connection refused".to_string(),
    }
}
