//! Learning session: present the reviewer's current card and advance after an answer.
//!
//! No state is kept between calls; Anki's reviewer is the source of truth and every call
//! is a fresh round trip against it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::anki::{AnkiApi, AnkiError, Ease, InvalidEase};
use crate::format::QuestionFormatter;
use crate::text::normalize;

/// Pause between answering and re-fetching, so the reviewer can load the next card.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// What a tool call returns: the card as clean text, or the finished marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCardView {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_finished: Option<bool>,
    pub model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    pub deck_name: String,
    pub question: String,
    pub answer: String,
}

impl SessionCardView {
    /// No card left to review after an answer.
    pub fn deck_finished() -> Self {
        Self {
            success: true,
            deck_finished: Some(true),
            ..Self::default()
        }
    }

    pub fn is_deck_finished(&self) -> bool {
        self.deck_finished == Some(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Bad caller input; nothing was sent to Anki.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Anki(#[from] AnkiError),
}

impl From<InvalidEase> for SessionError {
    fn from(e: InvalidEase) -> Self {
        SessionError::Validation(e.to_string())
    }
}

/// Where a re-fetch after answering failed; only a failed fetch can mean the deck is done.
enum FetchError {
    CurrentCard(AnkiError),
    Other(AnkiError),
}

impl From<FetchError> for AnkiError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::CurrentCard(e) | FetchError::Other(e) => e,
        }
    }
}

/// Drives Anki's reviewer through the [`AnkiApi`] capability.
pub struct LearningSession {
    api: Arc<dyn AnkiApi>,
    formatter: QuestionFormatter,
    settle_delay: Duration,
}

impl LearningSession {
    pub fn new(api: Arc<dyn AnkiApi>, formatter: QuestionFormatter, settle_delay: Duration) -> Self {
        Self {
            api,
            formatter,
            settle_delay,
        }
    }

    /// Fetch the current card, reveal its answer in Anki, and return it as clean text.
    /// Errors from Anki are returned as-is.
    pub async fn start_session(&self) -> Result<SessionCardView, SessionError> {
        log::info!("fetching current card from Anki");
        Ok(self.current_card_view().await.map_err(AnkiError::from)?)
    }

    /// Rate the current card, wait for the reviewer to settle, and return the next card.
    /// When the reviewer has no card left, returns [`SessionCardView::deck_finished`].
    pub async fn answer_and_advance(&self, ease: i64) -> Result<SessionCardView, SessionError> {
        let ease = Ease::try_from(ease)?;

        log::info!("answering card with ease={}", ease);
        self.api.gui_answer_card(ease).await?;
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        match self.current_card_view().await {
            Ok(view) => Ok(view),
            Err(FetchError::CurrentCard(e @ (AnkiError::Application(_) | AnkiError::NoCurrentCard))) => {
                log::info!("no more cards available ({})", e);
                Ok(SessionCardView::deck_finished())
            }
            Err(e) => Err(AnkiError::from(e).into()),
        }
    }

    async fn current_card_view(&self) -> Result<SessionCardView, FetchError> {
        let card = self
            .api
            .gui_current_card()
            .await
            .map_err(FetchError::CurrentCard)?;

        self.api.gui_show_answer().await.map_err(FetchError::Other)?;

        let question = normalize(&card.question);
        let question = self
            .formatter
            .format(&card.model_name, &card.template, &question);

        let view = SessionCardView {
            success: true,
            deck_finished: None,
            model_name: card.model_name,
            template: Some(card.template),
            deck_name: card.deck_name,
            question,
            answer: normalize(&card.answer),
        };
        match card.card_id {
            Some(id) => log::info!("card info({}): {:?}", id, view),
            None => log::info!("card info: {:?}", view),
        }
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anki::fake::{unavailable, vocab_card, FakeAnki};

    fn session(fake: &Arc<FakeAnki>) -> LearningSession {
        LearningSession::new(fake.clone(), QuestionFormatter::default(), Duration::ZERO)
    }

    #[tokio::test]
    async fn start_session_presents_clean_formatted_card() {
        let fake = Arc::new(FakeAnki::with_cards(vec![Ok(vocab_card())]));
        let view = session(&fake).start_session().await.unwrap();

        assert_eq!(
            view,
            SessionCardView {
                success: true,
                deck_finished: None,
                model_name: "Vocabulary".to_string(),
                template: Some("card1".to_string()),
                deck_name: "English::Words".to_string(),
                question: "apple 是什么意思？".to_string(),
                answer: "apple\n苹果".to_string(),
            }
        );
        assert_eq!(fake.calls(), vec!["guiCurrentCard", "guiShowAnswer"]);
    }

    #[tokio::test]
    async fn start_session_propagates_service_unavailable() {
        let fake = Arc::new(FakeAnki::with_cards(vec![Err(unavailable())]));
        let err = session(&fake).start_session().await.unwrap_err();
        assert_eq!(err, SessionError::Anki(unavailable()));
        assert_eq!(fake.calls(), vec!["guiCurrentCard"]);
    }

    #[tokio::test]
    async fn start_session_propagates_no_current_card() {
        let fake = Arc::new(FakeAnki::with_cards(vec![Err(AnkiError::Application(
            "Gui review is not currently active.".to_string(),
        ))]));
        let err = session(&fake).start_session().await.unwrap_err();
        assert!(matches!(err, SessionError::Anki(AnkiError::Application(_))));
    }

    #[tokio::test]
    async fn answer_rejects_out_of_range_ease_without_calls() {
        let fake = Arc::new(FakeAnki::with_cards(vec![Ok(vocab_card())]));
        let s = session(&fake);
        for ease in [0, 5, -3] {
            let err = s.answer_and_advance(ease).await.unwrap_err();
            assert!(matches!(err, SessionError::Validation(_)), "ease {}", ease);
        }
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn answer_returns_next_card() {
        let mut next = vocab_card();
        next.template = "card2".to_string();
        next.question = "苹果".to_string();
        let fake = Arc::new(FakeAnki::with_cards(vec![Ok(next)]));

        let view = session(&fake).answer_and_advance(3).await.unwrap();
        assert_eq!(view.question, "苹果 的英文是什么？");
        assert!(!view.is_deck_finished());
        assert_eq!(
            fake.calls(),
            vec!["guiAnswerCard:3", "guiCurrentCard", "guiShowAnswer"]
        );
    }

    #[tokio::test]
    async fn answer_with_no_card_left_finishes_deck() {
        let fake = Arc::new(FakeAnki::with_cards(vec![Err(AnkiError::Application(
            "Gui review is not currently active.".to_string(),
        ))]));
        let view = session(&fake).answer_and_advance(1).await.unwrap();

        assert_eq!(view, SessionCardView::deck_finished());
        assert!(view.success);
        assert_eq!(view.deck_finished, Some(true));
        assert_eq!(view.question, "");
        assert_eq!(view.answer, "");
        assert_eq!(view.model_name, "");
        assert_eq!(view.deck_name, "");
    }

    #[tokio::test]
    async fn answer_with_null_current_card_finishes_deck() {
        let fake = Arc::new(FakeAnki::with_cards(vec![Err(AnkiError::NoCurrentCard)]));
        let view = session(&fake).answer_and_advance(4).await.unwrap();
        assert!(view.is_deck_finished());
    }

    #[tokio::test]
    async fn answer_then_outage_is_not_masked() {
        let fake = Arc::new(FakeAnki::with_cards(vec![Err(unavailable())]));
        let err = session(&fake).answer_and_advance(2).await.unwrap_err();
        assert_eq!(err, SessionError::Anki(unavailable()));
    }

    #[tokio::test]
    async fn answer_then_protocol_error_is_not_masked() {
        let fake = Arc::new(FakeAnki::with_cards(vec![Err(AnkiError::Protocol(
            "{}".to_string(),
        ))]));
        let err = session(&fake).answer_and_advance(2).await.unwrap_err();
        assert!(matches!(err, SessionError::Anki(AnkiError::Protocol(_))));
    }

    #[tokio::test]
    async fn answer_then_reveal_failure_propagates() {
        let fake = Arc::new(
            FakeAnki::with_cards(vec![Ok(vocab_card())])
                .failing_show_answer(AnkiError::Application("reveal failed".to_string())),
        );
        let err = session(&fake).answer_and_advance(3).await.unwrap_err();
        assert_eq!(
            err,
            SessionError::Anki(AnkiError::Application("reveal failed".to_string()))
        );
    }

    #[tokio::test]
    async fn answer_submit_failure_skips_refetch() {
        let fake = Arc::new(FakeAnki::with_cards(vec![Ok(vocab_card())]).failing_answer(unavailable()));
        let err = session(&fake).answer_and_advance(3).await.unwrap_err();
        assert_eq!(err, SessionError::Anki(unavailable()));
        assert_eq!(fake.calls(), vec!["guiAnswerCard:3"]);
    }

    #[test]
    fn finished_view_serializes_without_template() {
        let json = serde_json::to_value(SessionCardView::deck_finished()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "deck_finished": true,
                "model_name": "",
                "deck_name": "",
                "question": "",
                "answer": ""
            })
        );
    }

    #[test]
    fn card_view_serializes_without_finished_flag() {
        let view = SessionCardView {
            success: true,
            template: Some("card1".to_string()),
            ..SessionCardView::default()
        };
        let json = serde_json::to_value(view).unwrap();
        assert!(json.get("deck_finished").is_none());
        assert_eq!(json["template"], "card1");
    }
}
