//! Question formatting: vocabulary cards get a localized prompt appended so the LLM
//! asks the question in the right direction.

/// Models treated as vocabulary: single words and multi-word phrases.
pub const DEFAULT_VOCAB_MODELS: &[&str] = &["Vocabulary", "Phrase"];

/// Template that shows the translation and asks for the English term.
pub const REVERSE_TEMPLATE: &str = "card2";
/// Template that shows the English term and asks for its meaning.
pub const FORWARD_TEMPLATE: &str = "card1";

const REVERSE_PROMPT: &str = "的英文是什么？";
const FORWARD_PROMPT: &str = "是什么意思？";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionFormatter {
    vocab_models: Vec<String>,
}

impl Default for QuestionFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_VOCAB_MODELS.iter().map(|s| s.to_string()))
    }
}

impl QuestionFormatter {
    pub fn new(vocab_models: impl IntoIterator<Item = String>) -> Self {
        Self {
            vocab_models: vocab_models.into_iter().collect(),
        }
    }

    pub fn vocab_models(&self) -> &[String] {
        &self.vocab_models
    }

    pub fn is_vocab_model(&self, model_name: &str) -> bool {
        self.vocab_models.iter().any(|m| m == model_name)
    }

    /// Text to show for a question, given the card's model and template.
    pub fn format(&self, model_name: &str, template: &str, question: &str) -> String {
        if self.is_vocab_model(model_name) {
            match template {
                REVERSE_TEMPLATE => return format!("{} {}", question, REVERSE_PROMPT),
                FORWARD_TEMPLATE => return format!("{} {}", question, FORWARD_PROMPT),
                _ => {}
            }
        }
        question.to_string()
    }
}

/// [`QuestionFormatter::format`] with the default vocabulary models.
pub fn format_question(model_name: &str, template: &str, question: &str) -> String {
    QuestionFormatter::default().format(model_name, template, question)
}
