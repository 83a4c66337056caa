//! Card HTML to plain text for LLM consumption.

mod normalize;

pub use normalize::{normalize, Action, Rule, RULES};
