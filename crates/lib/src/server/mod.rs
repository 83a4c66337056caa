//! MCP tool surface: exposes the learning session to an LLM client over stdio.
//!
//! Two tools: `start_learning` and `answer_and_get_next_card`. stdout carries the protocol,
//! so nothing else in the process may print to it.

mod tools;

pub use tools::{AnkiTools, AnswerParams};

use rmcp::ServiceExt;
use std::sync::Arc;

use crate::anki::AnkiClient;
use crate::config::{self, Config};
use crate::session::LearningSession;

/// Build the learning session for this config (AnkiConnect client, formatter, settle delay).
pub fn build_session(config: &Config) -> LearningSession {
    let endpoint = config::resolve_endpoint(config);
    let formatter = config::question_formatter(config);
    log::info!(
        "using AnkiConnect at {}, vocabulary models {:?}",
        endpoint,
        formatter.vocab_models()
    );
    LearningSession::new(
        Arc::new(AnkiClient::new(Some(endpoint))),
        formatter,
        config.anki.settle_delay(),
    )
}

/// Serve the tools on stdin/stdout until the client disconnects.
pub async fn run_stdio(config: Config) -> anyhow::Result<()> {
    let tools = AnkiTools::new(Arc::new(build_session(&config)));
    let service = tools
        .serve(rmcp::transport::stdio())
        .await
        .inspect_err(|e| log::error!("mcp serve error: {:?}", e))?;
    let reason = service.waiting().await?;
    log::info!("mcp session ended: {:?}", reason);
    Ok(())
}
