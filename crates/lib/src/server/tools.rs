//! Tool definitions. Descriptions are written for the LLM driving the session.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::session::{LearningSession, SessionCardView, SessionError};

const INSTRUCTIONS: &str = "Quiz the user on their Anki cards. Call start_learning, ask the \
question, judge the reply, then call answer_and_get_next_card with an ease rating. Never reveal \
the answer before the user responds. Stop when deck_finished is true.";

/// Arguments for `answer_and_get_next_card`.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnswerParams {
    /// 1=Again, 2=Hard, 3=Good, 4=Easy
    pub ease: i64,
}

#[derive(Clone)]
pub struct AnkiTools {
    session: Arc<LearningSession>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl AnkiTools {
    pub fn new(session: Arc<LearningSession>) -> Self {
        Self {
            session,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Start a new learning session and return the current card. The `question` \
field contains the properly formatted question to ask the user. DO NOT reveal the `answer` to \
the user before they respond!"
    )]
    async fn start_learning(&self) -> Result<CallToolResult, McpError> {
        to_tool_result(self.session.start_session().await)
    }

    #[tool(
        description = "Answer the current card and get the next one. ease: 1=Again, 2=Hard, \
3=Good, 4=Easy. Judge the user's answer quality and map it to ease: wrong = 1, struggled but \
correct = 2, normal correct = 3, easy = 4. When `deck_finished` is true there are no more cards."
    )]
    async fn answer_and_get_next_card(
        &self,
        Parameters(AnswerParams { ease }): Parameters<AnswerParams>,
    ) -> Result<CallToolResult, McpError> {
        to_tool_result(self.session.answer_and_advance(ease).await)
    }
}

#[tool_handler]
impl ServerHandler for AnkiTools {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Bad arguments reject the call; Anki failures come back as an error result the LLM can relay.
fn to_tool_result(
    result: Result<SessionCardView, SessionError>,
) -> Result<CallToolResult, McpError> {
    match result {
        Ok(view) => {
            let text = render_view(&view).map_err(|e| McpError::internal_error(e.to_string(), None))?;
            Ok(CallToolResult::success(vec![Content::text(text)]))
        }
        Err(SessionError::Validation(msg)) => Err(McpError::invalid_params(msg, None)),
        Err(SessionError::Anki(e)) => {
            log::warn!("tool call failed: {}", e);
            Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
        }
    }
}

fn render_view(view: &SessionCardView) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(view)
}
