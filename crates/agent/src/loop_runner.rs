//! The tool-calling loop.

use std::sync::Arc;

use chatgate_core::message::Message;
use chatgate_core::provider::{Provider, ProviderRequest, Usage};
use chatgate_core::tool::{ToolCall, ToolRegistry};
use tracing::{debug, warn};

use crate::prompts::MAX_ITERATIONS_REACHED;

/// Calls the model, runs any tools it asks for, and repeats until it
/// answers with plain text.
pub struct ToolLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Max tokens per response
    max_tokens: Option<u32>,

    /// Tools offered to the model
    tools: Arc<ToolRegistry>,

    /// Maximum model calls per run
    max_iterations: u32,
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    /// Final assistant text (may be empty)
    pub text: String,

    /// Model calls made
    pub iterations: u32,

    /// Tool calls executed across all iterations
    pub tool_calls_made: usize,

    /// Usage reported by the last model call
    pub usage: Option<Usage>,
}

impl ToolLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            max_iterations: 10,
        }
    }

    /// Set the maximum number of model calls.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn with_max_tokens(mut self, max: Option<u32>) -> Self {
        self.max_tokens = max;
        self
    }

    /// Run the loop over `messages` (system prompt, history and the new
    /// user turn, already in order).
    ///
    /// Tool failures are reported back to the model as `Error: ...` tool
    /// results so it can recover; provider failures end the run.
    pub async fn run(&self, mut messages: Vec<Message>) -> chatgate_core::Result<LoopOutcome> {
        let tool_definitions = self.tools.definitions();
        let mut tool_calls_made = 0;
        let mut usage = None;

        for iteration in 1..=self.max_iterations {
            debug!(iteration, messages = messages.len(), "Tool loop iteration");

            let mut request = ProviderRequest::new(self.model.clone(), messages.clone());
            request.temperature = self.temperature;
            request.max_tokens = self.max_tokens;
            request.tools = tool_definitions.clone();

            let response = self.provider.complete(request).await?;
            usage = response.usage.clone();

            if response.message.tool_calls.is_empty() {
                return Ok(LoopOutcome {
                    text: response.message.content,
                    iterations: iteration,
                    tool_calls_made,
                    usage,
                });
            }

            debug!(
                tool_count = response.message.tool_calls.len(),
                "Executing tool calls"
            );

            let tool_calls = response.message.tool_calls.clone();
            messages.push(response.message);

            for tc in &tool_calls {
                let call = ToolCall {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments: serde_json::from_str(&tc.arguments).unwrap_or_default(),
                };
                tool_calls_made += 1;

                let output = match self.tools.execute(&call).await {
                    Ok(result) => result.output,
                    Err(e) => {
                        warn!(tool = %tc.name, error = %e, "Tool execution failed");
                        format!("Error: {e}")
                    }
                };
                messages.push(Message::tool_result(&tc.id, output));
            }
        }

        warn!(
            iterations = self.max_iterations,
            "Max tool iterations reached, forcing text response"
        );
        Ok(LoopOutcome {
            text: MAX_ITERATIONS_REACHED.into(),
            iterations: self.max_iterations,
            tool_calls_made,
            usage,
        })
    }
}
