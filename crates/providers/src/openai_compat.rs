//! OpenAI-compatible chat provider.
//!
//! Works with OpenAI and any endpoint exposing `/v1/chat/completions`
//! (OpenRouter, Ollama, vLLM, ...).
//!
//! Supports:
//! - Chat completions (non-streaming and streaming SSE)
//! - Tool use / function calling
//! - Image inputs via `image_url` content parts
//! - Health checks

use std::collections::BTreeMap;

use async_trait::async_trait;
use chatgate_core::error::ProviderError;
use chatgate_core::message::{Message, MessageToolCall, Role};
use chatgate_core::provider::*;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::http::{build_client, check_status, network_error, require_api_key};

/// An OpenAI-compatible chat provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new provider with its own HTTP client.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self::with_client(name, base_url, api_key, build_client())
    }

    /// Create a provider sharing an existing HTTP client.
    pub fn with_client(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    /// Convert our Message types to OpenAI API format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.as_str().to_string(),
                content: Some(Self::to_api_content(m)),
                tool_calls: if m.tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        m.tool_calls
                            .iter()
                            .map(|tc| ApiToolCall {
                                id: tc.id.clone(),
                                r#type: "function".into(),
                                function: ApiFunction {
                                    name: tc.name.clone(),
                                    arguments: tc.arguments.clone(),
                                },
                            })
                            .collect(),
                    )
                },
                tool_call_id: m.tool_call_id.clone(),
            })
            .collect()
    }

    /// Plain string content, or a parts array when media is attached.
    fn to_api_content(message: &Message) -> serde_json::Value {
        match &message.media {
            None => serde_json::Value::String(message.content.clone()),
            Some(media) => serde_json::json!([
                { "type": "text", "text": message.content },
                { "type": "image_url", "image_url": { "url": media.to_url() } },
            ]),
        }
    }

    /// Convert tool definitions to OpenAI API format.
    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<ApiToolDefinition> {
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                r#type: "function".into(),
                function: ApiToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }

    fn request_body(request: &ProviderRequest, stream: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
            "stream": stream,
        });

        if stream {
            body["stream_options"] = serde_json::json!({ "include_usage": true });
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(&request.tools));
        }

        body
    }

    async fn post_completion(
        &self,
        body: &serde_json::Value,
        accept: &str,
    ) -> Result<reqwest::Response, ProviderError> {
        require_api_key(&self.name, &self.api_key)?;
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Accept", accept)
            .json(body)
            .send()
            .await
            .map_err(network_error)?;
        check_status(response, &self.name).await
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let body = Self::request_body(&request, false);

        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending completion request"
        );

        let response = self.post_completion(&body, "application/json").await?;

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".into()))?;

        let tool_calls: Vec<MessageToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| MessageToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        let content = match choice.message.content {
            Some(serde_json::Value::String(s)) => s,
            _ => String::new(),
        };

        let mut message = Message::new(Role::Assistant, content);
        message.tool_calls = tool_calls;

        Ok(ProviderResponse {
            message,
            usage: api_response.usage.map(Usage::from),
            model: api_response.model,
        })
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        require_api_key(&self.name, &self.api_key)?;
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(network_error)?;

        Ok(response.status().is_success())
    }

    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ChunkReceiver, ProviderError> {
        let body = Self::request_body(&request, true);

        debug!(provider = %self.name, model = %request.model, "Sending streaming request");

        let response = self.post_completion(&body, "text/event-stream").await?;

        let (tx, rx) = tokio::sync::mpsc::channel(64);
        let provider_name = self.name.clone();

        // Read the SSE byte stream and forward parsed chunks.
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut parser = SseParser::default();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                for chunk in parser.feed(&bytes, &provider_name) {
                    let done = chunk.done;
                    if tx.send(Ok(chunk)).await.is_err() {
                        return; // receiver dropped
                    }
                    if done {
                        return;
                    }
                }
            }

            // Stream ended without [DONE].
            let _ = tx.send(Ok(parser.finish(None))).await;
        });

        Ok(rx)
    }
}

// --- SSE parsing ---

/// Incremental parser for `data: {...}` lines of a chat-completion stream.
///
/// Bytes are buffered until a full line is available, so multi-byte UTF-8
/// sequences split across network chunks decode correctly.
#[derive(Default)]
struct SseParser {
    buffer: Vec<u8>,
    tool_calls: BTreeMap<u32, ToolCallAccumulator>,
}

impl SseParser {
    /// Consume raw bytes and return the chunks they complete.
    ///
    /// At most one returned chunk has `done == true`, and it is last.
    fn feed(&mut self, bytes: &[u8], provider: &str) -> Vec<StreamChunk> {
        self.buffer.extend_from_slice(bytes);
        let mut out = Vec::new();

        while let Some(line_end) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=line_end).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\r', '\n']);

            // Skip blank lines, comments and non-data fields.
            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();

            if data == "[DONE]" {
                out.push(self.finish(None));
                return out;
            }

            let parsed = match serde_json::from_str::<StreamResponse>(data) {
                Ok(p) => p,
                Err(e) => {
                    trace!(provider, data, error = %e, "Ignoring unparseable SSE chunk");
                    continue;
                }
            };

            if let Some(choice) = parsed.choices.into_iter().next() {
                for delta in choice.delta.tool_calls.unwrap_or_default() {
                    let acc = self.tool_calls.entry(delta.index).or_default();
                    if let Some(id) = delta.id {
                        acc.id = id;
                    }
                    if let Some(func) = delta.function {
                        if let Some(name) = func.name {
                            acc.name = name;
                        }
                        if let Some(args) = func.arguments {
                            acc.arguments.push_str(&args);
                        }
                    }
                }

                if choice.delta.content.as_ref().is_some_and(|c| !c.is_empty()) {
                    out.push(StreamChunk {
                        content: choice.delta.content,
                        tool_calls: Vec::new(),
                        done: false,
                        usage: None,
                    });
                }
            }

            // With `include_usage`, the usage chunk is the last data chunk.
            if let Some(usage) = parsed.usage {
                out.push(self.finish(Some(usage.into())));
                return out;
            }
        }

        out
    }

    /// Build the terminal chunk carrying any accumulated tool calls.
    fn finish(&mut self, usage: Option<Usage>) -> StreamChunk {
        let tool_calls = std::mem::take(&mut self.tool_calls)
            .into_values()
            .map(ToolCallAccumulator::into_tool_call)
            .collect();
        StreamChunk {
            content: None,
            tool_calls,
            done: true,
            usage,
        }
    }
}

/// Accumulates incremental tool call deltas into a complete tool call.
#[derive(Default)]
struct ToolCallAccumulator {
    id: String,
    name: String,
    arguments: String,
}

impl ToolCallAccumulator {
    fn into_tool_call(self) -> MessageToolCall {
        MessageToolCall {
            id: self.id,
            name: self.name,
            arguments: self.arguments,
        }
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    r#type: String,
    function: ApiFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolDefinition {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl From<ApiUsage> for Usage {
    fn from(u: ApiUsage) -> Self {
        Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

/// A single SSE `data: {...}` chunk from a streaming response.
#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<StreamToolCallDelta>>,
}

/// A tool call delta: arrives incrementally across chunks.
#[derive(Debug, Deserialize)]
struct StreamToolCallDelta {
    index: u32,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<StreamFunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct StreamFunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatgate_core::message::Media;

    #[test]
    fn openai_constructor_trims_trailing_slash() {
        let provider = OpenAiCompatProvider::new("custom", "http://localhost:11434/v1/", "k");
        assert_eq!(provider.name(), "custom");
        assert_eq!(provider.base_url, "http://localhost:11434/v1");
        assert!(OpenAiCompatProvider::openai("sk").base_url.contains("api.openai.com"));
    }

    #[test]
    fn message_conversion() {
        let messages = vec![Message::system("You are helpful"), Message::user("Hello")];
        let api_messages = OpenAiCompatProvider::to_api_messages(&messages);
        assert_eq!(api_messages.len(), 2);
        assert_eq!(api_messages[0].role, "system");
        assert_eq!(api_messages[1].role, "user");
        assert_eq!(api_messages[1].content, Some(serde_json::json!("Hello")));
    }

    #[test]
    fn message_with_media_becomes_content_parts() {
        let msg = Message::user("Explain what do you see on this picture?")
            .with_media(Media::base64("image/png", "iVBORw0"));
        let api = OpenAiCompatProvider::to_api_messages(&[msg]);
        let parts = api[0].content.as_ref().unwrap().as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["url"], "data:image/png;base64,iVBORw0");
    }

    #[test]
    fn message_conversion_with_tool_calls() {
        let mut msg = Message::assistant("");
        msg.tool_calls = vec![MessageToolCall {
            id: "call_1".into(),
            name: "fetch_all_names".into(),
            arguments: "{}".into(),
        }];
        let api_msgs = OpenAiCompatProvider::to_api_messages(&[msg]);
        let tc = api_msgs[0].tool_calls.as_ref().unwrap();
        assert_eq!(tc.len(), 1);
        assert_eq!(tc[0].function.name, "fetch_all_names");
        assert_eq!(tc[0].r#type, "function");
    }

    #[test]
    fn message_conversion_tool_response() {
        let msg = Message::tool_result("call_1", "Found names: Simon");
        let api_msgs = OpenAiCompatProvider::to_api_messages(&[msg]);
        assert_eq!(api_msgs[0].role, "tool");
        assert_eq!(api_msgs[0].tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn request_body_includes_options() {
        let mut request = ProviderRequest::new("gpt-4.1-mini", vec![Message::user("hi")]);
        request.temperature = 0.2;
        request.max_tokens = Some(1000);
        request.tools = vec![ToolDefinition {
            name: "add_new_name".into(),
            description: "Adds a name".into(),
            parameters: serde_json::json!({"type": "object"}),
        }];

        let body = OpenAiCompatProvider::request_body(&request, false);
        assert_eq!(body["model"], "gpt-4.1-mini");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["stream"], false);
        assert_eq!(body["tools"][0]["function"]["name"], "add_new_name");
        assert!(body.get("stream_options").is_none());

        let streaming = OpenAiCompatProvider::request_body(&request, true);
        assert_eq!(streaming["stream"], true);
        assert_eq!(streaming["stream_options"]["include_usage"], true);
    }

    #[test]
    fn request_body_omits_empty_optionals() {
        let body = OpenAiCompatProvider::request_body(&ProviderRequest::new("m", vec![]), false);
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn parse_completion_response() {
        let data = r#"{
            "model": "gpt-4o-mini-2024",
            "choices": [{"message": {"role": "assistant", "content": "Hi there"}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.model, "gpt-4o-mini-2024");
        assert_eq!(
            parsed.choices[0].message.content,
            Some(serde_json::json!("Hi there"))
        );
        assert_eq!(parsed.usage.unwrap().total_tokens, 5);
    }

    // --- SSE parsing ---

    #[test]
    fn sse_content_deltas_then_done() {
        let mut parser = SseParser::default();
        let chunks = parser.feed(
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n\
              data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n\
              data: [DONE]\n\n",
            "test",
        );
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content.as_deref(), Some("Hel"));
        assert_eq!(chunks[1].content.as_deref(), Some("lo"));
        assert!(chunks[2].done);
        assert!(chunks[2].tool_calls.is_empty());
    }

    #[test]
    fn sse_lines_split_across_feeds() {
        let mut parser = SseParser::default();
        assert!(parser.feed(b"data: {\"choices\":[{\"delta\":{\"con", "t").is_empty());
        let chunks = parser.feed(b"tent\":\"Hi\"}}]}\r\n", "t");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content.as_deref(), Some("Hi"));
    }

    #[test]
    fn sse_multibyte_character_split_across_feeds() {
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"héllo\"}}]}\n".as_bytes();
        // Split in the middle of the two-byte 'é'.
        let split = line.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let mut parser = SseParser::default();
        assert!(parser.feed(&line[..split], "t").is_empty());
        let chunks = parser.feed(&line[split..], "t");
        assert_eq!(chunks[0].content.as_deref(), Some("héllo"));
    }

    #[test]
    fn sse_tool_call_deltas_accumulate() {
        let mut parser = SseParser::default();
        let mut chunks = parser.feed(
            br#"data: {"choices":[{"delta":{"tool_calls":[{"index":0,"id":"call_abc","function":{"name":"find_name_by_name","arguments":""}}]}}]}
data: {"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{\"name\""}}]}}]}
data: {"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":":\"si\"}"}}]}}]}
data: {"choices":[],"usage":{"prompt_tokens":10,"completion_tokens":5,"total_tokens":15}}
"#,
            "t",
        );
        assert_eq!(chunks.len(), 1);
        let done = chunks.pop().unwrap();
        assert!(done.done);
        assert_eq!(done.usage.unwrap().total_tokens, 15);
        assert_eq!(done.tool_calls.len(), 1);
        assert_eq!(done.tool_calls[0].id, "call_abc");
        assert_eq!(done.tool_calls[0].name, "find_name_by_name");
        assert_eq!(done.tool_calls[0].arguments, r#"{"name":"si"}"#);
    }

    #[test]
    fn sse_parallel_tool_calls_keep_index_order() {
        let mut parser = SseParser::default();
        let chunks = parser.feed(
            br#"data: {"choices":[{"delta":{"tool_calls":[{"index":1,"id":"b","function":{"name":"add_new_name","arguments":"{}"}},{"index":0,"id":"a","function":{"name":"fetch_all_names","arguments":"{}"}}]}}]}
data: [DONE]
"#,
            "t",
        );
        let done = chunks.last().unwrap();
        assert_eq!(done.tool_calls[0].id, "a");
        assert_eq!(done.tool_calls[1].id, "b");
    }

    #[test]
    fn sse_ignores_comments_and_garbage() {
        let mut parser = SseParser::default();
        let chunks = parser.feed(b": keep-alive\n\ndata: not json\nevent: ping\n", "t");
        assert!(chunks.is_empty());
    }

    #[test]
    fn sse_finish_without_done_marker() {
        let mut parser = SseParser::default();
        parser.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n", "t");
        let last = parser.finish(None);
        assert!(last.done);
        assert!(last.content.is_none());
    }
}
