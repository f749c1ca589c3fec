//! Shared test doubles for the assistant and tool loop tests.

use std::sync::Mutex;

use chatgate_core::audio::{AudioProvider, SpeechRequest, TranscriptionRequest};
use chatgate_core::error::ProviderError;
use chatgate_core::image::{GeneratedImage, ImageProvider, ImageRequest};
use chatgate_core::message::{Message, MessageToolCall};
use chatgate_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the request. Once the queue is empty it fails with
/// `ProviderError::Network`.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that returns a single text response (no tool calls).
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![make_text_response(text)])
    }

    /// Create a provider that first returns tool calls, then a final answer.
    pub fn tool_then_answer(tool_calls: Vec<MessageToolCall>, thought: &str, answer: &str) -> Self {
        Self::new(vec![
            make_tool_call_response(tool_calls, thought),
            make_text_response(answer),
        ])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request seen so far, in call order.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len() - 1
        };
        let responses = self.responses.lock().unwrap();
        responses
            .get(call)
            .cloned()
            .ok_or_else(|| ProviderError::Network(format!("no scripted response for call #{call}")))
    }
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a response with tool calls and optional thought content.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>, thought: &str) -> ProviderResponse {
    let mut msg = Message::assistant(thought);
    msg.tool_calls = tool_calls;
    ProviderResponse {
        message: msg,
        usage: None,
        model: "mock-model".into(),
    }
}

/// Helper to create a tool call.
pub fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

/// Image provider returning fixed URLs and recording prompts.
pub struct MockImageProvider {
    pub urls: Vec<String>,
    pub requests: Mutex<Vec<ImageRequest>>,
}

impl MockImageProvider {
    pub fn new(urls: &[&str]) -> Self {
        Self {
            urls: urls.iter().map(|u| u.to_string()).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ImageProvider for MockImageProvider {
    fn name(&self) -> &str {
        "mock-images"
    }

    async fn generate(&self, request: ImageRequest) -> Result<Vec<GeneratedImage>, ProviderError> {
        self.requests.lock().unwrap().push(request);
        Ok(self
            .urls
            .iter()
            .map(|url| GeneratedImage {
                url: url.clone(),
                revised_prompt: None,
            })
            .collect())
    }
}

/// Audio provider echoing fixed results.
pub struct MockAudioProvider {
    pub transcript: String,
    pub speech: Vec<u8>,
    pub transcriptions: Mutex<Vec<TranscriptionRequest>>,
    pub speeches: Mutex<Vec<SpeechRequest>>,
}

impl MockAudioProvider {
    pub fn new(transcript: &str, speech: &[u8]) -> Self {
        Self {
            transcript: transcript.to_string(),
            speech: speech.to_vec(),
            transcriptions: Mutex::new(Vec::new()),
            speeches: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl AudioProvider for MockAudioProvider {
    fn name(&self) -> &str {
        "mock-audio"
    }

    async fn transcribe(&self, request: TranscriptionRequest) -> Result<String, ProviderError> {
        self.transcriptions.lock().unwrap().push(request);
        Ok(self.transcript.clone())
    }

    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, ProviderError> {
        self.speeches.lock().unwrap().push(request);
        Ok(self.speech.clone())
    }
}
