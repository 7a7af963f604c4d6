use crate::types::{GeneratorConfig, PipelineError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

/// Trait for text generators that turn prompts into completions
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Get the name of this generator
    fn generator_name(&self) -> String;

    /// Produce a completion for the given system/user prompt pair
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String>;
}

/// Trait for image synthesizers that turn a prompt into raw image bytes
#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    /// Get the name of this synthesizer
    fn synthesizer_name(&self) -> String;

    /// Render the prompt into PNG bytes
    async fn synthesize(&self, prompt: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Text generator backed by an OpenAI-compatible chat-completions endpoint
pub struct ChatGenerator {
    client: reqwest::Client,
    config: GeneratorConfig,
}

impl ChatGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl TextGenerator for ChatGenerator {
    fn generator_name(&self) -> String {
        format!("Chat Generator ({})", self.config.model)
    }

    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            max_tokens,
            temperature,
        };

        debug!("Requesting completion from {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Completion request failed with status {}", status);
            return Err(PipelineError::Generation(format!(
                "completion endpoint returned {}",
                status
            )));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| PipelineError::Generation("completion had no choices".to_string()))?;

        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct SdxlRequest<'a> {
    prompt: &'a str,
    height: u32,
    width: u32,
    guidance_scale: f32,
    high_noise_frac: f32,
    seed: u32,
    steps: u32,
    use_refiner: bool,
}

/// Image synthesizer backed by an SDXL HTTP endpoint
pub struct SdxlSynthesizer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SdxlSynthesizer {
    pub fn new(base_url: String, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(180))
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl ImageSynthesizer for SdxlSynthesizer {
    fn synthesizer_name(&self) -> String {
        format!("SDXL Synthesizer ({})", self.base_url)
    }

    async fn synthesize(&self, prompt: &str) -> Result<Vec<u8>> {
        let seed = (uuid::Uuid::new_v4().as_u128() % u128::from(u32::MAX)) as u32;
        let request = SdxlRequest {
            prompt,
            height: 1024,
            width: 1024,
            guidance_scale: 7.5,
            high_noise_frac: 0.8,
            seed,
            steps: 30,
            use_refiner: true,
        };

        debug!("Requesting image from {}", self.base_url);

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PipelineError::Generation(format!(
                "image endpoint returned {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// A scripted reply for the mock generator
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    Fail(String),
}

/// Mock text generator for development and testing.
///
/// Replies are consumed from a script in order; once the script is
/// exhausted the fallback reply (if any) is repeated, otherwise the
/// call fails.
pub struct ScriptedGenerator {
    name: String,
    replies: Mutex<VecDeque<ScriptedReply>>,
    fallback: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(name: &str, replies: Vec<ScriptedReply>) -> Self {
        Self {
            name: name.to_string(),
            replies: Mutex::new(replies.into()),
            fallback: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Generator that answers every call with the same text
    pub fn always(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            replies: Mutex::new(VecDeque::new()),
            fallback: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Generator that fails every call
    pub fn never(name: &str) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn with_fallback(mut self, text: &str) -> Self {
        self.fallback = Some(text.to_string());
        self
    }

    /// Number of generate calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn generator_name(&self) -> String {
        format!("Scripted Generator ({})", self.name)
    }

    async fn generate(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = self
            .replies
            .lock()
            .expect("scripted replies lock poisoned")
            .pop_front();

        match next {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Fail(reason)) => Err(PipelineError::Generation(reason)),
            None => match &self.fallback {
                Some(text) => Ok(text.clone()),
                None => Err(PipelineError::Generation("script exhausted".to_string())),
            },
        }
    }
}

/// Mock image synthesizer for development and testing
pub struct ScriptedSynthesizer {
    bytes: Option<Vec<u8>>,
    calls: AtomicUsize,
}

impl ScriptedSynthesizer {
    /// Synthesizer that returns the given bytes on every call
    pub fn always(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Some(bytes),
            calls: AtomicUsize::new(0),
        }
    }

    /// Synthesizer that fails every call
    pub fn never() -> Self {
        Self {
            bytes: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageSynthesizer for ScriptedSynthesizer {
    fn synthesizer_name(&self) -> String {
        "Scripted Synthesizer".to_string()
    }

    async fn synthesize(&self, _prompt: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.bytes {
            Some(bytes) => Ok(bytes.clone()),
            None => Err(PipelineError::Generation(
                "image synthesis unavailable".to_string(),
            )),
        }
    }
}
