use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Maximum number of critique/rewrite rounds before the loop hands off.
pub const DEFAULT_MAX_ROUNDS: u32 = 4;

/// Topic used when discovery produces no candidates.
pub const DEFAULT_TOPIC: &str = "Recent Advances in Large Language Models";

/// Shared state threaded through every pipeline stage.
///
/// Each stage overwrites only the fields it owns; `article_text` is the
/// one field intentionally rewritten every refinement round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    pub candidate_topics: Vec<String>,
    pub selected_topic: String,
    pub article_text: String,
    pub refinement_count: u32,
    pub feedback_history: Vec<Vec<String>>,
    /// Path to the generated image, or empty when synthesis failed.
    pub image_reference: String,
    pub page_artifact: String,
    pub run_id: String,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::with_run_id(Utc::now().format("%Y%m%d_%H%M%S").to_string())
    }

    pub fn with_run_id(run_id: String) -> Self {
        Self {
            candidate_topics: Vec::new(),
            selected_topic: String::new(),
            article_text: String::new(),
            refinement_count: 0,
            feedback_history: Vec::new(),
            image_reference: String::new(),
            page_artifact: String::new(),
            run_id,
        }
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the chat-completion generator endpoint.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://llama3-3-70b.lepton.run/api/v1".to_string(),
            api_key: String::new(),
            model: "llama3.3-70b".to_string(),
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
