use crate::llm::TextGenerator;
use crate::types::Result;
use crate::utils::text;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Sites scanned for trending AI coverage.
pub const TOPIC_SOURCES: &[&str] = &[
    "https://news.ycombinator.com",
    "https://www.reddit.com/r/artificial/",
    "https://www.reddit.com/r/MachineLearning/",
    "https://venturebeat.com/category/ai/",
    "https://techcrunch.com/category/artificial-intelligence/",
];

const MAX_TOPICS: usize = 10;
const MAX_PAGE_CHARS: usize = 10_000;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const TREND_SYSTEM_PROMPT: &str =
    "You are a trend analyst specializing in artificial intelligence and technology.";

static NUMBERING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+[.)\]]*\s*").expect("numbering regex"));
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[*+-]\s*").expect("bullet regex"));

/// Trait for producing candidate topics for the pipeline
#[async_trait]
pub trait TopicSource: Send + Sync {
    /// Human-readable name for this source
    fn source_name(&self) -> String;

    /// Fetch an ordered sequence of candidate topics. An empty result
    /// is valid and handled by the selector.
    async fn fetch_candidates(&self) -> Vec<String>;
}

/// Topic source that scrapes the web and asks the generator to distill
/// trending topics; on any failure the static fallback list stands in.
pub struct WebTopicDiscovery {
    client: reqwest::Client,
    generator: Arc<dyn TextGenerator>,
}

impl WebTopicDiscovery {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, generator })
    }

    async fn scrape_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        Ok(extract_page_text(&body))
    }

    async fn extract_topics(&self, contents: &[String]) -> Result<Vec<String>> {
        let prompt = format!(
            "Based on the following content scraped from tech news sites, identify the top 10 \
             trending topics in AI right now. Focus on specific advancements, technologies, \
             research papers, or applications that are gaining significant attention.\n\n\
             For each topic, provide a short, catchy title (5-7 words) that would make a good \
             blog post headline.\n\n\
             Scraped content:\n{}\n\n\
             Return ONLY a list of 10 trending AI topics, one per line, without any additional text.\n\
             DO NOT number your list - just return the topic titles.",
            contents.join("\n\n")
        );

        let response = self
            .generator
            .generate(TREND_SYSTEM_PROMPT, &prompt, 2048, 0.7)
            .await?;

        Ok(parse_topic_lines(&response))
    }
}

#[async_trait]
impl TopicSource for WebTopicDiscovery {
    fn source_name(&self) -> String {
        "Web Topic Discovery".to_string()
    }

    async fn fetch_candidates(&self) -> Vec<String> {
        info!("Discovering trending AI topics");

        let mut contents = Vec::new();
        for source in TOPIC_SOURCES {
            info!("Scraping {}", source);
            match self.scrape_page(source).await {
                Ok(content) if !content.is_empty() => contents.push(content),
                Ok(_) => warn!("No text extracted from {}", source),
                Err(e) => warn!("Error scraping {}: {}", source, e),
            }
        }

        if contents.is_empty() {
            info!("Using fallback trending topics");
            return fallback_topics();
        }

        match self.extract_topics(&contents).await {
            Ok(topics) if !topics.is_empty() => topics,
            Ok(_) => fallback_topics(),
            Err(e) => {
                warn!("Trend extraction failed, using fallback topics: {}", e);
                fallback_topics()
            }
        }
    }
}

/// Fixed list of candidates, mainly for tests and offline runs
pub struct StaticTopicSource {
    topics: Vec<String>,
}

impl StaticTopicSource {
    pub fn new(topics: Vec<String>) -> Self {
        Self { topics }
    }
}

#[async_trait]
impl TopicSource for StaticTopicSource {
    fn source_name(&self) -> String {
        "Static Topic Source".to_string()
    }

    async fn fetch_candidates(&self) -> Vec<String> {
        self.topics.clone()
    }
}

/// Strip list markers from a generator reply and keep at most ten topics
pub fn parse_topic_lines(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let line = NUMBERING.replace(line, "");
            BULLET.replace(&line, "").to_string()
        })
        .filter(|line| !line.is_empty())
        .take(MAX_TOPICS)
        .collect()
}

/// Flatten an HTML document into whitespace-collapsed visible text
fn extract_page_text(body: &str) -> String {
    let document = Html::parse_document(body);
    let raw = document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ");
    text::truncate_chars(&text::collapse_whitespace(&raw), MAX_PAGE_CHARS).to_string()
}

/// Static topic list used when scraping or extraction fails
pub fn fallback_topics() -> Vec<String> {
    [
        "GPT-5 Rumors and Expected Capabilities",
        "Open-Source LLMs Challenging Commercial Models",
        "AI Coding Assistants Revolution",
        "Multimodal AI Systems Breaking Barriers",
        "AI Ethics and Regulation Developments",
        "Edge AI and On-Device Intelligence",
        "AI in Healthcare Diagnostic Breakthroughs",
        "Generative AI for Creative Industries",
        "AI Agents and Autonomous Systems",
        "Foundation Models in Scientific Discovery",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbering_and_bullets_are_stripped() {
        let response =
            "1. Edge AI Goes Mainstream\n2) Agents Everywhere\n- Robots Learn Chores\n* Small Models Win\n";
        assert_eq!(
            parse_topic_lines(response),
            vec![
                "Edge AI Goes Mainstream",
                "Agents Everywhere",
                "Robots Learn Chores",
                "Small Models Win"
            ]
        );
    }

    #[test]
    fn topic_list_is_capped_at_ten() {
        let response = (1..=15)
            .map(|i| format!("Topic number {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(parse_topic_lines(&response).len(), 10);
    }

    #[test]
    fn page_text_is_flattened() {
        let html = "<html><body><h1>Hello</h1>\n<p>world   wide</p></body></html>";
        assert_eq!(extract_page_text(html), "Hello world wide");
    }

    #[test]
    fn fallback_list_has_ten_topics() {
        assert_eq!(fallback_topics().len(), 10);
    }

    #[tokio::test]
    async fn static_source_returns_its_topics() {
        let source = StaticTopicSource::new(vec!["A".to_string(), "B".to_string()]);
        assert_eq!(source.fetch_candidates().await, vec!["A", "B"]);
    }
}
