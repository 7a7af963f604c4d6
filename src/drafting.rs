use crate::llm::TextGenerator;
use crate::types::PipelineState;
use tracing::{info, warn};

const DRAFT_SYSTEM_PROMPT: &str = "\
You are an expert tech blogger specializing in artificial intelligence.
Write a comprehensive, engaging, and informative blog post about the following trending AI topic.

Your blog post should:
- Have a catchy title
- Include an introduction that explains why this topic is important
- Have clear sections with descriptive headings
- Provide technical details while remaining accessible to a general audience
- Include real-world applications or examples
- Discuss potential future implications
- End with a conclusion that summarizes key points

The blog post should be approximately 1000-1500 words and written in a professional yet conversational tone.
Do not include any placeholder text or notes about the structure - write the complete post ready for publication.

Format the post in Markdown with proper headings, paragraphs, and emphasis where appropriate.";

/// Produce the initial article for the selected topic.
///
/// A failed generation call substitutes a labeled placeholder article,
/// so `article_text` is never left empty.
pub async fn draft_article(state: &mut PipelineState, generator: &dyn TextGenerator) {
    info!("Generating initial content for topic: {}", state.selected_topic);

    let user_prompt = format!(
        "Write a blog post about the trending AI topic: {}",
        state.selected_topic
    );

    let content = match generator
        .generate(DRAFT_SYSTEM_PROMPT, &user_prompt, 4000, 0.7)
        .await
    {
        Ok(content) => content,
        Err(e) => {
            warn!("Error generating content, using placeholder: {}", e);
            placeholder_article(&state.selected_topic)
        }
    };

    state.article_text = content;
    state.refinement_count = 0;
    state.feedback_history.clear();
}

/// Clearly-labeled stand-in article for a failed draft call
pub fn placeholder_article(topic: &str) -> String {
    format!(
        "# {topic}: An Overview\n\n\
         ## Introduction\n\
         This is a placeholder introduction for the topic '{topic}'.\n\
         The complete content generation encountered an error.\n\n\
         ## Key Points\n\
         - Point 1\n\
         - Point 2\n\
         - Point 3\n\n\
         ## Conclusion\n\
         This is a placeholder conclusion.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedGenerator;

    #[tokio::test]
    async fn successful_draft_fills_article_text() {
        let generator = ScriptedGenerator::always("gen", "# A Fine Post\n\nBody text.");
        let mut state = PipelineState::with_run_id("test".to_string());
        state.selected_topic = "Edge AI".to_string();

        draft_article(&mut state, &generator).await;

        assert_eq!(state.article_text, "# A Fine Post\n\nBody text.");
        assert_eq!(state.refinement_count, 0);
        assert!(state.feedback_history.is_empty());
    }

    #[tokio::test]
    async fn failed_draft_falls_back_to_placeholder() {
        let generator = ScriptedGenerator::never("gen");
        let mut state = PipelineState::with_run_id("test".to_string());
        state.selected_topic = "Edge AI".to_string();

        draft_article(&mut state, &generator).await;

        assert!(!state.article_text.is_empty());
        assert!(state.article_text.contains("Edge AI"));
        assert!(state.article_text.contains("placeholder"));
    }
}
