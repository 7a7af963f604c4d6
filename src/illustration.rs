use crate::llm::{ImageSynthesizer, TextGenerator};
use crate::types::PipelineState;
use crate::utils::text;
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use tracing::{info, warn};

const PROMPT_SYSTEM_PROMPT: &str = "\
You are an expert in creating prompts for AI image generation systems like Stable Diffusion.

Based on the blog post I'll share, create a detailed prompt that will generate an engaging
and relevant featured image for the post.

The prompt should:
- Be detailed and specific
- Include visual elements related to the topic
- Specify a style that matches the tone of the article
- Be optimized for AI image generation

Return ONLY the image generation prompt, without any additional text or explanations.
The prompt should be 1-3 sentences.";

const ARTICLE_EXCERPT_CHARS: usize = 2000;
const STYLE_SUFFIX: &str = ", digital art, high quality, detailed illustration";

/// Derives an image prompt from the article and synthesizes a featured
/// image, saving it under `<output>/images/`.
pub struct Illustrator<'a> {
    generator: &'a dyn TextGenerator,
    synthesizer: &'a dyn ImageSynthesizer,
    output_dir: PathBuf,
}

impl<'a> Illustrator<'a> {
    pub fn new(
        generator: &'a dyn TextGenerator,
        synthesizer: &'a dyn ImageSynthesizer,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            generator,
            synthesizer,
            output_dir: output_dir.into(),
        }
    }

    /// Set `image_reference` (empty on failure) and return the prompt
    /// that was used, for logging.
    pub async fn illustrate(&self, state: &mut PipelineState) -> String {
        info!("Generating image for the blog post");

        let prompt = self.derive_prompt(state).await;
        info!("Image generation prompt: {}", prompt);

        state.image_reference = match self.synthesize_and_save(&prompt).await {
            Some(path) => path,
            None => {
                warn!("Failed to generate image, renderer will use a placeholder");
                String::new()
            }
        };

        prompt
    }

    async fn derive_prompt(&self, state: &PipelineState) -> String {
        let user_prompt = format!(
            "Blog post topic: {}\n\nBlog post content (excerpt):\n```\n{}\n```\n\n\
             Create an image generation prompt for this article.",
            state.selected_topic,
            text::truncate_chars(&state.article_text, ARTICLE_EXCERPT_CHARS)
        );

        let mut prompt = match self
            .generator
            .generate(PROMPT_SYSTEM_PROMPT, &user_prompt, 200, 0.7)
            .await
        {
            Ok(reply) => reply.trim().trim_matches('"').trim().to_string(),
            Err(e) => {
                warn!("Error generating image prompt, using template: {}", e);
                fallback_prompt(&state.selected_topic)
            }
        };

        let lowered = prompt.to_lowercase();
        if !lowered.contains("digital art") && !lowered.contains("illustration") {
            prompt.push_str(STYLE_SUFFIX);
        }

        prompt
    }

    async fn synthesize_and_save(&self, prompt: &str) -> Option<String> {
        let bytes = match self.synthesizer.synthesize(prompt).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Image synthesis failed: {}", e);
                return None;
            }
        };

        let images_dir = self.output_dir.join("images");
        if let Err(e) = fs::create_dir_all(&images_dir) {
            warn!("Could not create images directory: {}", e);
            return None;
        }

        let path = images_dir.join(format!("blog_image_{}.png", prompt_hash(prompt)));
        match fs::write(&path, bytes) {
            Ok(()) => {
                info!("Image saved to {}", path.display());
                Some(path.to_string_lossy().into_owned())
            }
            Err(e) => {
                warn!("Could not save image: {}", e);
                None
            }
        }
    }
}

/// Templated prompt used when prompt derivation fails
pub fn fallback_prompt(topic: &str) -> String {
    format!(
        "Highly detailed digital illustration of {topic}, futuristic, \
         technology concept, blue background, high quality"
    )
}

fn prompt_hash(prompt: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    prompt.hash(&mut hasher);
    hasher.finish() % 10_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ScriptedGenerator, ScriptedSynthesizer};

    fn state_for(topic: &str) -> PipelineState {
        let mut state = PipelineState::with_run_id("test".to_string());
        state.selected_topic = topic.to_string();
        state.article_text = "# Post\n\nBody.".to_string();
        state
    }

    #[tokio::test]
    async fn successful_run_saves_an_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let generator = ScriptedGenerator::always("gen", "\"A robot painting, digital art\"");
        let synthesizer = ScriptedSynthesizer::always(vec![0x89, 0x50, 0x4e, 0x47]);
        let illustrator = Illustrator::new(&generator, &synthesizer, tmp.path());

        let mut state = state_for("Edge AI");
        let prompt = illustrator.illustrate(&mut state).await;

        assert_eq!(prompt, "A robot painting, digital art");
        assert!(!state.image_reference.is_empty());
        assert!(std::path::Path::new(&state.image_reference).exists());
    }

    #[tokio::test]
    async fn prompt_failure_falls_back_to_template() {
        let tmp = tempfile::tempdir().unwrap();
        let generator = ScriptedGenerator::never("gen");
        let synthesizer = ScriptedSynthesizer::never();
        let illustrator = Illustrator::new(&generator, &synthesizer, tmp.path());

        let mut state = state_for("Edge AI");
        let prompt = illustrator.illustrate(&mut state).await;

        assert!(prompt.starts_with("Highly detailed digital illustration of Edge AI"));
        assert_eq!(state.image_reference, "");
    }

    #[tokio::test]
    async fn style_suffix_is_added_when_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let generator = ScriptedGenerator::always("gen", "A humanoid robot in a server room");
        let synthesizer = ScriptedSynthesizer::never();
        let illustrator = Illustrator::new(&generator, &synthesizer, tmp.path());

        let mut state = state_for("Edge AI");
        let prompt = illustrator.illustrate(&mut state).await;

        assert!(prompt.ends_with(STYLE_SUFFIX));
    }
}
