use crate::discovery::TopicSource;
use crate::illustration::Illustrator;
use crate::llm::{ImageSynthesizer, TextGenerator};
use crate::refinement::RefinementLoop;
use crate::render::render_page;
use crate::runlog::RunLog;
use crate::selection::{select_topic, ConsolePrompt, SelectionPrompt};
use crate::types::{PipelineError, PipelineState, Result, DEFAULT_MAX_ROUNDS};
use crate::utils::sanitize_filename;
use crate::drafting;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Linear content-production pipeline: discovery, selection, drafting,
/// bounded refinement, illustration, rendering.
///
/// Execution is strictly sequential; the shared [`PipelineState`] is
/// threaded through every stage and each stage touches only its own
/// fields.
pub struct ContentPipeline {
    topic_source: Arc<dyn TopicSource>,
    generator: Arc<dyn TextGenerator>,
    synthesizer: Arc<dyn ImageSynthesizer>,
    prompt: Box<dyn SelectionPrompt>,
    output_dir: PathBuf,
    log_root: PathBuf,
    max_rounds: u32,
}

impl ContentPipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Run one topic end-to-end and return the path of the written page.
    ///
    /// Stage-level generation failures degrade to fallbacks inside the
    /// stages; only unexpected errors (final artifact IO, prompt IO)
    /// propagate, after an error record is written.
    pub async fn run(&mut self) -> Result<PathBuf> {
        let mut state = PipelineState::new();
        let runlog = RunLog::with_root(&self.log_root, &state.run_id);
        info!("Starting content pipeline run {}", state.run_id);

        match self.execute(&mut state, &runlog).await {
            Ok(output_path) => {
                runlog.write_run_summary(&state, &output_path);
                info!("Pipeline run {} completed: {}", state.run_id, output_path.display());
                Ok(output_path)
            }
            Err(e) => {
                runlog.write_error(&e.to_string());
                Err(e)
            }
        }
    }

    async fn execute(&mut self, state: &mut PipelineState, runlog: &RunLog) -> Result<PathBuf> {
        state.candidate_topics = self.topic_source.fetch_candidates().await;
        runlog.log_discovery(state);

        select_topic(state, self.prompt.as_mut())?;
        runlog.log_selection(state);

        drafting::draft_article(state, self.generator.as_ref()).await;
        runlog.log_drafting(state);

        RefinementLoop::new(self.generator.as_ref())
            .with_max_rounds(self.max_rounds)
            .with_runlog(runlog)
            .run(state)
            .await;

        let illustrator = Illustrator::new(
            self.generator.as_ref(),
            self.synthesizer.as_ref(),
            &self.output_dir,
        );
        let image_prompt = illustrator.illustrate(state).await;
        runlog.log_illustration(state, &image_prompt);

        fs::create_dir_all(&self.output_dir)?;
        let title = render_page(state, &self.output_dir);

        let output_path = self.output_dir.join(format!("{}.html", output_stem(state)));
        fs::write(&output_path, &state.page_artifact)?;
        runlog.log_render(state, &title, Some(&output_path));

        Ok(output_path)
    }
}

fn output_stem(state: &PipelineState) -> String {
    let stem = sanitize_filename(&state.selected_topic);
    if stem.is_empty() {
        format!("article_{}", state.run_id)
    } else {
        stem
    }
}

/// Builder wiring generators, prompt, and directories into a pipeline
pub struct PipelineBuilder {
    topic_source: Option<Arc<dyn TopicSource>>,
    generator: Option<Arc<dyn TextGenerator>>,
    synthesizer: Option<Arc<dyn ImageSynthesizer>>,
    prompt: Option<Box<dyn SelectionPrompt>>,
    output_dir: PathBuf,
    log_root: PathBuf,
    max_rounds: u32,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            topic_source: None,
            generator: None,
            synthesizer: None,
            prompt: None,
            output_dir: PathBuf::from("output"),
            log_root: PathBuf::from("logs"),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn topic_source(mut self, source: Arc<dyn TopicSource>) -> Self {
        self.topic_source = Some(source);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn synthesizer(mut self, synthesizer: Arc<dyn ImageSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn prompt(mut self, prompt: Box<dyn SelectionPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn log_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_root = dir.into();
        self
    }

    pub fn max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn build(self) -> Result<ContentPipeline> {
        let generator = self
            .generator
            .ok_or_else(|| PipelineError::General("pipeline needs a text generator".to_string()))?;
        let synthesizer = self.synthesizer.ok_or_else(|| {
            PipelineError::General("pipeline needs an image synthesizer".to_string())
        })?;
        let topic_source = match self.topic_source {
            Some(source) => source,
            None => Arc::new(crate::discovery::WebTopicDiscovery::new(generator.clone())?),
        };

        Ok(ContentPipeline {
            topic_source,
            generator,
            synthesizer,
            prompt: self
                .prompt
                .unwrap_or_else(|| Box::new(ConsolePrompt) as Box<dyn SelectionPrompt>),
            output_dir: self.output_dir,
            log_root: self.log_root,
            max_rounds: self.max_rounds,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
