use crate::feedback::{default_feedback, normalize_critique, HISTORY_PREVIEW_LEN};
use crate::llm::TextGenerator;
use crate::runlog::RunLog;
use crate::types::{PipelineState, DEFAULT_MAX_ROUNDS};
use crate::utils::text;
use tracing::{debug, info, warn};

const CRITIQUE_SYSTEM_PROMPT: &str = "\
You are an expert editor specializing in AI and technology content.

Analyze the following blog post and provide constructive criticism.

Focus on these aspects:
1. Clarity and coherence
2. Technical accuracy and depth
3. Engagement and reader interest
4. Structure and flow
5. Language and style

For each aspect, provide specific feedback with examples from the text.
Highlight both strengths and areas for improvement.

Return a list of 3-5 specific improvement points, ordered by priority.
Each point should clearly identify an issue and suggest how to address it.
Be specific and actionable in your feedback.

IMPORTANT: Format your response as a clean numbered list, with one improvement point per line, like this:
1. First improvement point
2. Second improvement point
3. Third improvement point";

const REWRITE_SYSTEM_PROMPT: &str = "\
You are an expert AI content writer. Your task is to improve a blog post based on editorial feedback.

Please rewrite the blog post, addressing all the feedback points while maintaining the original structure and key information.
Make the improvements seamlessly integrated into the text.

Return the complete improved version of the blog post in Markdown format.";

/// History summaries embed at most this many items per prior batch.
const HISTORY_ITEMS_PER_BATCH: usize = 3;

/// Phase of the critique/rewrite loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinePhase {
    /// Initial draft produced, no round started yet
    Drafted,
    /// A feedback batch has been produced for the current round
    Critiquing,
    /// The current round's rewrite has been applied (or skipped)
    Rewriting,
    /// Round budget exhausted; article is final
    Completed,
}

/// Bounded critique/rewrite loop over the article in [`PipelineState`].
///
/// The round counter is the only termination signal: a critique failure
/// substitutes the default feedback set so the round still counts, and
/// a rewrite failure keeps the previous article text untouched. Neither
/// failure aborts the loop.
pub struct RefinementLoop<'a> {
    generator: &'a dyn TextGenerator,
    runlog: Option<&'a RunLog>,
    max_rounds: u32,
    phase: RefinePhase,
    pending_batch: Option<Vec<String>>,
}

impl<'a> RefinementLoop<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self {
            generator,
            runlog: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
            phase: RefinePhase::Drafted,
            pending_batch: None,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_runlog(mut self, runlog: &'a RunLog) -> Self {
        self.runlog = Some(runlog);
        self
    }

    pub fn phase(&self) -> RefinePhase {
        self.phase
    }

    /// Advance the loop by one transition.
    ///
    /// Infallible by design: every generation failure has a local
    /// fallback, so the only way out is reaching the round budget.
    pub async fn step(&mut self, state: &mut PipelineState) -> RefinePhase {
        match self.phase {
            RefinePhase::Drafted => {
                info!("Starting refinement round 1/{}", self.max_rounds);
                self.pending_batch = Some(self.critique(state).await);
                self.phase = RefinePhase::Critiquing;
            }
            RefinePhase::Critiquing => {
                let batch = self.pending_batch.take().unwrap_or_else(default_feedback);
                self.rewrite(state, &batch).await;
                state.feedback_history.push(batch);
                state.refinement_count += 1;
                if let Some(runlog) = self.runlog {
                    runlog.log_refinement(state);
                }
                self.phase = RefinePhase::Rewriting;
            }
            RefinePhase::Rewriting => {
                if state.refinement_count < self.max_rounds {
                    info!(
                        "Starting refinement round {}/{}",
                        state.refinement_count + 1,
                        self.max_rounds
                    );
                    self.pending_batch = Some(self.critique(state).await);
                    self.phase = RefinePhase::Critiquing;
                } else {
                    self.phase = RefinePhase::Completed;
                }
            }
            RefinePhase::Completed => {}
        }
        self.phase
    }

    /// Drive the loop to completion
    pub async fn run(&mut self, state: &mut PipelineState) {
        while self.phase != RefinePhase::Completed {
            self.step(state).await;
        }
        info!(
            "Refinement completed after {} rounds",
            state.refinement_count
        );
    }

    /// Critique the current article, falling back to the default
    /// feedback set on any failure or content-free reply.
    async fn critique(&self, state: &PipelineState) -> Vec<String> {
        let user_prompt = format!(
            "Review this blog post about \"{}\":\n\n```\n{}\n```\n\n\
             Provide 3-5 specific improvement points, ordered by priority.",
            state.selected_topic, state.article_text
        );

        let feedback = match self
            .generator
            .generate(CRITIQUE_SYSTEM_PROMPT, &user_prompt, 2000, 0.2)
            .await
        {
            Ok(critique) => normalize_critique(&critique),
            Err(e) => {
                warn!("Critique generation failed, using default feedback: {}", e);
                Vec::new()
            }
        };

        let feedback = if feedback.is_empty() {
            default_feedback()
        } else {
            feedback
        };

        for (i, point) in feedback.iter().enumerate() {
            debug!("Feedback {}: {}", i + 1, text::preview(point, 100));
        }

        feedback
    }

    /// Rewrite the article against the current batch. A failed rewrite
    /// is a no-op: the previous text stays in place.
    async fn rewrite(&self, state: &mut PipelineState, batch: &[String]) {
        let formatted_feedback = batch
            .iter()
            .map(|point| format!("- {point}"))
            .collect::<Vec<_>>()
            .join("\n");

        let user_prompt = format!(
            "Original blog post about \"{}\":\n```\n{}\n```\n\n\
             Editorial feedback:\n{}\n\n{}\n\
             Please improve the blog post based on this feedback. Provide the complete revised version.",
            state.selected_topic,
            state.article_text,
            formatted_feedback,
            format_history(&state.feedback_history)
        );

        match self
            .generator
            .generate(REWRITE_SYSTEM_PROMPT, &user_prompt, 4000, 0.4)
            .await
        {
            Ok(rewritten) => state.article_text = rewritten,
            Err(e) => {
                warn!("Rewrite failed, keeping previous article text: {}", e);
            }
        }
    }
}

/// Bounded summary of prior feedback batches for the rewrite prompt:
/// the first few items of each batch, each previewed to a fixed length.
fn format_history(history: &[Vec<String>]) -> String {
    if history.is_empty() {
        return String::new();
    }

    let mut formatted = String::from("Previous rounds of feedback:\n");
    for (round, batch) in history.iter().enumerate() {
        formatted.push_str(&format!("Round {}:\n", round + 1));
        for item in batch.iter().take(HISTORY_ITEMS_PER_BATCH) {
            formatted.push_str(&format!("- {}\n", text::preview(item, HISTORY_PREVIEW_LEN)));
        }
    }
    formatted
}
