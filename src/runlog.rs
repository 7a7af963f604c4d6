use crate::types::PipelineState;
use crate::utils::text;
use chrono::Utc;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Per-run, per-component flat-file log.
///
/// Logging is a side channel: every write is best-effort and a failed
/// write never fails the pipeline.
pub struct RunLog {
    root: PathBuf,
    run_id: String,
}

impl RunLog {
    pub fn new(run_id: &str) -> Self {
        Self::with_root("logs", run_id)
    }

    pub fn with_root(root: impl Into<PathBuf>, run_id: &str) -> Self {
        let log = Self {
            root: root.into(),
            run_id: run_id.to_string(),
        };
        ensure_dir(&log.run_dir());
        log
    }

    pub fn run_dir(&self) -> PathBuf {
        self.root.join(&self.run_id)
    }

    fn component_dir(&self, component: &str) -> PathBuf {
        let dir = self.run_dir().join(component);
        ensure_dir(&dir);
        dir
    }

    fn timestamp_header() -> String {
        format!("===== {} =====\n", Utc::now().format("%Y-%m-%d %H:%M:%S"))
    }

    pub fn log_discovery(&self, state: &PipelineState) {
        let dir = self.component_dir("topic_discovery");
        let mut out = Self::timestamp_header();
        out.push_str("Discovered trending topics:\n");
        for (i, topic) in state.candidate_topics.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, topic));
        }
        out.push_str(&summary_block(&json!({
            "candidate_topics": state.candidate_topics,
            "run_id": state.run_id,
        })));
        write_file(&dir.join("output.txt"), &out);
    }

    pub fn log_selection(&self, state: &PipelineState) {
        let dir = self.component_dir("topic_selection");
        let mut out = Self::timestamp_header();
        out.push_str("Input topics:\n");
        for (i, topic) in state.candidate_topics.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, topic));
        }
        out.push_str(&format!("\nSelected topic: {}\n\n", state.selected_topic));
        out.push_str(&summary_block(&json!({
            "candidate_topics": state.candidate_topics,
            "selected_topic": state.selected_topic,
            "run_id": state.run_id,
        })));
        write_file(&dir.join("output.txt"), &out);
    }

    pub fn log_drafting(&self, state: &PipelineState) {
        let dir = self.component_dir("drafting");
        let mut out = Self::timestamp_header();
        out.push_str(&format!(
            "Generated content for topic: {}\n\n",
            state.selected_topic
        ));
        out.push_str("Content preview:\n---\n");
        out.push_str(&text::preview(&state.article_text, 1000));
        out.push_str("\n---\n\n");
        out.push_str(&summary_block(&json!({
            "selected_topic": state.selected_topic,
            "content_length": state.article_text.len(),
            "run_id": state.run_id,
        })));
        write_file(&dir.join("output.txt"), &out);
        write_file(&dir.join("initial_content.md"), &state.article_text);
    }

    /// Log one completed refinement round. Expects `feedback_history`
    /// to already contain the round's batch.
    pub fn log_refinement(&self, state: &PipelineState) {
        let Some(batch) = state.feedback_history.last() else {
            return;
        };
        let iteration = state.refinement_count.saturating_sub(1);
        let dir = self
            .component_dir("refinement")
            .join(format!("iteration_{iteration}"));
        ensure_dir(&dir);

        let mut out = Self::timestamp_header();
        out.push_str(&format!("Refinement iteration: {iteration}\n\n"));
        out.push_str("Feedback received:\n");
        for (i, point) in batch.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, point));
        }
        out.push_str("\nRefined content preview:\n---\n");
        out.push_str(&text::preview(&state.article_text, 1000));
        out.push_str("\n---\n\n");
        out.push_str(&summary_block(&json!({
            "refinement_count": state.refinement_count,
            "feedback_points": batch.len(),
            "content_length": state.article_text.len(),
            "run_id": state.run_id,
        })));
        write_file(&dir.join("output.txt"), &out);
        write_file(&dir.join("refined_content.md"), &state.article_text);
        match serde_json::to_string_pretty(batch) {
            Ok(feedback_json) => write_file(&dir.join("feedback.json"), &feedback_json),
            Err(e) => warn!("Could not serialize feedback batch: {}", e),
        }
    }

    pub fn log_illustration(&self, state: &PipelineState, image_prompt: &str) {
        let dir = self.component_dir("illustration");
        let mut out = Self::timestamp_header();
        out.push_str(&format!("Topic: {}\n\n", state.selected_topic));
        out.push_str("Image generation prompt:\n");
        out.push_str(&format!("\"{image_prompt}\"\n\n"));
        out.push_str(&format!(
            "Generated image saved to: {}\n\n",
            state.image_reference
        ));
        out.push_str(&summary_block(&json!({
            "selected_topic": state.selected_topic,
            "image_path": state.image_reference,
            "prompt_length": image_prompt.len(),
            "run_id": state.run_id,
        })));
        write_file(&dir.join("output.txt"), &out);
        write_file(&dir.join("image_prompt.txt"), image_prompt);
    }

    pub fn log_render(&self, state: &PipelineState, title: &str, output_path: Option<&Path>) {
        let dir = self.component_dir("render");
        let mut out = Self::timestamp_header();
        out.push_str(&format!("Generated HTML for: {title}\n\n"));
        out.push_str(&format!("Image path: {}\n", state.image_reference));
        if let Some(path) = output_path {
            out.push_str(&format!("Output path: {}\n", path.display()));
        }
        out.push_str("\nHTML preview:\n---\n");
        out.push_str(&text::preview(&state.page_artifact, 500));
        out.push_str("\n---\n\n");
        out.push_str(&summary_block(&json!({
            "title": title,
            "html_length": state.page_artifact.len(),
            "image_path": state.image_reference,
            "run_id": state.run_id,
        })));
        write_file(&dir.join("output.txt"), &out);
        write_file(&dir.join("output.html"), &state.page_artifact);
    }

    pub fn write_run_summary(&self, state: &PipelineState, output_path: &Path) {
        let summary = json!({
            "run_id": state.run_id,
            "timestamp": Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            "selected_topic": state.selected_topic,
            "refinement_iterations": state.refinement_count,
            "final_output_path": output_path.display().to_string(),
            "image_path": state.image_reference,
            "content_length": state.article_text.len(),
            "html_length": state.page_artifact.len(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(body) => write_file(&self.run_dir().join("run_summary.json"), &body),
            Err(e) => warn!("Could not serialize run summary: {}", e),
        }
    }

    pub fn write_error(&self, message: &str) {
        let body = format!("{}Error during pipeline run: {message}\n", Self::timestamp_header());
        write_file(&self.run_dir().join("error.txt"), &body);
    }
}

fn summary_block(summary: &serde_json::Value) -> String {
    let body = serde_json::to_string_pretty(summary).unwrap_or_else(|_| "{}".to_string());
    format!("State summary:\n{body}\n\n")
}

fn ensure_dir(dir: &Path) {
    if let Err(e) = fs::create_dir_all(dir) {
        warn!("Could not create log directory {}: {}", dir.display(), e);
    }
}

fn write_file(path: &Path, content: &str) {
    if let Err(e) = fs::write(path, content) {
        warn!("Could not write log file {}: {}", path.display(), e);
    }
}
