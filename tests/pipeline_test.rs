use blogsmith::{
    ContentPipeline, ScriptedGenerator, ScriptedPrompt, ScriptedReply, ScriptedSynthesizer,
    StaticTopicSource,
};
use std::fs;
use std::sync::Arc;

const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4e, 0x47];

fn two_topics() -> Arc<StaticTopicSource> {
    Arc::new(StaticTopicSource::new(vec![
        "Topic A".to_string(),
        "Topic B".to_string(),
    ]))
}

#[tokio::test]
async fn full_run_produces_page_and_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let output_dir = tmp.path().join("output");
    let log_root = tmp.path().join("logs");

    let generator = Arc::new(ScriptedGenerator::always(
        "gen",
        "# Topic B Deep Dive\n\n1. Improve depth with more detail\n\nBody paragraph.",
    ));
    let synthesizer = Arc::new(ScriptedSynthesizer::always(PNG_MAGIC.to_vec()));

    let mut pipeline = ContentPipeline::builder()
        .topic_source(two_topics())
        .generator(generator.clone())
        .synthesizer(synthesizer)
        .prompt(Box::new(ScriptedPrompt::new(vec!["2"])))
        .output_dir(&output_dir)
        .log_root(&log_root)
        .build()
        .unwrap();

    let output_path = pipeline.run().await.unwrap();

    // Filename derives from the chosen topic.
    assert_eq!(output_path.file_name().unwrap(), "topic_b.html");

    let page = fs::read_to_string(&output_path).unwrap();
    assert!(page.contains("<title>Topic B Deep Dive</title>"));
    assert!(page.contains("images/blog_image_"));

    // The saved image artifact exists under the output directory.
    let images: Vec<_> = fs::read_dir(output_dir.join("images"))
        .unwrap()
        .collect::<std::io::Result<Vec<_>>>()
        .unwrap();
    assert_eq!(images.len(), 1);

    // Run summary reflects the four completed rounds.
    let run_dirs: Vec<_> = fs::read_dir(&log_root)
        .unwrap()
        .collect::<std::io::Result<Vec<_>>>()
        .unwrap();
    assert_eq!(run_dirs.len(), 1);
    let summary: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(run_dirs[0].path().join("run_summary.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(summary["selected_topic"], "Topic B");
    assert_eq!(summary["refinement_iterations"], 4);

    // Draft + 4 critique/rewrite pairs + image prompt.
    assert_eq!(generator.call_count(), 10);
}

#[tokio::test]
async fn degraded_run_still_renders_a_page() {
    // Every generation and synthesis call fails; the pipeline degrades
    // to placeholders at each stage instead of aborting.
    let tmp = tempfile::tempdir().unwrap();
    let output_dir = tmp.path().join("output");

    let mut pipeline = ContentPipeline::builder()
        .topic_source(two_topics())
        .generator(Arc::new(ScriptedGenerator::never("gen")))
        .synthesizer(Arc::new(ScriptedSynthesizer::never()))
        .prompt(Box::new(ScriptedPrompt::new(vec![""])))
        .output_dir(&output_dir)
        .log_root(tmp.path().join("logs"))
        .build()
        .unwrap();

    let output_path = pipeline.run().await.unwrap();

    let page = fs::read_to_string(&output_path).unwrap();
    // Blank answer selected the first candidate; the placeholder draft
    // carries its topic as the page title.
    assert!(page.contains("Topic A: An Overview"));
    assert!(page.contains("https://placehold.co/600x400?text=AI+Blog+Image"));
}

#[tokio::test]
async fn empty_candidates_fall_back_to_default_topic() {
    let tmp = tempfile::tempdir().unwrap();

    let mut pipeline = ContentPipeline::builder()
        .topic_source(Arc::new(StaticTopicSource::new(Vec::new())))
        .generator(Arc::new(ScriptedGenerator::always(
            "gen",
            "# Large Language Models\n\nBody.",
        )))
        .synthesizer(Arc::new(ScriptedSynthesizer::never()))
        // No prompt answers scripted: selection must not ask.
        .prompt(Box::new(ScriptedPrompt::new(vec![])))
        .output_dir(tmp.path().join("output"))
        .log_root(tmp.path().join("logs"))
        .max_rounds(1)
        .build()
        .unwrap();

    let output_path = pipeline.run().await.unwrap();
    assert_eq!(
        output_path.file_name().unwrap(),
        "recent_advances_in_large_language_models.html"
    );
}

#[tokio::test]
async fn rewrite_failures_never_lose_the_draft() {
    let tmp = tempfile::tempdir().unwrap();

    let draft = "# Resilient Draft\n\nOriginal body.";
    // Draft succeeds; every critique succeeds; every rewrite fails.
    let generator = Arc::new(ScriptedGenerator::new(
        "gen",
        vec![
            ScriptedReply::Text(draft.to_string()),
            ScriptedReply::Text("1. Tighten the introduction".to_string()),
            ScriptedReply::Fail("rewrite down".to_string()),
            ScriptedReply::Text("1. Add a concrete example".to_string()),
            ScriptedReply::Fail("rewrite down".to_string()),
            ScriptedReply::Text("A fine illustration prompt, digital art".to_string()),
        ],
    ));

    let mut pipeline = ContentPipeline::builder()
        .topic_source(two_topics())
        .generator(generator)
        .synthesizer(Arc::new(ScriptedSynthesizer::never()))
        .prompt(Box::new(ScriptedPrompt::new(vec!["1"])))
        .output_dir(tmp.path().join("output"))
        .log_root(tmp.path().join("logs"))
        .max_rounds(2)
        .build()
        .unwrap();

    let output_path = pipeline.run().await.unwrap();
    let page = fs::read_to_string(&output_path).unwrap();
    assert!(page.contains("<title>Resilient Draft</title>"));
    assert!(page.contains("Original body."));
}
