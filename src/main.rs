use blogsmith::{ChatGenerator, ContentPipeline, GeneratorConfig, SdxlSynthesizer};
use clap::Parser;
use std::env;
use std::sync::Arc;
use tracing::{error, info};

const DEFAULT_IMAGE_URL: &str = "https://sdxl.lepton.run";

/// AI content creation pipeline: topic discovery to rendered HTML page
#[derive(Parser, Debug)]
#[command(name = "blogsmith", about = "AI Content Creation Pipeline")]
struct Args {
    /// Output directory for HTML files
    #[arg(long, default_value = "output")]
    output: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; missing files are fine.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    info!("Starting blogsmith content pipeline");

    let api_key = env::var("BLOGSMITH_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        info!("BLOGSMITH_API_KEY not set; generation calls will fall back to placeholders");
    }

    let mut config = GeneratorConfig {
        api_key: api_key.clone(),
        ..GeneratorConfig::default()
    };
    if let Ok(base_url) = env::var("BLOGSMITH_BASE_URL") {
        config.base_url = base_url;
    }
    if let Ok(model) = env::var("BLOGSMITH_MODEL") {
        config.model = model;
    }
    let image_url =
        env::var("BLOGSMITH_IMAGE_URL").unwrap_or_else(|_| DEFAULT_IMAGE_URL.to_string());

    let generator = Arc::new(ChatGenerator::new(config)?);
    let synthesizer = Arc::new(SdxlSynthesizer::new(image_url, api_key)?);

    let mut pipeline = ContentPipeline::builder()
        .generator(generator)
        .synthesizer(synthesizer)
        .output_dir(&args.output)
        .build()?;

    match pipeline.run().await {
        Ok(output_path) => {
            info!("HTML content created and saved to {}", output_path.display());
            Ok(())
        }
        Err(e) => {
            error!("Error during pipeline run: {}", e);
            Err(e.into())
        }
    }
}
