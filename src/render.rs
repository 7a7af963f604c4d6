use crate::types::PipelineState;
use chrono::Utc;
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use std::path::Path;
use tracing::info;

/// Stand-in image used when no artifact was produced.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/600x400?text=AI+Blog+Image";

static ATX_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#\s+(.+)$").expect("title regex"));

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>%TITLE%</title>
    <style>
        :root {
            --primary-color: #3498db;
            --secondary-color: #2c3e50;
            --text-color: #333;
            --background-color: #f5f5f5;
            --content-background: #ffffff;
        }

        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            line-height: 1.6;
            color: var(--text-color);
            background-color: var(--background-color);
            margin: 0;
            padding: 0;
        }

        .container {
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            background-color: var(--content-background);
            box-shadow: 0 0 10px rgba(0, 0, 0, 0.1);
        }

        header {
            text-align: center;
            margin-bottom: 30px;
            padding: 20px 0;
            border-bottom: 1px solid #eee;
        }

        h1 {
            color: var(--secondary-color);
            margin-bottom: 10px;
            font-size: 2.2em;
        }

        .date {
            color: #666;
            font-style: italic;
            margin-bottom: 20px;
        }

        .featured-image {
            width: 100%;
            height: auto;
            max-height: 400px;
            object-fit: cover;
            margin-bottom: 30px;
            border-radius: 5px;
        }

        h2 {
            color: var(--primary-color);
            margin-top: 30px;
            border-bottom: 1px solid #eee;
            padding-bottom: 10px;
            font-size: 1.8em;
        }

        h3 {
            color: var(--secondary-color);
            margin-top: 25px;
            font-size: 1.4em;
        }

        p {
            margin-bottom: 20px;
        }

        blockquote {
            border-left: 4px solid var(--primary-color);
            padding-left: 15px;
            margin-left: 0;
            color: #555;
        }

        code {
            background-color: #f0f0f0;
            padding: 2px 5px;
            border-radius: 3px;
            font-family: 'Courier New', Courier, monospace;
        }

        pre {
            background-color: #f0f0f0;
            padding: 15px;
            border-radius: 5px;
            overflow-x: auto;
        }

        footer {
            text-align: center;
            margin-top: 50px;
            padding-top: 20px;
            border-top: 1px solid #eee;
            color: #777;
        }
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>%TITLE%</h1>
            <div class="date">Published on %DATE%</div>
        </header>

        <img src="%IMAGE%" alt="Featured Image for %TITLE%" class="featured-image">

        <article>
            %BODY%
        </article>

        <footer>
            <p>Generated by blogsmith</p>
        </footer>
    </div>
</body>
</html>
"#;

/// Render the article and image reference into the final page artifact.
/// Returns the extracted (or fallback) title for logging.
pub fn render_page(state: &mut PipelineState, output_dir: &Path) -> String {
    info!("Creating HTML page");

    let title = extract_title(&state.article_text)
        .unwrap_or_else(|| state.selected_topic.clone());
    let body = markdown_to_html(&state.article_text);
    let image = resolve_image_ref(&state.image_reference, output_dir);
    let date = Utc::now().format("%B %d, %Y").to_string();

    state.page_artifact = PAGE_TEMPLATE
        .replace("%TITLE%", &title)
        .replace("%DATE%", &date)
        .replace("%IMAGE%", &image)
        .replace("%BODY%", &body);

    title
}

/// First ATX heading of the article, if any
pub fn extract_title(content: &str) -> Option<String> {
    ATX_TITLE
        .captures(content)
        .map(|caps| caps[1].trim().to_string())
}

pub fn markdown_to_html(content: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_HEADING_ATTRIBUTES;
    let parser = Parser::new_ext(content, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Resolve the image reference to something the page can load: a path
/// relative to the output directory when the artifact exists, the
/// placeholder URL otherwise.
pub fn resolve_image_ref(image_reference: &str, output_dir: &Path) -> String {
    if image_reference.is_empty() {
        return PLACEHOLDER_IMAGE_URL.to_string();
    }

    let path = Path::new(image_reference);
    if !path.exists() {
        return PLACEHOLDER_IMAGE_URL.to_string();
    }

    match path.strip_prefix(output_dir) {
        Ok(relative) => relative.to_string_lossy().into_owned(),
        Err(_) => image_reference.to_string(),
    }
}
