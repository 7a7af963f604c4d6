use once_cell::sync::Lazy;
use regex::Regex;

/// At most this many points survive normalization.
pub const MAX_FEEDBACK_POINTS: usize = 5;

/// Lines shorter than this are noise, not feedback.
const MIN_POINT_LEN: usize = 10;

/// "Label: explanation" lines must be at least this long to count.
const LABELED_LINE_MIN_LEN: usize = 20;

/// Preview length for prior-round items embedded in rewrite prompts.
pub const HISTORY_PREVIEW_LEN: usize = 100;

static ORDINAL_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[.)]").expect("ordinal marker regex"));

/// Extract discrete feedback points from a raw critique.
///
/// Numbered lines become points with the marker stripped; unnumbered
/// "Label: explanation" lines are kept whole. When nothing looks
/// structured, every sufficiently long line is treated as a point.
/// Returns an empty vec for content-free input; callers substitute
/// [`default_feedback`] in that case.
pub fn normalize_critique(raw: &str) -> Vec<String> {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut points = Vec::new();

    for line in &lines {
        if line.starts_with('#') || line.len() < MIN_POINT_LEN {
            continue;
        }

        if ORDINAL_MARKER.is_match(line) {
            // Text is everything past the first period or parenthesis;
            // a marker with no tail keeps the line verbatim.
            match line.split_once(['.', ')']) {
                Some((_, tail)) if !tail.trim().is_empty() => {
                    points.push(tail.trim().to_string());
                }
                _ => points.push(line.to_string()),
            }
        } else if line.contains(':') && line.len() > LABELED_LINE_MIN_LEN {
            points.push(line.to_string());
        }
    }

    // No structured points at all: fall back to every long-enough line.
    if points.is_empty() && !lines.is_empty() {
        points = lines
            .iter()
            .filter(|line| line.len() > MIN_POINT_LEN)
            .map(|line| line.to_string())
            .collect();
    }

    points.truncate(MAX_FEEDBACK_POINTS);
    points
}

/// Fixed feedback set used when a critique fails or normalizes to nothing.
pub fn default_feedback() -> Vec<String> {
    vec![
        "Improve the technical depth of the content.".to_string(),
        "Add more specific examples to illustrate key points.".to_string(),
        "Enhance the conclusion with more forward-looking insights.".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_list_is_split_on_markers() {
        let points = normalize_critique("1. Improve depth\n2. Add examples\n");
        assert_eq!(points, vec!["Improve depth", "Add examples"]);
    }

    #[test]
    fn parenthesis_markers_are_accepted() {
        let points = normalize_critique("1) Tighten the introduction paragraph\n");
        assert_eq!(points, vec!["Tighten the introduction paragraph"]);
    }

    #[test]
    fn headings_and_short_lines_are_dropped() {
        let raw = "# Editorial feedback\nok\n1. Expand the background section\n";
        let points = normalize_critique(raw);
        assert_eq!(points, vec!["Expand the background section"]);
    }

    #[test]
    fn labeled_lines_count_as_points() {
        let raw = "Clarity: the middle section wanders off topic\n";
        let points = normalize_critique(raw);
        assert_eq!(
            points,
            vec!["Clarity: the middle section wanders off topic"]
        );
    }

    #[test]
    fn unstructured_prose_falls_back_to_long_lines() {
        let raw = "The article needs a stronger opening hook\nMaybe restructure\n";
        let points = normalize_critique(raw);
        assert_eq!(
            points,
            vec![
                "The article needs a stronger opening hook",
                "Maybe restructure"
            ]
        );
    }

    #[test]
    fn short_noninformative_input_yields_nothing() {
        assert!(normalize_critique("ok").is_empty());
        assert!(normalize_critique("").is_empty());
    }

    #[test]
    fn plain_one_point_per_line_input_is_idempotent() {
        let points = vec![
            "Strengthen the opening paragraph with a hook".to_string(),
            "Cite at least one concrete benchmark result".to_string(),
        ];
        let raw = points.join("\n");
        assert_eq!(normalize_critique(&raw), points);
        // And normalizing the output again changes nothing.
        assert_eq!(normalize_critique(&normalize_critique(&raw).join("\n")), points);
    }

    #[test]
    fn result_is_capped_at_five_points() {
        let raw = (1..=8)
            .map(|i| format!("{i}. Feedback point number {i} with enough length"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(normalize_critique(&raw).len(), MAX_FEEDBACK_POINTS);
    }

    #[test]
    fn default_feedback_is_three_fixed_points() {
        let defaults = default_feedback();
        assert_eq!(defaults.len(), 3);
        assert_eq!(defaults, default_feedback());
    }
}
