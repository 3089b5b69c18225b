//! AI Response Dispatcher
//!
//! The backend returns `ai_response` as a string that is usually, but not always,
//! a JSON document. [`AiResponse::from_message_text`] decides which presentation
//! applies. It checks fields in a fixed priority order and never fails: anything
//! it cannot interpret is shown as raw text.

use serde_json::{Map, Value};

/// Shown when the backend answered with nothing at all
pub const EMPTY_RESPONSE_PLACEHOLDER: &str = "Received an empty response.";

/// Presentation chosen for one AI message
#[derive(Debug, Clone, PartialEq)]
pub enum AiResponse {
    /// `visualization_spec` present: caption plus chart
    Chart(ChartResponse),
    /// `image_description` present: analysis, answer and tappable tags
    Vision(VisionResponse),
    /// `primary_response` present: text with optional image and links
    RichText(RichTextResponse),
    /// Anything else, displayed verbatim
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartResponse {
    pub caption: Option<String>,
    /// Declarative chart description handed to the chart view untouched
    pub spec: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisionResponse {
    pub description: String,
    pub answer: Option<String>,
    /// One tag per `identified_objects` entry, order preserved
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RichTextResponse {
    pub text: String,
    pub image_url: Option<String>,
    pub reference_links: Vec<String>,
}

impl AiResponse {
    /// Interpret the text of an AI message.
    ///
    /// Only text that starts with `{` after trimming is parsed. Parse failures
    /// are logged and fall through to [`AiResponse::Raw`].
    pub fn from_message_text(text: Option<&str>) -> Self {
        let Some(text) = text else {
            return Self::raw("");
        };

        if !text.trim_start().starts_with('{') {
            return Self::raw(text);
        }

        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(fields)) => {
                Self::from_fields(&fields).unwrap_or_else(|| Self::raw(text))
            }
            Ok(_) => Self::raw(text),
            Err(e) => {
                tracing::warn!(error = %e, "AI response is not valid JSON, rendering raw text");
                Self::raw(text)
            }
        }
    }

    /// Match a parsed object against the known shapes, highest priority first
    fn from_fields(fields: &Map<String, Value>) -> Option<Self> {
        if let Some(spec) = present(fields, "visualization_spec") {
            return Some(AiResponse::Chart(ChartResponse {
                caption: text_field(fields, "primary_response"),
                spec: spec.clone(),
            }));
        }

        if let Some(description) = present(fields, "image_description") {
            let tags = match fields.get("identified_objects") {
                Some(Value::Array(items)) => items.iter().map(display_value).collect(),
                _ => Vec::new(),
            };
            return Some(AiResponse::Vision(VisionResponse {
                description: display_value(description),
                answer: text_field(fields, "user_query_answer"),
                tags,
            }));
        }

        if let Some(primary) = present(fields, "primary_response") {
            let reference_links = match present(fields, "reference_links") {
                Some(Value::Array(links)) => links.iter().map(display_value).collect(),
                _ => Vec::new(),
            };
            return Some(AiResponse::RichText(RichTextResponse {
                text: display_value(primary),
                image_url: text_field(fields, "image_url"),
                reference_links,
            }));
        }

        None
    }

    fn raw(text: &str) -> Self {
        if text.is_empty() {
            AiResponse::Raw(EMPTY_RESPONSE_PLACEHOLDER.to_string())
        } else {
            AiResponse::Raw(text.to_string())
        }
    }

    /// Whether thumbs-up/down controls belong under this response
    pub fn shows_feedback(&self) -> bool {
        !matches!(self, AiResponse::Raw(_))
    }

    /// Short name of the layout, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            AiResponse::Chart(_) => "chart",
            AiResponse::Vision(_) => "vision",
            AiResponse::RichText(_) => "rich_text",
            AiResponse::Raw(_) => "raw",
        }
    }
}

/// A field counts as present when it exists and is truthy: `null`, `false`,
/// `""` and `0` are absent, while objects and arrays always count.
fn present<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|value| is_truthy(value))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    present(fields, key).map(display_value)
}

/// Strings as-is, everything else in its JSON form
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> AiResponse {
        AiResponse::from_message_text(Some(text))
    }

    #[test]
    fn test_chart_wins_over_other_fields() {
        let text = json!({
            "primary_response": "Revenue is up.",
            "visualization_spec": {"mark": "bar"},
            "image_description": "ignored",
        })
        .to_string();

        match parse(&text) {
            AiResponse::Chart(chart) => {
                assert_eq!(chart.caption.as_deref(), Some("Revenue is up."));
                assert_eq!(chart.spec, json!({"mark": "bar"}));
            }
            other => panic!("expected chart, got {:?}", other),
        }
    }

    #[test]
    fn test_vision_tags_preserve_order() {
        let text = json!({
            "image_description": "A desk with a laptop",
            "user_query_answer": "It is a workspace",
            "identified_objects": ["laptop", "mug", "lamp"],
        })
        .to_string();

        match parse(&text) {
            AiResponse::Vision(vision) => {
                assert_eq!(vision.description, "A desk with a laptop");
                assert_eq!(vision.answer.as_deref(), Some("It is a workspace"));
                assert_eq!(vision.tags, vec!["laptop", "mug", "lamp"]);
            }
            other => panic!("expected vision, got {:?}", other),
        }
    }

    #[test]
    fn test_vision_without_objects_has_no_tags() {
        let text = r#"{"image_description": "Empty room", "identified_objects": null}"#;
        match parse(text) {
            AiResponse::Vision(vision) => assert!(vision.tags.is_empty()),
            other => panic!("expected vision, got {:?}", other),
        }
    }

    #[test]
    fn test_vision_non_string_tags_use_json_form() {
        let text = r#"{"image_description": "Dice", "identified_objects": ["die", 6, {"k": 1}]}"#;
        match parse(text) {
            AiResponse::Vision(vision) => {
                assert_eq!(vision.tags, vec!["die", "6", r#"{"k":1}"#]);
            }
            other => panic!("expected vision, got {:?}", other),
        }
    }

    #[test]
    fn test_rich_text_with_image_and_links() {
        let text = json!({
            "primary_response": "Here is a summary.",
            "image_url": "https://example.com/a.png",
            "reference_links": ["https://example.com/1", "https://example.com/2"],
            "visualization_spec": null,
        })
        .to_string();

        assert_eq!(
            parse(&text),
            AiResponse::RichText(RichTextResponse {
                text: "Here is a summary.".to_string(),
                image_url: Some("https://example.com/a.png".to_string()),
                reference_links: vec![
                    "https://example.com/1".to_string(),
                    "https://example.com/2".to_string(),
                ],
            })
        );
    }

    #[test]
    fn test_rich_text_minimal() {
        match parse(r#"{"primary_response": "Hi"}"#) {
            AiResponse::RichText(rich) => {
                assert_eq!(rich.text, "Hi");
                assert_eq!(rich.image_url, None);
                assert!(rich.reference_links.is_empty());
            }
            other => panic!("expected rich text, got {:?}", other),
        }
    }

    #[test]
    fn test_null_fields_are_absent() {
        // How the backend serialises a plain text answer
        let text = r#"{
          "primary_response": "Hello!",
          "image_url": null,
          "reference_links": null,
          "visualization_spec": null
        }"#;
        assert_eq!(parse(text).kind(), "rich_text");
    }

    #[test]
    fn test_plain_string_is_raw() {
        assert_eq!(parse("plain string"), AiResponse::Raw("plain string".to_string()));
    }

    #[test]
    fn test_invalid_json_falls_back_to_raw() {
        let text = "{not really json";
        assert_eq!(parse(text), AiResponse::Raw(text.to_string()));
    }

    #[test]
    fn test_unknown_shape_falls_back_to_raw() {
        let text = r#"{"status": "ok"}"#;
        assert_eq!(parse(text), AiResponse::Raw(text.to_string()));

        let text = r#"{"primary_response": ""}"#;
        assert_eq!(parse(text), AiResponse::Raw(text.to_string()));
    }

    #[test]
    fn test_empty_or_missing_text_uses_placeholder() {
        let placeholder = AiResponse::Raw(EMPTY_RESPONSE_PLACEHOLDER.to_string());
        assert_eq!(AiResponse::from_message_text(None), placeholder);
        assert_eq!(parse(""), placeholder);
    }

    #[test]
    fn test_leading_whitespace_still_parsed() {
        assert_eq!(parse("  \n {\"primary_response\": \"x\"}").kind(), "rich_text");
    }

    #[test]
    fn test_feedback_only_for_structured_layouts() {
        assert!(parse(r#"{"primary_response": "x"}"#).shows_feedback());
        assert!(!parse("plain").shows_feedback());
    }
}
