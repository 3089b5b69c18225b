//! Plain-text rendering of transcript messages

use crate::chart::{self, TextChart};
use crate::chat::{Message, Sender};
use crate::response::AiResponse;

/// Columns given to chart bars
const CHART_WIDTH: usize = 40;

pub fn render_message(message: &Message) -> String {
    match message.response() {
        None => format!("you> {}\n", message.text.as_deref().unwrap_or_default()),
        Some(response) => {
            tracing::debug!(kind = response.kind(), id = ?message.interaction_id, "Rendering answer");
            let mut out = String::from("maya> ");
            out.push_str(&render_response(&response));
            if response.shows_feedback() {
                if let Some(id) = &message.interaction_id {
                    out.push_str(&format!("  [#{}] /good or /bad to rate\n", id));
                }
            }
            out
        }
    }
}

/// Body of an AI message, always newline-terminated
pub fn render_response(response: &AiResponse) -> String {
    let mut out = String::new();

    match response {
        AiResponse::Chart(chart) => {
            if let Some(caption) = &chart.caption {
                out.push_str(caption);
                out.push('\n');
            }
            match TextChart::from_spec(&chart.spec) {
                Some(text_chart) => out.push_str(&text_chart.render(CHART_WIDTH)),
                None => {
                    out.push_str(&chart::describe(&chart.spec));
                    out.push('\n');
                }
            }
        }
        AiResponse::Vision(vision) => {
            out.push_str(&format!("Image Analysis: {}\n", vision.description));
            out.push_str(&format!(
                "Answer: {}\n",
                vision.answer.as_deref().unwrap_or_default()
            ));
            if !vision.tags.is_empty() {
                let tags: Vec<String> = vision
                    .tags
                    .iter()
                    .enumerate()
                    .map(|(i, tag)| format!("[{}] {}", i + 1, tag))
                    .collect();
                out.push_str(&format!("Tags: {}  (/tag N to ask more)\n", tags.join("  ")));
            }
        }
        AiResponse::RichText(rich) => {
            out.push_str(&rich.text);
            out.push('\n');
            if let Some(url) = &rich.image_url {
                out.push_str(&format!("Image: {}\n", url));
            }
            if !rich.reference_links.is_empty() {
                out.push_str("Learn More:\n");
                for link in &rich.reference_links {
                    out.push_str(&format!("  - {}\n", link));
                }
            }
        }
        AiResponse::Raw(text) => {
            out.push_str(text);
            out.push('\n');
        }
    }

    out
}

/// Tags offered by the newest AI message, if it is a vision answer
pub fn latest_tags(messages: &[Message]) -> Vec<String> {
    messages
        .iter()
        .rev()
        .find(|m| m.sender == Sender::Ai)
        .and_then(|m| m.response())
        .map(|response| match response {
            AiResponse::Vision(vision) => vision.tags,
            _ => Vec::new(),
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InteractionId;
    use serde_json::json;

    #[test]
    fn test_user_message_is_literal() {
        let message = Message::user(r#"{"primary_response": "not parsed"}"#);
        assert_eq!(
            render_message(&message),
            "you> {\"primary_response\": \"not parsed\"}\n"
        );
    }

    #[test]
    fn test_plain_string_renders_exactly() {
        let message = Message::ai(Some("plain string".to_string()), Some(InteractionId::new("3")));
        assert_eq!(render_message(&message), "maya> plain string\n");
    }

    #[test]
    fn test_chart_caption_and_bars() {
        let text = json!({
            "primary_response": "Revenue is up.",
            "visualization_spec": {
                "mark": "bar",
                "data": {"values": [{"q": "Q1", "rev": 1}, {"q": "Q2", "rev": 2}]},
                "encoding": {"x": {"field": "q"}, "y": {"field": "rev"}}
            }
        })
        .to_string();
        let message = Message::ai(Some(text), Some(InteractionId::new("12")));

        let rendered = render_message(&message);
        assert!(rendered.starts_with("maya> Revenue is up.\nrev by q (bar)\n"));
        assert!(rendered.contains("Q2 | "));
        assert!(rendered.ends_with("[#12] /good or /bad to rate\n"));
    }

    #[test]
    fn test_chart_without_inline_data_is_described() {
        let response = AiResponse::from_message_text(Some(
            r#"{"primary_response": "Revenue is up.", "visualization_spec": {"mark": "bar"}}"#,
        ));
        assert_eq!(render_response(&response), "Revenue is up.\n[bar chart]\n");
    }

    #[test]
    fn test_vision_and_latest_tags() {
        let text = r#"{"image_description": "A desk", "user_query_answer": "Yes", "identified_objects": ["laptop", "mug"]}"#;
        let messages = vec![
            Message::user("what is this"),
            Message::ai(Some(text.to_string()), Some(InteractionId::new("1"))),
        ];

        let rendered = render_response(&messages[1].response().unwrap());
        assert_eq!(
            rendered,
            "Image Analysis: A desk\nAnswer: Yes\nTags: [1] laptop  [2] mug  (/tag N to ask more)\n"
        );
        assert_eq!(latest_tags(&messages), vec!["laptop", "mug"]);
    }

    #[test]
    fn test_latest_tags_only_from_newest_ai_message() {
        let vision = r#"{"image_description": "A desk", "identified_objects": ["laptop"]}"#;
        let messages = vec![
            Message::ai(Some(vision.to_string()), None),
            Message::ai(Some("plain".to_string()), None),
        ];
        assert!(latest_tags(&messages).is_empty());
    }

    #[test]
    fn test_rich_text_links() {
        let response = AiResponse::from_message_text(Some(
            r#"{"primary_response": "Summary", "reference_links": ["https://a.example"]}"#,
        ));
        assert_eq!(
            render_response(&response),
            "Summary\nLearn More:\n  - https://a.example\n"
        );
    }

    #[test]
    fn test_empty_ai_message_shows_placeholder() {
        let message = Message::ai(None, None);
        assert_eq!(render_message(&message), "maya> Received an empty response.\n");
    }
}
