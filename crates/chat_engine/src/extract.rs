//! Shape-tolerant extraction of answer, reasoning and summary text.
//!
//! Every rule reads through [`ResponseView`] and treats a missing key or a
//! value of an unexpected type as absent. Nothing here fails.

use serde_json::Value;

use crate::view::{field_array, field_str, ResponseView};

const OUTPUT_TEXT_TYPE: &str = "output_text";
const REASONING_TYPE: &str = "reasoning";

/// The three text channels of one completed turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedTurnResult {
    pub answer: String,
    pub reasoning: Vec<String>,
    pub reasoning_summary: Vec<String>,
}

/// Final answer text, trimmed. Empty when the response carries none.
pub fn extract_answer(view: &ResponseView) -> String {
    if let Some(flattened) = view.get_str("output_text") {
        let flattened = flattened.trim();
        if !flattened.is_empty() {
            return flattened.to_string();
        }
    }

    let mut answer = String::new();
    for item in output_items(view) {
        for part in field_array(item, "content").into_iter().flatten() {
            if let Some(text) = answer_part_text(part) {
                answer.push_str(text);
            }
        }
    }

    answer.trim().to_string()
}

/// Reasoning trace chunks in item order, then part order.
pub fn extract_reasoning(view: &ResponseView) -> Vec<String> {
    reasoning_items(view)
        .flat_map(|item| field_array(item, "content").into_iter().flatten())
        .filter_map(entry_text)
        .collect()
}

/// Reasoning summary entries: item-level summaries first, then the top-level
/// `reasoning.summary` list.
pub fn extract_reasoning_summary(view: &ResponseView) -> Vec<String> {
    let item_level = reasoning_items(view)
        .flat_map(|item| field_array(item, "summary").into_iter().flatten())
        .filter_map(entry_text);

    let top_level = view
        .get_object("reasoning")
        .and_then(|reasoning| reasoning.get("summary"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(entry_text);

    item_level.chain(top_level).collect()
}

pub fn extract_turn(view: &ResponseView) -> ExtractedTurnResult {
    ExtractedTurnResult {
        answer: extract_answer(view),
        reasoning: extract_reasoning(view),
        reasoning_summary: extract_reasoning_summary(view),
    }
}

fn output_items(view: &ResponseView) -> impl Iterator<Item = &Value> {
    view.get_array("output").into_iter().flatten()
}

fn reasoning_items(view: &ResponseView) -> impl Iterator<Item = &Value> {
    output_items(view).filter(|item| item_type(item) == Some(REASONING_TYPE))
}

fn item_type(value: &Value) -> Option<&str> {
    field_str(value, "type")
}

/// Direct text first: a bare string part, or an untagged part with a string
/// `text`. Tagged parts only count when tagged as output text.
fn answer_part_text(part: &Value) -> Option<&str> {
    if let Some(text) = part.as_str() {
        return Some(text);
    }

    match item_type(part) {
        None | Some(OUTPUT_TEXT_TYPE) => field_str(part, "text"),
        Some(_) => None,
    }
}

fn entry_text(entry: &Value) -> Option<String> {
    let text = entry.as_str().or_else(|| field_str(entry, "text"))?;
    if text.trim().is_empty() {
        return None;
    }
    Some(text.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flattened_output_text_wins_when_non_blank() {
        let view = ResponseView::from_value(json!({
            "output_text": "  Hi there \n",
            "output": [{"type": "message", "content": [{"type": "output_text", "text": "ignored"}]}],
        }));

        assert_eq!(extract_answer(&view), "Hi there");
    }

    #[test]
    fn blank_output_text_falls_back_to_content_scan() {
        let view = ResponseView::from_value(json!({
            "output_text": "   ",
            "output": [
                {"type": "message", "content": [
                    {"type": "output_text", "text": "Hello, "},
                    {"type": "refusal", "refusal": "no"},
                    {"type": "output_text", "text": "world"}
                ]},
                {"type": "message", "content": ["!"]}
            ],
        }));

        assert_eq!(extract_answer(&view), "Hello, world!");
    }

    #[test]
    fn untagged_parts_count_as_direct_text() {
        let view = ResponseView::from_value(json!({
            "output": [{"content": [{"text": " plain "}]}],
        }));

        assert_eq!(extract_answer(&view), "plain");
    }

    #[test]
    fn tagged_reasoning_parts_stay_out_of_answer() {
        let view = ResponseView::from_value(json!({
            "output": [
                {"type": "reasoning", "content": [{"type": "reasoning_text", "text": "thinking"}]},
                {"type": "message", "content": [{"type": "output_text", "text": "done"}]}
            ],
        }));

        assert_eq!(extract_answer(&view), "done");
        assert_eq!(extract_reasoning(&view), vec!["thinking".to_string()]);
    }

    #[test]
    fn untagged_text_in_reasoning_items_counts_as_answer() {
        let view = ResponseView::from_value(json!({
            "output": [{"type": "reasoning", "content": [{"text": "only text"}]}],
        }));

        assert_eq!(extract_answer(&view), "only text");
        assert_eq!(extract_reasoning(&view), vec!["only text".to_string()]);
    }

    #[test]
    fn reasoning_skips_blank_and_non_text_parts() {
        let view = ResponseView::from_value(json!({
            "output": [{"type": "reasoning", "content": [
                {"type": "reasoning_text", "text": ""},
                {"type": "reasoning_text", "text": 5},
                {"type": "reasoning_text", "text": "kept"}
            ]}],
        }));

        assert_eq!(extract_reasoning(&view), vec!["kept".to_string()]);
    }

    #[test]
    fn top_level_summary_accepts_strings_and_text_entries() {
        let view = ResponseView::from_value(json!({
            "reasoning": {"effort": "low", "summary": ["bare", {"text": "wrapped"}, {"text": ""}]},
        }));

        assert_eq!(
            extract_reasoning_summary(&view),
            vec!["bare".to_string(), "wrapped".to_string()]
        );
    }

    #[test]
    fn extract_turn_combines_channels() {
        let view = ResponseView::from_value(json!({
            "output": [
                {"type": "reasoning",
                 "content": [{"type": "reasoning_text", "text": "r"}],
                 "summary": [{"text": "s"}]},
                {"type": "message", "content": [{"type": "output_text", "text": "a"}]}
            ],
        }));

        assert_eq!(
            extract_turn(&view),
            ExtractedTurnResult {
                answer: "a".to_string(),
                reasoning: vec!["r".to_string()],
                reasoning_summary: vec!["s".to_string()],
            }
        );
    }
}
