

use chrono::DateTime;
use serde_json::Value;

use crate::core::events::Event;

const MAX_PAYLOAD_CHARS: usize = 800;


pub const CHUNK_SYSTEM_PROMPT: &str = r#"You summarize activity notifications (GitHub, Trello and other webhooks) for a team Slack channel.

You receive a chronological list of events for one project. Write a short digest of what happened.

Output JSON with this structure:
{
  "headline": "one line, at most 12 words",
  "summary": "2-5 sentences in chronological order, naming people, items and outcomes",
  "highlights": ["at most 5 notable items, one short line each"]
}

Group related events (e.g. several commits to the same pull request). Do not invent facts that are not in the events."#;


pub const CONSOLIDATION_SYSTEM_PROMPT: &str = r#"You merge partial digests of one project's activity into a single digest for a team Slack channel.

The partial digests are listed in chronological order and each covers a consecutive slice of events. Produce ONE coherent narrative that reads as if it was written over all events at once. Do not list the parts separately, do not mention that there were parts.

Output JSON with this structure:
{
  "headline": "one line, at most 12 words",
  "summary": "3-6 sentences in chronological order",
  "highlights": ["at most 6 notable items, one short line each"]
}"#;


const ELLIPSIS: &str = "...";


pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }

    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = s.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}


fn render_payload(payload: &Value) -> String {
    match payload {
        Value::String(text) => text.clone(),
        Value::Object(map) => match map.get("text").or_else(|| map.get("message")) {
            Some(Value::String(text)) => text.clone(),
            _ => payload.to_string(),
        },
        other => other.to_string(),
    }
}


fn render_event(position: usize, event: &Event) -> String {
    let at = DateTime::from_timestamp(event.occurred_at, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| event.occurred_at.to_string());

    format!(
        "{}. [{}] ({}) {}",
        position + 1,
        at,
        event.source,
        truncate_chars(&render_payload(&event.payload), MAX_PAYLOAD_CHARS)
    )
}


pub fn build_chunk_prompt(events: &[Event], project_key: &str) -> String {
    let lines: Vec<String> = events
        .iter()
        .enumerate()
        .map(|(i, e)| render_event(i, e))
        .collect();

    format!(
        "Project: {}\nEvents ({}):\n{}",
        project_key,
        events.len(),
        lines.join("\n")
    )
}


pub fn build_consolidation_prompt(partials: &[String], project_key: &str) -> String {
    let parts: Vec<String> = partials
        .iter()
        .enumerate()
        .map(|(i, text)| format!("--- Part {} ---\n{}", i + 1, text.trim()))
        .collect();

    format!(
        "Project: {}\nPartial digests ({}):\n\n{}",
        project_key,
        partials.len(),
        parts.join("\n\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::EventSource;
    use serde_json::json;

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_chars("Привет мир", 9), "Привет...");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn test_truncate_never_exceeds_limit() {
        for limit in [0, 2, 3, 4, 150] {
            let clipped = truncate_chars(&"x".repeat(400), limit);
            assert!(clipped.chars().count() <= limit.max(3), "limit={limit}");
        }
        assert_eq!(truncate_chars("abcdef", 5), "ab...");
    }

    #[test]
    fn test_chunk_prompt_keeps_event_order() {
        let events = vec![
            Event::new("apollo", EventSource::Github, json!({"text": "PR #7 opened by ana"}))
                .with_occurred_at(0),
            Event::new("apollo", EventSource::Trello, json!("Card moved to Done"))
                .with_occurred_at(60),
        ];

        let prompt = build_chunk_prompt(&events, "apollo");

        assert!(prompt.starts_with("Project: apollo\nEvents (2):"));
        assert!(prompt.contains("1. [1970-01-01 00:00 UTC] (github) PR #7 opened by ana"));
        assert!(prompt.contains("2. [1970-01-01 00:01 UTC] (trello) Card moved to Done"));
    }

    #[test]
    fn test_raw_payload_is_serialized_and_truncated() {
        let big = "x".repeat(2000);
        let event = Event::new("apollo", EventSource::Generic, json!({"blob": big}));
        let prompt = build_chunk_prompt(&[event], "apollo");
        assert!(prompt.contains("{\"blob\":\"xxx"));
        assert!(prompt.ends_with("..."));
    }

    #[test]
    fn test_consolidation_prompt_numbers_parts() {
        let prompt = build_consolidation_prompt(&["first".to_string(), "second".to_string()], "zeus");
        let first = prompt.find("--- Part 1 ---\nfirst").unwrap();
        let second = prompt.find("--- Part 2 ---\nsecond").unwrap();
        assert!(first < second);
    }
}
