

use serde::Serialize;
use serde_json::{Value, json};

use crate::llm::models::SummaryDocument;
use crate::llm::prompt::truncate_chars;

const HEADER_MAX_CHARS: usize = 150;
const SECTION_MAX_CHARS: usize = 2900;


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichMessage {
    pub text: String,
    pub blocks: Vec<Value>,
}

impl RichMessage {
    pub fn from_summary(summary: &SummaryDocument, project_key: &str, event_count: usize) -> Self {
        let mut blocks = vec![json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": truncate_chars(&summary.headline, HEADER_MAX_CHARS),
                "emoji": true
            }
        })];

        if !summary.text.trim().is_empty() {
            blocks.push(json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": truncate_chars(&summary.text, SECTION_MAX_CHARS)
                }
            }));
        }

        if !summary.highlights.is_empty() {
            let bullets: Vec<String> = summary
                .highlights
                .iter()
                .map(|h| format!("• {h}"))
                .collect();
            blocks.push(json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": truncate_chars(&bullets.join("\n"), SECTION_MAX_CHARS)
                }
            }));
        }

        let noun = if event_count == 1 { "event" } else { "events" };
        blocks.push(json!({
            "type": "context",
            "elements": [{
                "type": "mrkdwn",
                "text": format!("*{project_key}* · {event_count} {noun} summarized")
            }]
        }));

        Self {
            text: format!("[{}] {}: {}", project_key, summary.headline, summary.text),
            blocks,
        }
    }
}
