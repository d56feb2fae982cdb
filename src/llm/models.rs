

use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryDocument {
    pub headline: String,

    #[serde(alias = "summary")]
    pub text: String,

    #[serde(default)]
    pub highlights: Vec<String>,
}

impl SummaryDocument {
    pub fn new(headline: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            text: text.into(),
            highlights: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_highlights(mut self, highlights: Vec<String>) -> Self {
        self.highlights = highlights;
        self
    }

    pub fn partial_text(&self) -> String {
        if self.highlights.is_empty() {
            format!("{}\n{}", self.headline, self.text)
        } else {
            format!(
                "{}\n{}\n- {}",
                self.headline,
                self.text,
                self.highlights.join("\n- ")
            )
        }
    }

    pub fn is_incomplete(&self) -> bool {
        self.headline.trim().is_empty() || self.text.trim().is_empty()
    }
}
