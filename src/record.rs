/*!
 * Scraped record model.
 *
 * A `Record` is what a generated spider yields for one page: the three
 * required fields, the fields the pipelines add, and whatever extra fields the
 * spider's parsers extracted.
 */

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One scraped item flowing through a pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Page title
    pub title: String,

    /// Main text content
    pub content: String,

    /// Source URL, used for deduplication
    pub url: String,

    /// Run identifier stamped by the pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// Translated title, set by the translating pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_zh: Option<String>,

    /// Translated content, set by the translating pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_zh: Option<String>,

    /// Any other fields produced by the spider's parsers
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Create a record with the three required fields
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Attach an extra field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Stamp the run identifier
    pub fn stamp(&mut self, task_id: &str) {
        self.task_id = Some(task_id.to_string());
    }

    /// Whether both translated fields are present
    pub fn is_translated(&self) -> bool {
        self.title_zh.is_some() && self.content_zh.is_some()
    }

    /// Parse one JSON object per line, skipping blank lines
    pub fn from_json_lines(text: &str) -> Result<Vec<Record>> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Invalid record on line {}", index + 1))
            })
            .collect()
    }
}
