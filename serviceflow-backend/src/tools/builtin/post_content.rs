//! Content posting helper.
//!
//! Builds a text payload, POSTs it to the configured webhook, and optionally
//! writes a JSON copy to disk. One attempt, no retries; ordering is call
//! order only.

use crate::tools::registry::Tool;
use crate::tools::types::{
    PropertySchema, ToolContext, ToolDefinition, ToolGroup, ToolInputSchema, ToolResult,
};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

pub struct PostContentTool {
    webhook_url: Option<String>,
    content_dir: Option<String>,
    http: reqwest::Client,
    definition: ToolDefinition,
}

impl PostContentTool {
    pub fn new(webhook_url: Option<String>, content_dir: Option<String>) -> Self {
        let mut properties = HashMap::new();
        properties.insert(
            "title".to_string(),
            PropertySchema {
                schema_type: "string".to_string(),
                description: "Optional headline".to_string(),
                default: None,
                items: None,
            },
        );
        properties.insert(
            "body".to_string(),
            PropertySchema {
                schema_type: "string".to_string(),
                description: "Post body text".to_string(),
                default: None,
                items: None,
            },
        );
        properties.insert(
            "tags".to_string(),
            PropertySchema {
                schema_type: "array".to_string(),
                description: "Optional tags appended as #hashtags".to_string(),
                default: None,
                items: Some(Box::new(PropertySchema {
                    schema_type: "string".to_string(),
                    description: "Tag".to_string(),
                    default: None,
                    items: None,
                })),
            },
        );
        properties.insert(
            "save_to_disk".to_string(),
            PropertySchema {
                schema_type: "boolean".to_string(),
                description: "Also write a JSON copy to the content directory".to_string(),
                default: Some(json!(false)),
                items: None,
            },
        );

        PostContentTool {
            webhook_url,
            content_dir,
            http: reqwest::Client::new(),
            definition: ToolDefinition {
                name: "post_content".to_string(),
                description: "Publish a content post: build the text, POST it to the \
                              configured webhook, and optionally save a JSON copy to disk."
                    .to_string(),
                input_schema: ToolInputSchema {
                    schema_type: "object".to_string(),
                    properties,
                    required: vec!["body".to_string()],
                },
                group: ToolGroup::Web,
            },
        }
    }

    fn build_text(title: Option<&str>, body: &str, tags: &[String]) -> String {
        let mut text = String::new();
        if let Some(title) = title {
            text.push_str(title);
            text.push_str("\n\n");
        }
        text.push_str(body);
        if !tags.is_empty() {
            text.push_str("\n\n");
            let hashtags: Vec<String> = tags.iter().map(|t| format!("#{}", t)).collect();
            text.push_str(&hashtags.join(" "));
        }
        text
    }
}

#[derive(Debug, Deserialize)]
struct Params {
    title: Option<String>,
    body: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    save_to_disk: bool,
}

#[async_trait]
impl Tool for PostContentTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult {
        let params: Params = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid parameters: {}", e)),
        };

        if params.body.trim().is_empty() {
            return ToolResult::error("'body' must not be empty");
        }

        let post_id = Uuid::new_v4().to_string();
        let text = Self::build_text(params.title.as_deref(), &params.body, &params.tags);
        let payload = json!({
            "id": post_id,
            "title": params.title,
            "body": params.body,
            "tags": params.tags,
            "text": text,
            "agent": context.agent_name,
            "posted_at": Utc::now().to_rfc3339(),
        });

        let mut notes = Vec::new();

        // Single POST attempt; a failed webhook is reported, not retried
        match &self.webhook_url {
            Some(url) => match self.http.post(url).json(&payload).send().await {
                Ok(resp) if resp.status().is_success() => {
                    notes.push(format!("posted to webhook ({})", resp.status()));
                }
                Ok(resp) => {
                    return ToolResult::error(format!("Webhook rejected post: {}", resp.status()));
                }
                Err(e) => return ToolResult::error(format!("Webhook request failed: {}", e)),
            },
            None => notes.push("no webhook configured, skipped".to_string()),
        }

        if params.save_to_disk {
            match &self.content_dir {
                Some(dir) => {
                    let path = std::path::Path::new(dir).join(format!("{}.json", post_id));
                    let write = std::fs::create_dir_all(dir).and_then(|_| {
                        std::fs::write(
                            &path,
                            serde_json::to_string_pretty(&payload).unwrap_or_default(),
                        )
                    });
                    match write {
                        Ok(()) => notes.push(format!("saved to {}", path.display())),
                        Err(e) => {
                            log::warn!("Failed to save content {}: {}", post_id, e);
                            notes.push(format!("disk save failed: {}", e));
                        }
                    }
                }
                None => notes.push("no content directory configured, skipped save".to_string()),
            }
        }

        ToolResult::success(format!("Post {}: {}", post_id, notes.join("; "))).with_metadata(json!({
            "id": post_id,
            "text": text,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_text_with_title_and_tags() {
        let text = PostContentTool::build_text(
            Some("Spring special"),
            "20% off lawn care this week.",
            &["lawncare".to_string(), "promo".to_string()],
        );
        assert_eq!(
            text,
            "Spring special\n\n20% off lawn care this week.\n\n#lawncare #promo"
        );
    }

    #[test]
    fn builds_bare_body() {
        let text = PostContentTool::build_text(None, "Open on Saturdays now.", &[]);
        assert_eq!(text, "Open on Saturdays now.");
    }

    #[tokio::test]
    async fn saves_json_copy_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let tool = PostContentTool::new(None, Some(dir.path().to_string_lossy().to_string()));

        let result = tool
            .execute(
                json!({"body": "Hello", "save_to_disk": true}),
                &ToolContext::new(),
            )
            .await;
        assert!(result.success);

        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);

        let content = std::fs::read_to_string(files[0].as_ref().unwrap().path()).unwrap();
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["body"], "Hello");
    }

    #[tokio::test]
    async fn empty_body_is_rejected() {
        let tool = PostContentTool::new(None, None);
        let result = tool.execute(json!({"body": "  "}), &ToolContext::new()).await;
        assert!(!result.success);
    }
}
