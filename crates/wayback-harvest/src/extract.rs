// Copyright 2026 Wayback Harvest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Rendered text extraction and whitespace normalization.

use crate::error::{HarvestError, HarvestResult};
use crate::renderer::RenderContext;
use serde::{Deserialize, Serialize};

const INNER_TEXT_SCRIPT: &str = "document.body.innerText";

/// Text read from a rendered snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedContent {
    pub raw_text: String,
    /// Trimmed, with every whitespace run collapsed to one space.
    pub normalized_text: String,
}

impl RenderedContent {
    pub fn new(raw_text: String) -> Self {
        let normalized_text = normalize(&raw_text);
        Self {
            raw_text,
            normalized_text,
        }
    }
}

/// Collapse whitespace runs (newlines included) to single spaces and trim.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Read the visible text of the page loaded in `ctx`.
pub async fn extract(ctx: &dyn RenderContext) -> HarvestResult<RenderedContent> {
    let value = ctx
        .execute_js(INNER_TEXT_SCRIPT)
        .await
        .map_err(|e| HarvestError::Extraction(format!("{e:#}")))?;

    match value {
        serde_json::Value::String(raw) => Ok(RenderedContent::new(raw)),
        serde_json::Value::Null => Err(HarvestError::Extraction(
            "document has no body".to_string(),
        )),
        other => Err(HarvestError::Extraction(format!(
            "expected page text, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::NavigationResult;
    use async_trait::async_trait;
    use std::time::Duration;

    struct StaticPage(anyhow::Result<serde_json::Value>);

    #[async_trait]
    impl RenderContext for StaticPage {
        async fn navigate(
            &mut self,
            url: &str,
            _timeout: Duration,
        ) -> anyhow::Result<NavigationResult> {
            Ok(NavigationResult {
                final_url: url.to_string(),
                load_time_ms: 0,
            })
        }

        async fn execute_js(&self, script: &str) -> anyhow::Result<serde_json::Value> {
            assert_eq!(script, INNER_TEXT_SCRIPT);
            match &self.0 {
                Ok(v) => Ok(v.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }

        async fn close(self: Box<Self>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  hello \n\n\t world  "), "hello world");
        assert_eq!(normalize("a\r\nb"), "a b");
        assert_eq!(normalize(" \n "), "");
        assert_eq!(normalize("already clean"), "already clean");
    }

    #[tokio::test]
    async fn test_extract_string() {
        let page = StaticPage(Ok(serde_json::json!("Hello\n  World ")));
        let content = extract(&page).await.unwrap();
        assert_eq!(content.raw_text, "Hello\n  World ");
        assert_eq!(content.normalized_text, "Hello World");
    }

    #[tokio::test]
    async fn test_extract_script_error() {
        let page = StaticPage(Err(anyhow::anyhow!(
            "TypeError: Cannot read properties of null (reading 'innerText')"
        )));
        let err = extract(&page).await.unwrap_err();
        assert!(matches!(err, HarvestError::Extraction(_)));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_extract_non_string() {
        let page = StaticPage(Ok(serde_json::Value::Null));
        assert!(extract(&page).await.is_err());
        let page = StaticPage(Ok(serde_json::json!(42)));
        assert!(extract(&page).await.is_err());
    }
}
