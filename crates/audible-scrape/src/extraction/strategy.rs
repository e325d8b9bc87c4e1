// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Ordered extraction strategies and the "first non-empty wins" combinator
//! shared by every field.

use crate::renderer::RenderContext;
use async_trait::async_trait;
use serde_json::Value;

/// Values that can come back empty from a strategy.
pub trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl<T> Blank for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

/// A named rule that tries to produce one field's raw value from a live page.
#[async_trait]
pub trait ExtractionStrategy<T: Send>: Send + Sync {
    fn name(&self) -> &'static str;
    /// `Ok(None)` means the page has nothing for this strategy.
    async fn extract(&self, page: &dyn RenderContext) -> anyhow::Result<Option<T>>;
}

/// The winning value and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<T> {
    pub value: T,
    pub strategy: &'static str,
}

/// Run `strategies` in order and return the first non-blank result.
///
/// A strategy that errors is logged and skipped, so one broken page
/// structure never hides the others.
pub async fn first_match<T>(
    field: &str,
    strategies: &[Box<dyn ExtractionStrategy<T>>],
    page: &dyn RenderContext,
) -> Option<Match<T>>
where
    T: Blank + Send,
{
    for strategy in strategies {
        match strategy.extract(page).await {
            Ok(Some(value)) if !value.is_blank() => {
                tracing::debug!(field, strategy = strategy.name(), "strategy matched");
                return Some(Match {
                    value,
                    strategy: strategy.name(),
                });
            }
            Ok(_) => {
                tracing::trace!(field, strategy = strategy.name(), "strategy found nothing");
            }
            Err(e) => {
                tracing::debug!(field, strategy = strategy.name(), "strategy failed: {e:#}");
            }
        }
    }
    None
}

/// Text content of a JS evaluation result. `null`/`undefined` read as empty.
pub fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{Locator, NavigationResult, RenderElement};

    struct BlankPage;

    #[async_trait]
    impl RenderContext for BlankPage {
        async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> anyhow::Result<NavigationResult> {
            Ok(NavigationResult {
                final_url: url.to_string(),
                load_time_ms: 0,
            })
        }
        async fn execute_js(&self, _script: &str) -> anyhow::Result<Value> {
            Ok(Value::Null)
        }
        async fn find_elements(
            &self,
            _locator: &Locator,
        ) -> anyhow::Result<Vec<Box<dyn RenderElement>>> {
            Ok(Vec::new())
        }
        async fn close(self: Box<Self>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct Fixed(&'static str, Option<&'static str>);

    #[async_trait]
    impl ExtractionStrategy<String> for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }
        async fn extract(&self, _page: &dyn RenderContext) -> anyhow::Result<Option<String>> {
            Ok(self.1.map(str::to_string))
        }
    }

    struct Broken;

    #[async_trait]
    impl ExtractionStrategy<String> for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }
        async fn extract(&self, _page: &dyn RenderContext) -> anyhow::Result<Option<String>> {
            anyhow::bail!("shadow root detached")
        }
    }

    #[tokio::test]
    async fn first_non_blank_wins_in_order() {
        let strategies: Vec<Box<dyn ExtractionStrategy<String>>> = vec![
            Box::new(Fixed("none", None)),
            Box::new(Fixed("blank", Some("  "))),
            Box::new(Fixed("second", Some("b"))),
            Box::new(Fixed("third", Some("c"))),
        ];
        let m = first_match("f", &strategies, &BlankPage).await.unwrap();
        assert_eq!(m.value, "b");
        assert_eq!(m.strategy, "second");
    }

    #[tokio::test]
    async fn errors_fall_through_to_next() {
        let strategies: Vec<Box<dyn ExtractionStrategy<String>>> =
            vec![Box::new(Broken), Box::new(Fixed("after", Some("ok")))];
        let m = first_match("f", &strategies, &BlankPage).await.unwrap();
        assert_eq!(m.strategy, "after");
    }

    #[tokio::test]
    async fn all_empty_yields_none() {
        let strategies: Vec<Box<dyn ExtractionStrategy<String>>> =
            vec![Box::new(Broken), Box::new(Fixed("none", None))];
        assert!(first_match("f", &strategies, &BlankPage).await.is_none());
    }

    #[test]
    fn value_text_coercion() {
        assert_eq!(value_text(Value::Null), "");
        assert_eq!(value_text(serde_json::json!(" x ")), "x");
        assert_eq!(value_text(serde_json::json!(5)), "5");
    }
}
