// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Scripted browser sessions for integration tests.
//!
//! A `ScriptedRenderer` answers every script the scraper sends with canned
//! page content, and counts sessions and script calls so tests can check
//! retry and cleanup behavior without a browser.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use audible_scrape::config::ScrapeConfig;
use audible_scrape::extraction::PageLayout;
use audible_scrape::progress::{ProgressReceiver, ScrapeEvent};
use audible_scrape::renderer::{
    Locator, NavigationResult, NavigationTimeout, RenderContext, RenderElement, Renderer,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How a session created by the renderer behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPlan {
    /// Readiness holds on the first poll.
    Ready,
    /// Readiness never holds.
    NeverReady,
    /// Navigation itself fails.
    NavigationError,
    /// Navigation never finishes and runs out its budget.
    NavigationHang,
    /// The readiness script raises.
    ReadinessError,
    /// Like `Ready`, but closing the session fails.
    ReadyCloseFails,
    /// Like `NeverReady`, but closing the session fails.
    NeverReadyCloseFails,
}

/// Canned page content.
#[derive(Debug, Clone, Default)]
pub struct PageScript {
    /// Value the data-layer script returns.
    pub data_layer: Value,
    pub shadow_date: String,
    /// `(poll, value)`: the embedded JSON date, present from that poll on.
    pub embedded_json: Option<(u32, String)>,
    pub meta_date: String,
    pub body_text: String,
    /// Element texts keyed by locator (`css=...` / `xpath=...`).
    pub elements: HashMap<String, Vec<String>>,
}

impl PageScript {
    pub fn with_elements(mut self, locator: Locator, texts: &[&str]) -> Self {
        self.elements.insert(
            locator.to_string(),
            texts.iter().map(|t| t.to_string()).collect(),
        );
        self
    }
}

/// Shared counters.
#[derive(Debug, Default)]
pub struct Stats {
    pub created: u32,
    pub closed: u32,
    pub navigations: u32,
    js_calls: HashMap<String, u32>,
}

impl Stats {
    pub fn calls(&self, script: &str) -> u32 {
        self.js_calls.get(script).copied().unwrap_or(0)
    }
}

#[derive(Clone)]
struct Scripts {
    readiness: String,
    data_layer: String,
    shadow_date: String,
    embedded_json: String,
    page_text: String,
    date_published: String,
}

impl Scripts {
    fn new(layout: &PageLayout) -> Self {
        Self {
            readiness: layout.readiness_script(),
            data_layer: layout.data_layer_script(),
            shadow_date: layout.shadow_date_script(),
            embedded_json: layout.embedded_json_script(),
            page_text: layout.page_text_script(),
            date_published: layout.date_published_script(),
        }
    }
}

pub struct ScriptedRenderer {
    page: Arc<PageScript>,
    plans: Vec<SessionPlan>,
    scripts: Scripts,
    stats: Arc<Mutex<Stats>>,
}

impl ScriptedRenderer {
    /// Sessions follow `plans` in creation order; the last plan repeats.
    pub fn new(page: PageScript, plans: &[SessionPlan]) -> Self {
        Self {
            page: Arc::new(page),
            plans: plans.to_vec(),
            scripts: Scripts::new(&PageLayout::default()),
            stats: Arc::new(Mutex::new(Stats::default())),
        }
    }

    pub fn stats(&self) -> std::sync::MutexGuard<'_, Stats> {
        self.stats.lock().expect("stats lock")
    }

    pub fn layout(&self) -> PageLayout {
        PageLayout::default()
    }
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let mut stats = self.stats.lock().expect("stats lock");
        stats.created += 1;
        let index = (stats.created as usize - 1).min(self.plans.len().saturating_sub(1));
        let plan = self.plans.get(index).copied().unwrap_or(SessionPlan::Ready);
        Ok(Box::new(ScriptedContext {
            plan,
            page: self.page.clone(),
            scripts: self.scripts.clone(),
            stats: self.stats.clone(),
        }))
    }

    fn active_contexts(&self) -> usize {
        let stats = self.stats.lock().expect("stats lock");
        (stats.created - stats.closed) as usize
    }
}

struct ScriptedContext {
    plan: SessionPlan,
    page: Arc<PageScript>,
    scripts: Scripts,
    stats: Arc<Mutex<Stats>>,
}

#[async_trait]
impl RenderContext for ScriptedContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        self.stats.lock().expect("stats lock").navigations += 1;
        match self.plan {
            SessionPlan::NavigationError => return Err(anyhow!("net::ERR_CONNECTION_RESET")),
            SessionPlan::NavigationHang => {
                tokio::time::sleep(Duration::from_millis(timeout_ms)).await;
                return Err(NavigationTimeout { timeout_ms }.into());
            }
            _ => {}
        }
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 5,
        })
    }

    async fn execute_js(&self, script: &str) -> Result<Value> {
        let calls = {
            let mut stats = self.stats.lock().expect("stats lock");
            let n = stats.js_calls.entry(script.to_string()).or_insert(0);
            *n += 1;
            *n
        };
        let s = &self.scripts;
        let page = &self.page;

        if script == s.readiness {
            return match self.plan {
                SessionPlan::Ready | SessionPlan::ReadyCloseFails => Ok(json!(true)),
                SessionPlan::NeverReady
                | SessionPlan::NeverReadyCloseFails
                | SessionPlan::NavigationError
                | SessionPlan::NavigationHang => Ok(json!(false)),
                SessionPlan::ReadinessError => Err(anyhow!("Execution context was destroyed")),
            };
        }
        if script == s.data_layer {
            return Ok(page.data_layer.clone());
        }
        if script == s.shadow_date {
            return Ok(json!(page.shadow_date));
        }
        if script == s.embedded_json {
            return Ok(match &page.embedded_json {
                Some((from_poll, value)) if calls >= *from_poll => json!(value),
                _ => json!(""),
            });
        }
        if script == s.page_text {
            return Ok(json!(page.body_text));
        }
        if script == s.date_published {
            return Ok(json!(page.meta_date));
        }
        Ok(Value::Null)
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<Box<dyn RenderElement>>> {
        let texts = self
            .page
            .elements
            .get(&locator.to_string())
            .cloned()
            .unwrap_or_default();
        Ok(texts
            .into_iter()
            .map(|text| Box::new(ScriptedElement { text }) as Box<dyn RenderElement>)
            .collect())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.stats.lock().expect("stats lock").closed += 1;
        match self.plan {
            SessionPlan::ReadyCloseFails | SessionPlan::NeverReadyCloseFails => {
                Err(anyhow!("Target.closeTarget: No target with given id found"))
            }
            _ => Ok(()),
        }
    }
}

struct ScriptedElement {
    text: String,
}

#[async_trait]
impl RenderElement for ScriptedElement {
    async fn text(&self) -> Result<String> {
        Ok(self.text.trim().to_string())
    }
}

/// A fully populated data layer.
pub fn data_layer() -> Value {
    json!({
        "title": "Project Hail Mary",
        "author": "Andy Weir",
        "narrators": [{"fullName": "Ray Porter"}],
        "publisher": "Audible Studios",
        "category": "Science Fiction & Fantasy",
        "subCategory": "Science Fiction, Space Opera",
        "link": "https://www.audible.com/pd/Project-Hail-Mary-Audiobook/B08G9PRS1K"
    })
}

/// Default config with the clipboard off.
pub fn config() -> ScrapeConfig {
    ScrapeConfig {
        clipboard: false,
        ..ScrapeConfig::default()
    }
}

/// Everything currently buffered on `rx`.
pub fn drain(rx: &mut ProgressReceiver) -> Vec<ScrapeEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
