// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! The scrape-until-empty loop behind the default command.

mod common;

use audible_scrape::cli::output;
use audible_scrape::cli::prompt::UrlSource;
use audible_scrape::cli::scrape_cmd::{self, ScrapeOptions};
use audible_scrape::clipboard::NoClipboard;
use audible_scrape::ScrapeError;
use common::{config, data_layer, PageScript, ScriptedRenderer, SessionPlan};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const FIRST: &str = "https://www.audible.com/pd/Project-Hail-Mary-Audiobook/B08G9PRS1K";
const SECOND: &str = "https://www.audible.com/pd/Dune-Audiobook/B002V1OF70";

/// Canned answers; once they run out every answer is empty.
#[derive(Clone, Default)]
struct Answers(Arc<Mutex<VecDeque<String>>>);

impl Answers {
    fn new(answers: &[&str]) -> Self {
        Self(Arc::new(Mutex::new(
            answers.iter().map(|a| a.to_string()).collect(),
        )))
    }

    fn remaining(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

impl UrlSource for Answers {
    fn next_url(&mut self) -> anyhow::Result<String> {
        Ok(self.0.lock().unwrap().pop_front().unwrap_or_default())
    }
}

struct BrokenTerminal;

impl UrlSource for BrokenTerminal {
    fn next_url(&mut self) -> anyhow::Result<String> {
        anyhow::bail!("terminal went away")
    }
}

fn renderer(plans: &[SessionPlan]) -> Arc<ScriptedRenderer> {
    std::env::set_var(output::QUIET_ENV, "1");
    Arc::new(ScriptedRenderer::new(
        PageScript {
            data_layer: data_layer(),
            ..Default::default()
        },
        plans,
    ))
}

fn options(url: Option<&str>, urls: impl UrlSource + 'static) -> ScrapeOptions {
    ScrapeOptions {
        url: url.map(str::to_string),
        urls: Box::new(urls),
        clipboard: Box::new(NoClipboard),
    }
}

#[tokio::test(start_paused = true)]
async fn exhausted_link_does_not_end_the_loop() {
    let renderer = renderer(&[
        SessionPlan::NeverReady,
        SessionPlan::NeverReady,
        SessionPlan::NeverReady,
        SessionPlan::NeverReady,
        SessionPlan::Ready,
    ]);
    let answers = Answers::new(&[FIRST, SECOND, ""]);

    scrape_cmd::run(renderer.clone(), config(), options(None, answers.clone()))
        .await
        .unwrap();

    assert_eq!(answers.remaining(), 0);
    let stats = renderer.stats();
    assert_eq!(stats.created, 5);
    assert_eq!(stats.navigations, 5);
    assert_eq!(stats.closed, 5);
}

#[tokio::test(start_paused = true)]
async fn empty_answer_after_a_scrape_ends_cleanly() {
    let renderer = renderer(&[SessionPlan::Ready]);
    let answers = Answers::new(&["   "]);

    let result = scrape_cmd::run(renderer.clone(), config(), options(Some(FIRST), answers.clone())).await;

    assert!(result.is_ok(), "{result:?}");
    assert_eq!(answers.remaining(), 0);
    assert_eq!(renderer.stats().created, 1);
    assert_eq!(renderer.stats().closed, 1);
}

#[tokio::test(start_paused = true)]
async fn empty_first_answer_is_an_error() {
    let renderer = renderer(&[SessionPlan::Ready]);

    let err = scrape_cmd::run(renderer.clone(), config(), options(None, Answers::new(&[""])))
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::NoUrl), "{err:?}");
    assert_eq!(renderer.stats().created, 0);
}

#[tokio::test(start_paused = true)]
async fn unreadable_input_stops_the_loop() {
    let renderer = renderer(&[SessionPlan::Ready]);

    let err = scrape_cmd::run(renderer.clone(), config(), options(Some(FIRST), BrokenTerminal))
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::Input(ref m) if m.contains("terminal went away")), "{err:?}");
    assert_eq!(renderer.stats().created, 1);
}
