//! The pipeline engine: crawl orchestration
//!
//! Visits the script's entry URL and every link surfaced by `follow` rules,
//! evaluating the pipeline in declaration order against each page. The run
//! is a single sequential traversal: one task owns the column store, so
//! appends never race. There is no visited-set — the only revisit guard is
//! the per-rule `visit_once` self-loop check, and a pipeline that always
//! follows a link back to an earlier page will loop until the domain
//! restriction or an error stops it.

use crate::engine::fetcher::{build_http_client, fetch_page, FetchError};
use crate::engine::page::{Element, Page};
use crate::engine::robots::RobotsCache;
use crate::script::{Action, Rule, Script};
use crate::store::ColumnStore;
use crate::{ScriptError, SkrapaError};
use rand::Rng;
use reqwest::Client;
use scraper::Selector;
use std::collections::VecDeque;
use std::time::Duration;
use url::Url;

/// A pipeline rule with its selector compiled
struct CompiledRule {
    selector: Selector,
    rule: Rule,
}

/// The extraction engine for one crawl run
pub struct Engine {
    script: Script,
    rules: Vec<CompiledRule>,
    client: Client,
    robots: RobotsCache,
    store: ColumnStore,
    queue: VecDeque<Url>,
}

impl Engine {
    /// Builds an engine from a validated script
    ///
    /// Selector compilation failures still surface here as [`ScriptError`]
    /// in case the script skipped validation.
    pub fn new(script: Script) -> Result<Self, SkrapaError> {
        let entry = Url::parse(&script.main.url)?;

        let mut rules = Vec::with_capacity(script.pipeline.len());
        for rule in &script.pipeline {
            let selector =
                Selector::parse(&rule.selector).map_err(|e| ScriptError::InvalidSelector {
                    selector: rule.selector.clone(),
                    message: e.to_string(),
                })?;
            rules.push(CompiledRule {
                selector,
                rule: rule.clone(),
            });
        }

        let client = build_http_client(script.user_agent())?;
        let robots = RobotsCache::new(script.user_agent());

        let mut queue = VecDeque::new();
        queue.push_back(entry);

        Ok(Self {
            script,
            rules,
            client,
            robots,
            store: ColumnStore::new(),
            queue,
        })
    }

    /// Runs the crawl to completion and returns the accumulated columns
    ///
    /// Returns once every scheduled fetch, including those spawned by
    /// `follow` rules mid-traversal, has been processed. Any fetch failure
    /// aborts the run.
    pub async fn run(mut self) -> Result<ColumnStore, SkrapaError> {
        tracing::info!("Running {}", self.script.main.url);

        let mut pages_visited: u64 = 0;

        while let Some(url) = self.queue.pop_front() {
            if pages_visited > 0 {
                politeness_pause(self.script.main.delay, self.script.main.random_delay).await;
            }

            check_domain(&self.script.main.allowed_domains, &url)?;

            if !self.robots.is_allowed(&self.client, &url).await {
                return Err(FetchError::RobotsDenied {
                    url: url.to_string(),
                }
                .into());
            }

            tracing::info!("Attempting to load: {}", url);
            let fetched = fetch_page(&self.client, &url).await?;
            tracing::info!("Loaded page from: {}", fetched.final_url);
            pages_visited += 1;

            if !fetched.is_html() {
                tracing::info!(
                    "Skipping pipeline for {}: content type {:?} is not HTML",
                    fetched.final_url,
                    fetched.content_type
                );
                continue;
            }

            let page = Page::parse(fetched.final_url, &fetched.body);
            self.apply_pipeline(&page)?;
        }

        tracing::info!(
            "Run complete: {} pages visited, {} values collected across {} columns",
            pages_visited,
            self.store.value_count(),
            self.store.column_count()
        );

        Ok(self.store)
    }

    /// Evaluates every rule against a page, in declaration order
    fn apply_pipeline(&mut self, page: &Page) -> Result<(), SkrapaError> {
        let Self {
            rules,
            store,
            queue,
            ..
        } = self;

        for compiled in rules.iter() {
            let matches = page.select(&compiled.selector);
            if matches.is_empty() {
                continue;
            }

            match compiled.rule.action {
                Action::Collect => {
                    tracing::debug!("Triggering collect pipeline: {:?}", compiled.rule.selector);
                    // Validation guarantees the column is present
                    let column = compiled.rule.column.as_deref().unwrap_or_default();
                    for element in &matches {
                        let value = extract_value(&compiled.rule, element);
                        tracing::info!("Collecting data: {:?} -> {}", column, value);
                        store.append(column, value);
                    }
                }
                Action::Follow => {
                    tracing::debug!("Triggering follow pipeline: {:?}", compiled.rule.selector);
                    for element in &matches {
                        if let Some(link) = resolve_follow(&compiled.rule, element, page.url())? {
                            tracing::info!("Following link {}", link);
                            queue.push_back(link);
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Extracts the value a `collect` rule reads from an element
///
/// The "text" sentinel reads trimmed text content; anything else reads the
/// named attribute, empty string when absent.
fn extract_value(rule: &Rule, element: &Element) -> String {
    if rule.reads_text() {
        element.text()
    } else {
        element.attr(&rule.attr)
    }
}

/// Resolves the target of a `follow` rule
///
/// Returns `Ok(None)` for the one documented skip: `visit_once` is set and
/// the link resolves to the page currently being processed.
fn resolve_follow(
    rule: &Rule,
    element: &Element,
    page_url: &Url,
) -> Result<Option<Url>, FetchError> {
    let href = element.attr(&rule.attr);
    if href.is_empty() {
        return Err(FetchError::InvalidLink {
            href,
            message: "empty link attribute".to_string(),
        });
    }

    let resolved = page_url.join(&href).map_err(|e| FetchError::InvalidLink {
        href: href.clone(),
        message: e.to_string(),
    })?;

    if rule.visit_once && resolved.as_str() == page_url.as_str() {
        tracing::info!(
            "Revisit encountered but visit-once enabled, skipping: {}",
            resolved
        );
        return Ok(None);
    }

    Ok(Some(resolved))
}

/// Rejects URLs outside the script's allowed domains
///
/// An empty allow-list means unrestricted. This is the error path that
/// halts crawls wandering off-site, including cyclic ones.
fn check_domain(allowed: &[String], url: &Url) -> Result<(), FetchError> {
    if allowed.is_empty() {
        return Ok(());
    }

    let host = url.host_str().unwrap_or("");
    if allowed.iter().any(|domain| domain == host) {
        Ok(())
    } else {
        Err(FetchError::DomainNotAllowed {
            url: url.to_string(),
        })
    }
}

/// Sleeps for the script's politeness delay plus random jitter
async fn politeness_pause(delay: Option<u64>, random_delay: Option<u64>) {
    let mut wait = Duration::from_secs(delay.unwrap_or(0));

    if let Some(max_jitter) = random_delay {
        if max_jitter > 0 {
            let jitter_ms = rand::thread_rng().gen_range(0..=max_jitter * 1000);
            wait += Duration::from_millis(jitter_ms);
        }
    }

    if !wait.is_zero() {
        tracing::debug!("Politeness pause: {:?}", wait);
        tokio::time::sleep(wait).await;
    }
}
