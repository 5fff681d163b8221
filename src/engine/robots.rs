//! Robots.txt gate
//!
//! Fetched once per origin and cached for the rest of the run. A robots.txt
//! that cannot be fetched (missing, non-2xx, network error) permits
//! everything; an explicit disallow aborts the crawl like any other fetch
//! failure.

use reqwest::Client;
use robotstxt::DefaultMatcher;
use std::collections::HashMap;
use url::Url;

/// Per-origin cache of robots.txt bodies
///
/// An empty cached body means "allow everything".
pub struct RobotsCache {
    user_agent: String,
    bodies: HashMap<String, String>,
}

impl RobotsCache {
    pub fn new(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            bodies: HashMap::new(),
        }
    }

    /// Whether the user agent may fetch the given URL
    pub async fn is_allowed(&mut self, client: &Client, url: &Url) -> bool {
        let origin = url.origin().ascii_serialization();

        if !self.bodies.contains_key(&origin) {
            let body = fetch_robots_body(client, url).await;
            self.bodies.insert(origin.clone(), body);
        }

        let body = &self.bodies[&origin];
        if body.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(body, &self.user_agent, url.as_str())
    }

    /// Pre-seeds the cache for an origin (used in tests)
    #[cfg(test)]
    pub fn seed(&mut self, origin: &str, body: &str) {
        self.bodies.insert(origin.to_string(), body.to_string());
    }
}

/// Fetches the robots.txt body for a URL's origin
///
/// Any failure yields an empty body, i.e. no restrictions.
async fn fetch_robots_body(client: &Client, url: &Url) -> String {
    let robots_url = match url.join("/robots.txt") {
        Ok(u) => u,
        Err(_) => return String::new(),
    };

    tracing::debug!("Fetching robots.txt from {}", robots_url);
    match client.get(robots_url.clone()).send().await {
        Ok(response) if response.status().is_success() => {
            response.text().await.unwrap_or_default()
        }
        Ok(response) => {
            tracing::debug!(
                "robots.txt at {} returned HTTP {}, allowing everything",
                robots_url,
                response.status()
            );
            String::new()
        }
        Err(e) => {
            tracing::debug!(
                "robots.txt fetch from {} failed ({}), allowing everything",
                robots_url,
                e
            );
            String::new()
        }
    }
}
