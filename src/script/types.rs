use serde::Deserialize;

/// Attribute sentinel meaning "use the element's trimmed text content"
pub const TEXT_ATTRIBUTE: &str = "text";

/// A Skrapa script: one crawl job described as TOML
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    pub main: MainConfig,
    #[serde(default)]
    pub pipeline: Vec<Rule>,
}

/// The `[main]` section of a script
#[derive(Debug, Clone, Deserialize)]
pub struct MainConfig {
    /// Crawl entry point
    pub url: String,

    /// Output file path recorded for the export stage
    pub file: String,

    /// Output format recorded for the export stage
    pub format: OutputFormat,

    /// User agent sent with every request (defaults to "Skrapa")
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Seconds to wait between fetches
    #[serde(default)]
    pub delay: Option<u64>,

    /// Extra random delay between fetches, in seconds
    #[serde(default)]
    pub random_delay: Option<u64>,

    /// Domains the crawl may fetch from; empty means unrestricted
    #[serde(default)]
    pub allowed_domains: Vec<String>,
}

/// One selector/action entry in a script's pipeline
///
/// Rules are evaluated in declaration order against every visited page.
/// Order matters: multiple rules may match overlapping elements and columns
/// accumulate values in rule order.
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    /// CSS selector matched against the page
    pub selector: String,

    /// What to do with each matched element
    pub action: Action,

    /// Element attribute to read, or "text" for trimmed text content
    pub attr: String,

    /// Destination column; required when `action` is `collect`
    #[serde(default)]
    pub column: Option<String>,

    /// Skip following a link that resolves to the page being processed
    #[serde(default)]
    pub visit_once: bool,
}

impl Rule {
    /// Whether this rule reads the text sentinel rather than an attribute
    pub fn reads_text(&self) -> bool {
        self.attr == TEXT_ATTRIBUTE
    }
}

/// Pipeline rule actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Resolve the element's attribute as a link and schedule a fetch
    Follow,
    /// Append the extracted value to a named column
    Collect,
}

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    /// Conventional file extension for the format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl Script {
    /// The effective user agent, falling back to the default
    pub fn user_agent(&self) -> &str {
        self.main.user_agent.as_deref().unwrap_or(crate::script::DEFAULT_USER_AGENT)
    }
}
