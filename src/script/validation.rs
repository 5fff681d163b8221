use crate::script::types::{Action, MainConfig, Rule, Script};
use crate::ScriptError;
use scraper::Selector;
use url::Url;

/// Validates an entire script
///
/// Structural problems (unknown actions, missing sections) are caught by the
/// TOML deserializer; this pass covers the semantic rules: the entry URL must
/// be absolute, every selector must compile, and a `collect` rule must name a
/// destination column.
pub fn validate(script: &Script) -> Result<(), ScriptError> {
    validate_main(&script.main)?;

    for rule in &script.pipeline {
        validate_rule(rule)?;
    }

    Ok(())
}

/// Validates the `[main]` section
fn validate_main(main: &MainConfig) -> Result<(), ScriptError> {
    let url = Url::parse(&main.url)
        .map_err(|e| ScriptError::InvalidUrl(format!("{}: {}", main.url, e)))?;

    if url.host_str().is_none() {
        return Err(ScriptError::InvalidUrl(format!(
            "{} has no host",
            main.url
        )));
    }

    if main.file.is_empty() {
        return Err(ScriptError::Validation(
            "main.file cannot be empty".to_string(),
        ));
    }

    if let Some(ua) = &main.user_agent {
        if ua.is_empty() {
            return Err(ScriptError::Validation(
                "main.user_agent cannot be empty when set".to_string(),
            ));
        }
    }

    for domain in &main.allowed_domains {
        if domain.is_empty() {
            return Err(ScriptError::Validation(
                "allowed_domains entries cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates a single pipeline rule
fn validate_rule(rule: &Rule) -> Result<(), ScriptError> {
    if rule.selector.is_empty() {
        return Err(ScriptError::Validation(
            "rule selector cannot be empty".to_string(),
        ));
    }

    // Compile once here so a bad selector fails at load time rather than
    // on the first page
    Selector::parse(&rule.selector).map_err(|e| ScriptError::InvalidSelector {
        selector: rule.selector.clone(),
        message: e.to_string(),
    })?;

    if rule.attr.is_empty() {
        return Err(ScriptError::Validation(format!(
            "rule {:?} has an empty attr",
            rule.selector
        )));
    }

    match rule.action {
        Action::Collect => {
            let has_column = rule
                .column
                .as_ref()
                .map(|c| !c.is_empty())
                .unwrap_or(false);
            if !has_column {
                return Err(ScriptError::Validation(format!(
                    "collect rule {:?} is missing a column",
                    rule.selector
                )));
            }
        }
        Action::Follow => {
            if rule.reads_text() {
                return Err(ScriptError::Validation(format!(
                    "follow rule {:?} cannot use the \"text\" sentinel, it needs a link attribute",
                    rule.selector
                )));
            }
        }
    }

    Ok(())
}
