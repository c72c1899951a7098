//! Embed snippet template with a single `$URL` placeholder.

use crate::config::ConfigError;

/// Token replaced by the preview URL.
pub const URL_PLACEHOLDER: &str = "$URL";

/// Template text read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetTemplate {
    text: String,
}

impl SnippetTemplate {
    /// Accept a template that contains the placeholder.
    pub fn parse(text: impl Into<String>) -> Result<Self, ConfigError> {
        let text = text.into();
        if !text.contains(URL_PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder);
        }
        Ok(Self { text })
    }

    /// Substitute the URL for the first placeholder, literally.
    pub fn render(&self, url: &str) -> String {
        self.text.replacen(URL_PLACEHOLDER, url, 1)
    }
}
