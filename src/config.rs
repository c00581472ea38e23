//! Scroll spy configuration.
//!
//! Every field has a default matching the conventional documentation page
//! layout (`.toc` sidebar, `.post-content` article body, a sticky header
//! roughly 100px tall), so an empty JSON object is a valid configuration.

use serde::Deserialize;

use crate::dom::select;
use crate::error::{Error, Result};

/// Heading levels tracked inside the content region.
const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Selectors and pixel constants driving the scroll spy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpyConfig {
    /// Selector for the TOC container (first match wins).
    pub toc_selector: String,
    /// Selector for the collapsible wrapper inside the TOC that is forced open.
    pub expandable_selector: String,
    /// Selector for TOC links, scoped to the TOC container.
    pub link_selector: String,
    /// Selector for the content region holding the tracked headings.
    pub content_selector: String,
    /// Class toggled on the active TOC link.
    pub active_class: String,
    /// Pixels added to the scroll offset before matching headings.
    pub lookahead: f64,
    /// Pixels left above a heading when navigating to it from the TOC.
    pub click_offset: f64,
    /// Minimum viewport width at which the TOC panel follows the active link.
    pub desktop_min_width: f64,
    /// Distance from the TOC panel edges at which the active link is scrolled into view.
    pub edge_margin: f64,
}

impl Default for SpyConfig {
    fn default() -> Self {
        Self {
            toc_selector: ".toc".to_string(),
            expandable_selector: "details".to_string(),
            link_selector: "a".to_string(),
            content_selector: ".post-content".to_string(),
            active_class: "active".to_string(),
            lookahead: 120.0,
            click_offset: 100.0,
            desktop_min_width: 1280.0,
            edge_margin: 20.0,
        }
    }
}

impl SpyConfig {
    /// Selector list matching headings with an `id` inside the content region.
    ///
    /// ```
    /// use tocspy::SpyConfig;
    ///
    /// let config = SpyConfig::default();
    /// assert!(config.heading_selector().starts_with(".post-content h1[id], "));
    /// ```
    pub fn heading_selector(&self) -> String {
        HEADING_TAGS
            .iter()
            .map(|tag| format!("{} {tag}[id]", self.content_selector))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Check pixel constants and compile every selector once.
    pub fn validate(&self) -> Result<()> {
        let lengths = [
            ("lookahead", self.lookahead),
            ("click_offset", self.click_offset),
            ("desktop_min_width", self.desktop_min_width),
            ("edge_margin", self.edge_margin),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if self.active_class.is_empty() || self.active_class.contains(char::is_whitespace) {
            return Err(Error::InvalidConfig(format!(
                "active_class must be a single class name, got {:?}",
                self.active_class
            )));
        }

        for selector in [
            self.toc_selector.as_str(),
            self.expandable_selector.as_str(),
            self.link_selector.as_str(),
            &self.heading_selector(),
        ] {
            select::compile(selector)?;
        }

        Ok(())
    }

    /// Parse a JSON configuration and validate it.
    #[cfg(feature = "cli")]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file and validate it.
    #[cfg(feature = "cli")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SpyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_heading_selector_covers_all_levels() {
        let config = SpyConfig {
            content_selector: "main".to_string(),
            ..SpyConfig::default()
        };
        let selector = config.heading_selector();
        for level in 1..=6 {
            assert!(selector.contains(&format!("main h{level}[id]")));
        }
    }

    #[test]
    fn test_rejects_negative_lookahead() {
        let config = SpyConfig {
            lookahead: -1.0,
            ..SpyConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_nan_offset() {
        let config = SpyConfig {
            click_offset: f64::NAN,
            ..SpyConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_multi_word_class() {
        let config = SpyConfig {
            active_class: "is active".to_string(),
            ..SpyConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_bad_selector() {
        let config = SpyConfig {
            toc_selector: "..toc".to_string(),
            ..SpyConfig::default()
        };
        match config.validate() {
            Err(Error::InvalidSelector { selector }) => assert_eq!(selector, "..toc"),
            other => panic!("expected invalid selector, got {other:?}"),
        }
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_from_json_partial() {
        let config = SpyConfig::from_json(r#"{ "lookahead": 64, "active_class": "current" }"#)
            .expect("valid config");
        assert_eq!(config.lookahead, 64.0);
        assert_eq!(config.active_class, "current");
        assert_eq!(config.toc_selector, ".toc");
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_from_json_unknown_field() {
        assert!(matches!(
            SpyConfig::from_json(r#"{ "lookahed": 64 }"#),
            Err(Error::Json(_))
        ));
    }
}
