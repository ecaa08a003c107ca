//! Tabs - Which pane the compact layout shows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// A selectable pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Markup,
    Style,
    Script,
    Preview,
}

/// Edit tab selected when nothing else is asked for, and the one the layout
/// falls back to when the preview tab stops being legal.
pub const DEFAULT_TAB: Tab = Tab::Script;

impl Tab {
    /// The three source tabs, in tab-strip order.
    pub const EDITORS: [Tab; 3] = [Tab::Markup, Tab::Style, Tab::Script];

    pub fn is_editor(self) -> bool {
        !matches!(self, Tab::Preview)
    }

    /// Short language name used in class names.
    pub fn lang(self) -> &'static str {
        match self {
            Tab::Markup => "html",
            Tab::Style => "css",
            Tab::Script => "js",
            Tab::Preview => "preview",
        }
    }

    /// Tab-strip label.
    pub fn label(self) -> &'static str {
        match self {
            Tab::Markup => "html",
            Tab::Style => "css",
            Tab::Script => "javascript",
            Tab::Preview => "preview",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tab::Markup => "markup",
            Tab::Style => "style",
            Tab::Script => "script",
            Tab::Preview => "preview",
        };
        f.write_str(name)
    }
}

/// Returned when a tab name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTab(pub String);

impl FromStr for Tab {
    type Err = UnknownTab;

    /// Accepts the canonical names and the `html`/`css`/`js` aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markup" | "html" => Ok(Tab::Markup),
            "style" | "css" => Ok(Tab::Style),
            "script" | "js" | "javascript" => Ok(Tab::Script),
            "preview" => Ok(Tab::Preview),
            _ => Err(UnknownTab(s.to_owned())),
        }
    }
}

impl<'de> Deserialize<'de> for Tab {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|UnknownTab(name)| serde::de::Error::custom(format!("unknown tab `{name}`")))
    }
}

// =============================================================================
// Tests
// =============================================================================
