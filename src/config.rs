//! Config - Construction input for a widget.
//!
//! [`BinConfig`] can be built in code with the `with_*` methods or
//! deserialized from the JSON object a host passes in. Every field is
//! optional and lenient: bad values degrade to defaults with a warning,
//! they never fail construction.
//!
//! ```text
//! {
//!   "container": "#playground",
//!   "sources": { "html": "<p>hi</p>", "css": "p { color: red }", "js": "" },
//!   "split": "0.6",
//!   "width": "100%",
//!   "height": "420px",
//!   "initialTab": "css",
//!   "splitMode": false,
//!   "debounceMs": 1000
//! }
//! ```

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::error::{BinError, Result};
use crate::state::{Tab, DEFAULT_SPLIT, DEFAULT_TAB};

/// Placeholder markup when none is given.
pub const DEFAULT_MARKUP: &str = "<!-- html goes here -->\n";
/// Placeholder style when none is given.
pub const DEFAULT_STYLE: &str = "/* css goes here */\n";
/// Placeholder script when none is given.
pub const DEFAULT_SCRIPT: &str = "// js goes here";
/// Quiet window before a preview is republished.
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Initial source texts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Sources {
    #[serde(alias = "html", deserialize_with = "lenient")]
    pub markup: Option<String>,
    #[serde(alias = "css", deserialize_with = "lenient")]
    pub style: Option<String>,
    #[serde(alias = "js", deserialize_with = "lenient")]
    pub script: Option<String>,
}

impl Sources {
    pub fn markup(&self) -> &str {
        self.markup.as_deref().unwrap_or(DEFAULT_MARKUP)
    }

    pub fn style(&self) -> &str {
        self.style.as_deref().unwrap_or(DEFAULT_STYLE)
    }

    pub fn script(&self) -> &str {
        self.script.as_deref().unwrap_or(DEFAULT_SCRIPT)
    }

    /// Text for one editor tab. The preview has no source.
    pub fn for_tab(&self, tab: Tab) -> Option<&str> {
        match tab {
            Tab::Markup => Some(self.markup()),
            Tab::Style => Some(self.style()),
            Tab::Script => Some(self.script()),
            Tab::Preview => None,
        }
    }
}

/// Split ratio as given: hosts pass numbers or attribute strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SplitInput {
    Number(f64),
    Text(String),
}

/// Widget construction options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BinConfig {
    /// Mount point understood by the host surface. Without one the caller
    /// attaches the root itself and calls `start()`.
    #[serde(deserialize_with = "lenient")]
    pub container: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub sources: Sources,
    #[serde(deserialize_with = "lenient")]
    pub split: Option<SplitInput>,
    /// Applied verbatim as `--bin-width`.
    #[serde(deserialize_with = "lenient")]
    pub width: Option<String>,
    /// Applied verbatim as `--bin-height`.
    #[serde(deserialize_with = "lenient")]
    pub height: Option<String>,
    #[serde(deserialize_with = "lenient_tab")]
    pub initial_tab: Option<Tab>,
    /// Always use the compact layout.
    #[serde(deserialize_with = "lenient")]
    pub split_mode: bool,
    #[serde(deserialize_with = "lenient_debounce")]
    pub debounce_ms: u64,
}

impl Default for BinConfig {
    fn default() -> Self {
        Self {
            container: None,
            sources: Sources::default(),
            split: None,
            width: None,
            height: None,
            initial_tab: None,
            split_mode: false,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl BinConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON configuration object. Only malformed JSON (or a
    /// non-object) is an error; individual bad fields degrade.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(BinError::Config)
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.sources.markup = Some(markup.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.sources.style = Some(style.into());
        self
    }

    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.sources.script = Some(script.into());
        self
    }

    pub fn with_split(mut self, split: f64) -> Self {
        self.split = Some(SplitInput::Number(split));
        self
    }

    pub fn with_size(mut self, width: impl Into<String>, height: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self.height = Some(height.into());
        self
    }

    pub fn with_initial_tab(mut self, tab: Tab) -> Self {
        self.initial_tab = Some(tab);
        self
    }

    pub fn with_split_mode(mut self, split_mode: bool) -> Self {
        self.split_mode = split_mode;
        self
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Initial split ratio (unclamped), [`DEFAULT_SPLIT`] when missing,
    /// unparsable or zero.
    pub fn split_ratio(&self) -> f64 {
        let parsed = match &self.split {
            None => return DEFAULT_SPLIT,
            Some(SplitInput::Number(n)) => Some(*n),
            Some(SplitInput::Text(text)) => parse_float_prefix(text),
        };
        match parsed {
            Some(ratio) if ratio.is_finite() && ratio != 0.0 => ratio,
            _ => {
                warn!(split = ?self.split, "unusable split ratio, using default");
                DEFAULT_SPLIT
            }
        }
    }

    pub fn initial_tab(&self) -> Tab {
        self.initial_tab.unwrap_or(DEFAULT_TAB)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Parse the longest numeric prefix of `text` after leading whitespace
/// (`"0.6abc"` gives 0.6, `".5"` gives 0.5, `"abc"` gives `None`).
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when it has digits.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    text[..end].parse().ok()
}

// =============================================================================
// LENIENT FIELDS
// =============================================================================

/// Read any JSON value, keep it if it has the field's type, otherwise
/// warn and fall back to `None`.
fn lenient_value<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    match T::deserialize(&value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            warn!(%value, %err, "mistyped config field, using default");
            Ok(None)
        }
    }
}

fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient_value(deserializer)?.unwrap_or_default())
}

fn lenient_debounce<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    Ok(lenient_value(deserializer)?.unwrap_or(DEFAULT_DEBOUNCE_MS))
}

fn lenient_tab<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<Tab>, D::Error> {
    let raw: Option<String> = lenient(deserializer)?;
    Ok(raw.and_then(|name| match name.parse() {
        Ok(tab) => Some(tab),
        Err(_) => {
            warn!(tab = %name, "unknown initial tab, using default");
            None
        }
    }))
}

// =============================================================================
// Tests
// =============================================================================
