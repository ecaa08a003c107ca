//! Document Assembler - Composite preview document and its error bridge.
//!
//! [`assemble`] is a pure function of the markup text and the current style
//! and script handles. The produced document links the stylesheet, embeds
//! the markup verbatim, installs an error bridge and loads the script as a
//! module.
//!
//! The error bridge forwards uncaught errors from the sandboxed preview to
//! the host as a structured message:
//!
//! ```text
//! { "type": "error", "message": "...", "line": 3, "column": 7, "stack": ["..."] }
//! ```
//!
//! [`PreviewMessage::from_json`] parses that message on the host side.

use serde::{Deserialize, Serialize};

use crate::error::{BinError, Result};
use crate::resource::ResourceHandle;

/// Script installed before the user script. Runs inside the preview.
pub const ERROR_BRIDGE: &str = r#"window.onerror = function (message, file, line, column, error) {
  window.top.postMessage({
    type: 'error',
    message: String(message),
    line: line || 0,
    column: column || 0,
    stack: error && error.stack ? String(error.stack).split('\n') : []
  }, '*');
};"#;

/// Build the composite preview document.
pub fn assemble(markup: &str, style: &ResourceHandle, script: &ResourceHandle) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <link rel="stylesheet" href="{style}">
  </head>
  <body>
{markup}
    <script>
{ERROR_BRIDGE}
    </script>
    <script type="module" src="{script}"></script>
  </body>
</html>
"#
    )
}

// =============================================================================
// BRIDGE MESSAGES
// =============================================================================

/// An uncaught script error reported by the preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptError {
    #[serde(alias = "msg")]
    pub message: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default, alias = "col")]
    pub column: u32,
    #[serde(default)]
    pub stack: Vec<String>,
}

/// Messages the preview posts to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PreviewMessage {
    Error(ScriptError),
}

impl PreviewMessage {
    /// Parse a message received from the preview.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(BinError::Message)
    }

    /// Encode as the preview would.
    pub fn to_json(&self) -> String {
        // Serializing plain strings and integers cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_embeds_parts_in_order() {
        let style = ResourceHandle::new("blob:style");
        let script = ResourceHandle::new("blob:script");
        let doc = assemble("<p id=\"hello\">hi</p>", &style, &script);

        let link = doc.find(r#"href="blob:style""#).unwrap();
        let body = doc.find(r#"<p id="hello">hi</p>"#).unwrap();
        let bridge = doc.find("window.onerror").unwrap();
        let module = doc.find(r#"<script type="module" src="blob:script">"#).unwrap();

        assert!(link < body);
        assert!(body < bridge);
        assert!(bridge < module);
        assert!(doc.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_markup_is_verbatim() {
        let markup = "<div>&amp; {braces} \"quotes\"</div>";
        let doc = assemble(markup, &ResourceHandle::new("s"), &ResourceHandle::new("j"));
        assert!(doc.contains(markup));
    }

    #[test]
    fn test_parse_error_message() {
        let raw = r#"{"type":"error","message":"x is not defined","line":3,"column":7,"stack":["ReferenceError: x is not defined","    at blob:spark-bin/1:3:7"]}"#;
        let PreviewMessage::Error(err) = PreviewMessage::from_json(raw).unwrap();

        assert_eq!(err.message, "x is not defined");
        assert_eq!(err.line, 3);
        assert_eq!(err.column, 7);
        assert_eq!(err.stack.len(), 2);
    }

    #[test]
    fn test_parse_legacy_keys() {
        let raw = r#"{"type":"error","msg":"boom","line":1,"col":2,"stack":[]}"#;
        let PreviewMessage::Error(err) = PreviewMessage::from_json(raw).unwrap();
        assert_eq!(err.message, "boom");
        assert_eq!(err.column, 2);
    }

    #[test]
    fn test_round_trip_shape() {
        let msg = PreviewMessage::Error(ScriptError {
            message: "bad".into(),
            line: 1,
            column: 1,
            stack: vec![],
        });
        let json: serde_json::Value = serde_json::from_str(&msg.to_json()).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "bad");
    }

    #[test]
    fn test_unknown_message_type_is_rejected() {
        let err = PreviewMessage::from_json(r#"{"type":"log","message":"hi"}"#).unwrap_err();
        assert!(matches!(err, BinError::Message(_)));
    }
}
