//! Response bodies for call results and failures

use serde::Serialize;

use crate::service::{CallError, CallOutcome};

/// JSON view of a completed call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallResponse {
    pub contract: String,
    pub signature: String,
    pub selector: String,
    pub calldata: String,
    pub result: String,
}

impl From<&CallOutcome> for CallResponse {
    fn from(outcome: &CallOutcome) -> Self {
        Self {
            contract: outcome.contract.to_checksum(None),
            signature: outcome.signature.canonical(),
            selector: outcome.signature.selector_hex(),
            calldata: outcome.payload.to_string(),
            result: outcome.result_hex(),
        }
    }
}

/// JSON view of a failed call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub kind: &'static str,
    pub description: String,
}

impl From<&CallError> for ErrorResponse {
    fn from(error: &CallError) -> Self {
        Self {
            kind: error.kind(),
            description: error.to_string(),
        }
    }
}

pub fn outcome_page(outcome: &CallOutcome) -> String {
    let view = CallResponse::from(outcome);
    page(
        "contract call",
        &format!(
            r#"<dl>
  <dt>contract</dt><dd><code>{}</code></dd>
  <dt>signature</dt><dd><code>{}</code></dd>
  <dt>selector</dt><dd><code>{}</code></dd>
  <dt>calldata</dt><dd><code>{}</code></dd>
  <dt>result</dt><dd><code>{}</code></dd>
</dl>"#,
            view.contract,
            escape_html(&view.signature),
            view.selector,
            view.calldata,
            view.result,
        ),
    )
}

pub fn error_page(error: &ErrorResponse) -> String {
    page(
        "call failed",
        &format!(
            "<p><strong>{}</strong></p>\n<p>{}</p>",
            error.kind,
            escape_html(&error.description)
        ),
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/normalize/8.0.1/normalize.min.css">
<title>{title}</title>
</head>
<body>
<div>
{body}
</div>
</body>
</html>
"#
    )
}

/// Error messages echo raw parameters back, so they must be escaped.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
