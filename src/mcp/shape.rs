//! Pure transforms between Zoho responses and MCP content.

use base64::Engine as _;
use rmcp::model::Content;
use serde_json::{Map, Value};

use crate::client::{BinaryContent, Endpoint};

/// Fields kept when a list is summarised.
const SUMMARY_FIELDS: &[&str] = &[
    "id",
    "name",
    "status",
    "prefix",
    "key",
    "owner",
    "start_date",
    "end_date",
    "priority",
    "percent_complete",
];

/// Add `page` / `per_page` query pairs when present.
pub fn paginate(mut endpoint: Endpoint, page: Option<u32>, per_page: Option<u32>) -> Endpoint {
    if let Some(page) = page {
        endpoint = endpoint.query("page", page);
    }
    if let Some(per_page) = per_page {
        endpoint = endpoint.query("per_page", per_page);
    }
    endpoint
}

/// Reduce every record in a list response to [`SUMMARY_FIELDS`].
///
/// Handles both a bare array and an object whose array-valued fields hold the records
/// (`{"tasks": [...], "page_info": {...}}`). Non-array fields pass through.
pub fn project_minimal(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(summarize).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(k, v)| match v {
                    Value::Array(items) => {
                        (k, Value::Array(items.into_iter().map(summarize).collect()))
                    }
                    other => (k, other),
                })
                .collect(),
        ),
        other => other,
    }
}

fn summarize(record: Value) -> Value {
    match record {
        Value::Object(fields) => {
            let kept: Map<String, Value> = fields
                .into_iter()
                .filter(|(k, _)| SUMMARY_FIELDS.contains(&k.as_str()))
                .collect();
            Value::Object(kept)
        }
        other => other,
    }
}

/// Render a JSON result as text content. A null body (e.g. 204) becomes `done_message`.
pub fn json_content(value: &Value, done_message: &str) -> Result<Content, serde_json::Error> {
    if value.is_null() {
        return Ok(Content::text(done_message));
    }
    Ok(Content::text(serde_json::to_string_pretty(value)?))
}

/// Convert downloaded bytes into MCP content.
pub fn binary_content(binary: BinaryContent) -> Content {
    let mime = binary
        .content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime.starts_with("image/") {
        let data = base64::engine::general_purpose::STANDARD.encode(&binary.bytes);
        return Content::image(data, mime);
    }

    if is_textual(&mime) {
        if let Ok(text) = String::from_utf8(binary.bytes.clone()) {
            return Content::text(text);
        }
    }

    let data = base64::engine::general_purpose::STANDARD.encode(&binary.bytes);
    let summary = serde_json::json!({
        "content_type": mime,
        "size": binary.bytes.len(),
        "base64": data,
    });
    Content::text(summary.to_string())
}

fn is_textual(mime: &str) -> bool {
    mime.starts_with("text/")
        || matches!(
            mime,
            "application/json" | "application/xml" | "application/javascript"
        )
}
