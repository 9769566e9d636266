//! Typed builders for Notion property payloads.
//!
//! Each helper produces the JSON value for one property slot, so the
//! record writer composes pages without hand-writing nested JSON.

use serde_json::{json, Value};

use mhub_models::split_names;

/// Title property.
pub fn title(text: &str) -> Value {
    json!({ "title": [{ "text": { "content": text } }] })
}

/// Rich-text property.
pub fn rich_text(text: &str) -> Value {
    json!({ "rich_text": [{ "text": { "content": text } }] })
}

/// Date property from a `YYYY-MM-DD` string.
pub fn date(start: &str) -> Value {
    json!({ "date": { "start": start } })
}

/// Select property.
pub fn select(name: &str) -> Value {
    json!({ "select": { "name": name } })
}

/// Status property.
pub fn status(name: &str) -> Value {
    json!({ "status": { "name": name } })
}

/// Relation property pointing at one page.
pub fn relation(page_id: &str) -> Value {
    json!({ "relation": [{ "id": page_id }] })
}

/// Multi-select property from explicit option names.
pub fn multi_select(names: &[String]) -> Value {
    let options: Vec<Value> = names.iter().map(|n| json!({ "name": n })).collect();
    json!({ "multi_select": options })
}

/// Multi-select property from a free-text name list.
///
/// Tolerates ASCII and ideographic comma separators, the same split the
/// generation output uses for multi-assignee actions.
pub fn multi_select_from_text(input: &str) -> Value {
    multi_select(&split_names(input))
}
