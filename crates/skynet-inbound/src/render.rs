//! Shared helpers: blank detection, trimming, and fenced JSON blocks.

use serde_json::{Map, Value};
use skynet_core::MessageContext;

/// One output key and how to derive it from the message context.
///
/// `derive` returns `None` when the key must be left out. Rules run in table
/// order, which is also the key order of the rendered JSON.
pub(crate) struct FieldRule<C> {
    pub key: &'static str,
    pub derive: fn(&MessageContext, &C) -> Option<Value>,
}

/// Evaluate `rules` once against `ctx`, keeping only the keys that derived a value.
pub(crate) fn apply_rules<C>(
    rules: &[FieldRule<C>],
    ctx: &MessageContext,
    cfg: &C,
) -> Map<String, Value> {
    let mut map = Map::new();
    for rule in rules {
        if let Some(value) = (rule.derive)(ctx, cfg) {
            map.insert(rule.key.to_string(), value);
        }
    }
    map
}

/// Trimmed value, or `None` when absent or blank.
pub fn safe_trim(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// First candidate that is non-blank after trimming, trimmed.
pub fn first_non_blank<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates.iter().find_map(|c| safe_trim(*c))
}

/// Trimmed string field as a JSON value; blank or absent yields `None`.
pub(crate) fn trimmed(value: &Option<String>) -> Option<Value> {
    safe_trim(value.as_deref()).map(|s| Value::String(s.to_string()))
}

/// Flag as a JSON value, only when the adapter set it explicitly.
pub(crate) fn flag(value: Option<bool>) -> Option<Value> {
    value.map(Value::Bool)
}

/// Pretty-printed JSON inside a ```` ```json ```` fence.
///
/// Backticks can only occur inside JSON strings, so every one of them is
/// escaped as `\u0060`. Data can then never close the fence early, and the
/// block still parses back to the same value.
pub fn fenced_json(value: &Value) -> String {
    let body = format!("{:#}", value).replace('`', "\\u0060");
    format!("```json\n{}\n```", body)
}

/// `label` on its own line followed by the fenced object.
/// An empty object renders as the empty string.
pub fn labeled_json_block(label: &str, map: Map<String, Value>) -> String {
    if map.is_empty() {
        return String::new();
    }
    format!("{}\n{}", label, fenced_json(&Value::Object(map)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
