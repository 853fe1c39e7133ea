//! "Sender" block: the display identity of whoever wrote the current message.
//!
//! Separate from conversation info so the opaque platform id (`sender_id`)
//! and the human-facing names never share a key namespace.

use serde_json::{Map, Value};
use skynet_core::MessageContext;

use crate::render::{apply_rules, labeled_json_block, safe_trim, trimmed, FieldRule};

pub const SENDER_LABEL: &str = "Sender (untrusted metadata):";

static SENDER_RULES: [FieldRule<()>; 5] = [
    FieldRule {
        key: "label",
        derive: |ctx, _| sender_label(ctx).map(Value::String),
    },
    FieldRule {
        key: "name",
        derive: |ctx, _| trimmed(&ctx.sender_name),
    },
    FieldRule {
        key: "username",
        derive: |ctx, _| trimmed(&ctx.sender_username),
    },
    FieldRule {
        key: "tag",
        derive: |ctx, _| trimmed(&ctx.sender_tag),
    },
    FieldRule {
        key: "e164",
        derive: |ctx, _| trimmed(&ctx.sender_e164),
    },
];

/// `Name (@username)`, else `Name (+15551234567)`, else just the name.
fn sender_label(ctx: &MessageContext) -> Option<String> {
    let name = safe_trim(ctx.sender_name.as_deref())?;
    let handle = safe_trim(ctx.sender_username.as_deref())
        .map(|u| format!("@{}", u.trim_start_matches('@')))
        .or_else(|| safe_trim(ctx.sender_e164.as_deref()).map(String::from));
    Some(match handle {
        Some(handle) => format!("{} ({})", name, handle),
        None => name.to_string(),
    })
}

/// Builds the per-turn sender identity block.
pub struct SenderProfileFormatter;

impl SenderProfileFormatter {
    pub fn payload(ctx: &MessageContext) -> Map<String, Value> {
        apply_rules(&SENDER_RULES, ctx, &())
    }

    /// Label line plus fenced JSON, or `""` when no display field is present.
    pub fn format(ctx: &MessageContext) -> String {
        labeled_json_block(SENDER_LABEL, Self::payload(ctx))
    }
}
