//! Per-turn "Conversation info" block.
//!
//! Carries everything that varies between messages of a chat. It is placed in
//! the user turn, after the cached prefix, and labelled untrusted so the model
//! reads it as data rather than instructions.

use serde_json::{Map, Value};
use skynet_core::{HistoryEntry, MessageContext, TimestampStyle};

use crate::options::InboundOptions;
use crate::render::{
    apply_rules, first_non_blank, flag, labeled_json_block, safe_trim, trimmed, FieldRule,
};
use crate::timestamp::format_epoch_millis;

pub const CONVERSATION_INFO_LABEL: &str = "Conversation info (untrusted metadata):";

static TURN_RULES: [FieldRule<InboundOptions>; 24] = [
    FieldRule {
        key: "conversation_label",
        // Direct chats are already identified by the stable routing block.
        derive: |ctx, _| {
            if ctx.is_direct() {
                None
            } else {
                trimmed(&ctx.conversation_label)
            }
        },
    },
    FieldRule {
        key: "message_id",
        derive: |ctx, _| trimmed(&ctx.message_sid),
    },
    FieldRule {
        key: "message_id_full",
        derive: |ctx, _| {
            let full = safe_trim(ctx.message_sid_full.as_deref())?;
            if Some(full) == safe_trim(ctx.message_sid.as_deref()) {
                return None;
            }
            Some(Value::String(full.to_string()))
        },
    },
    FieldRule {
        key: "reply_to_id",
        derive: |ctx, _| trimmed(&ctx.reply_to_id),
    },
    FieldRule {
        key: "sender_id",
        derive: |ctx, _| trimmed(&ctx.sender_id),
    },
    FieldRule {
        key: "sender",
        derive: |ctx, _| {
            first_non_blank(&[ctx.sender_e164.as_deref(), ctx.sender_id.as_deref()])
                .map(|s| Value::String(s.to_string()))
        },
    },
    FieldRule {
        key: "group_subject",
        derive: |ctx, _| trimmed(&ctx.group_subject),
    },
    FieldRule {
        key: "group_channel",
        derive: |ctx, _| trimmed(&ctx.group_channel),
    },
    FieldRule {
        key: "group_space",
        derive: |ctx, _| trimmed(&ctx.group_space),
    },
    FieldRule {
        key: "thread_label",
        derive: |ctx, _| trimmed(&ctx.thread_label),
    },
    FieldRule {
        key: "is_forum",
        derive: |ctx, _| flag(ctx.is_forum),
    },
    FieldRule {
        key: "was_mentioned",
        derive: |ctx, _| flag(ctx.was_mentioned),
    },
    FieldRule {
        key: "reply_to_body",
        derive: |ctx, _| trimmed(&ctx.reply_to_body),
    },
    FieldRule {
        key: "reply_to_sender",
        derive: |ctx, _| trimmed(&ctx.reply_to_sender),
    },
    FieldRule {
        key: "reply_to_is_quote",
        derive: |ctx, _| {
            if has_reply_lineage(ctx) {
                flag(ctx.reply_to_is_quote)
            } else {
                None
            }
        },
    },
    FieldRule {
        key: "forwarded_from",
        derive: |ctx, _| trimmed(&ctx.forwarded_from),
    },
    FieldRule {
        key: "forwarded_from_type",
        derive: |ctx, _| forwarded(ctx, &ctx.forwarded_from_type),
    },
    FieldRule {
        key: "forwarded_from_username",
        derive: |ctx, _| forwarded(ctx, &ctx.forwarded_from_username),
    },
    FieldRule {
        key: "forwarded_from_title",
        derive: |ctx, _| forwarded(ctx, &ctx.forwarded_from_title),
    },
    FieldRule {
        key: "forwarded_from_signature",
        derive: |ctx, _| forwarded(ctx, &ctx.forwarded_from_signature),
    },
    FieldRule {
        key: "forwarded_from_chat_type",
        derive: |ctx, _| forwarded(ctx, &ctx.forwarded_from_chat_type),
    },
    FieldRule {
        key: "forwarded_date",
        derive: |ctx, opts| {
            if !has_forward_source(ctx) {
                return None;
            }
            let millis = ctx.forwarded_date?;
            format_epoch_millis(millis, opts.timestamp_style).map(Value::String)
        },
    },
    FieldRule {
        key: "thread_starter_body",
        derive: |ctx, _| trimmed(&ctx.thread_starter_body),
    },
    FieldRule {
        key: "history",
        derive: |ctx, opts| {
            ctx.inbound_history
                .as_deref()
                .and_then(|entries| history(entries, opts))
        },
    },
];

/// Reply body and sender travel together with the quote flag.
fn has_reply_lineage(ctx: &MessageContext) -> bool {
    safe_trim(ctx.reply_to_body.as_deref()).is_some()
        || safe_trim(ctx.reply_to_sender.as_deref()).is_some()
}

fn has_forward_source(ctx: &MessageContext) -> bool {
    safe_trim(ctx.forwarded_from.as_deref()).is_some()
}

/// Forwarding detail, only alongside a named forwarding source.
fn forwarded(ctx: &MessageContext, value: &Option<String>) -> Option<Value> {
    if has_forward_source(ctx) {
        trimmed(value)
    } else {
        None
    }
}

fn history(entries: &[HistoryEntry], opts: &InboundOptions) -> Option<Value> {
    let start = opts
        .history_limit
        .map_or(0, |limit| entries.len().saturating_sub(limit));
    let items: Vec<Value> = entries[start..]
        .iter()
        .filter_map(|entry| history_item(entry, opts.timestamp_style))
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(Value::Array(items))
    }
}

/// One rendered entry; `None` when both sender and body are blank.
fn history_item(entry: &HistoryEntry, style: TimestampStyle) -> Option<Value> {
    let sender = safe_trim(Some(entry.sender.as_str()));
    let body = safe_trim(Some(entry.body.as_str()));
    if sender.is_none() && body.is_none() {
        return None;
    }
    let mut item = Map::new();
    if let Some(sender) = sender {
        item.insert("sender".into(), Value::String(sender.to_string()));
    }
    if let Some(ts) = format_epoch_millis(entry.timestamp, style) {
        item.insert("timestamp".into(), Value::String(ts));
    }
    if let Some(body) = body {
        item.insert("body".into(), Value::String(body.to_string()));
    }
    Some(Value::Object(item))
}

/// Builds the per-turn metadata block for the user message.
#[derive(Debug, Clone, Default)]
pub struct TurnContextFormatter {
    options: InboundOptions,
}

impl TurnContextFormatter {
    pub fn new(options: InboundOptions) -> Self {
        Self { options }
    }

    /// Every rule evaluated once, keys in render order.
    pub fn payload(&self, ctx: &MessageContext) -> Map<String, Value> {
        apply_rules(&TURN_RULES, ctx, &self.options)
    }

    /// Label line plus fenced JSON, or `""` when there is nothing to say.
    /// Callers omit the section entirely on `""`.
    pub fn format(&self, ctx: &MessageContext) -> String {
        labeled_json_block(CONVERSATION_INFO_LABEL, self.payload(ctx))
    }

    /// Keys this formatter can ever emit, in render order.
    pub fn keys() -> impl Iterator<Item = &'static str> {
        TURN_RULES.iter().map(|rule| rule.key)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
