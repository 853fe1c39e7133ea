// Contract tests for the rendered prompt fragments.
// The stable block feeds the prompt cache: any per-turn value leaking into
// it turns every message into a cache miss.

use serde_json::{json, Value};
use skynet_core::{HistoryEntry, MessageContext};
use skynet_inbound::{
    InboundBlocks, InboundOptions, StableIdentityFormatter, TurnContextFormatter,
    CONVERSATION_INFO_LABEL, INBOUND_META_SCHEMA, STABLE_KEYS,
};

fn json_block(text: &str, after: &str) -> Value {
    let start = text.find(after).expect("marker present") + after.len();
    let rest = &text[start..];
    let open = rest.find("```json\n").expect("opening fence") + "```json\n".len();
    let close = rest[open..].find("\n```").expect("closing fence");
    serde_json::from_str(&rest[open..open + close]).expect("valid json")
}

fn inbound_meta(text: &str) -> Value {
    json_block(text, "")
}

fn conversation_info(text: &str) -> Value {
    json_block(text, &format!("{}\n", CONVERSATION_INFO_LABEL))
}

fn turn(ctx: &MessageContext) -> String {
    TurnContextFormatter::default().format(ctx)
}

fn telegram_direct() -> MessageContext {
    MessageContext {
        originating_to: Some("telegram:5494292670".into()),
        originating_channel: Some("telegram".into()),
        provider: Some("telegram".into()),
        surface: Some("telegram".into()),
        chat_type: Some("direct".into()),
        ..Default::default()
    }
}

fn full_group_context() -> MessageContext {
    MessageContext {
        originating_to: Some("telegram:-1001249586642".into()),
        originating_channel: Some("telegram".into()),
        provider: Some("telegram".into()),
        surface: Some("telegram".into()),
        chat_type: Some("group".into()),
        message_sid: Some("msg-12345".into()),
        message_sid_full: Some("telegram:msg-12345-full".into()),
        reply_to_id: Some("msg-12340".into()),
        sender_id: Some("289522496".into()),
        sender_name: Some("Wayne Low".into()),
        sender_username: Some("waynelow".into()),
        sender_tag: Some("Wayne Low#1234".into()),
        sender_e164: Some("+1234567890".into()),
        conversation_label: Some("dev-team".into()),
        group_subject: Some("OpenClaw Development".into()),
        group_channel: Some("#general".into()),
        group_space: Some("Engineering".into()),
        thread_label: Some("API discussion".into()),
        is_forum: Some(true),
        was_mentioned: Some(true),
        reply_to_body: Some("Can you check the API status?".into()),
        reply_to_sender: Some("Alice Chen".into()),
        reply_to_is_quote: Some(false),
        forwarded_from: Some("Bob Smith".into()),
        forwarded_from_type: Some("user".into()),
        forwarded_from_username: Some("bobsmith".into()),
        forwarded_from_title: Some("Tech Lead".into()),
        forwarded_from_signature: Some("Bob".into()),
        forwarded_from_chat_type: Some("private".into()),
        forwarded_date: Some(1_706_000_000_000),
        thread_starter_body: Some("Let's discuss the new API endpoints".into()),
        inbound_history: Some(vec![
            HistoryEntry {
                sender: "Alice Chen".into(),
                timestamp: 1_706_000_060_000,
                body: "I noticed the /health endpoint is slow".into(),
            },
            HistoryEntry {
                sender: "Bob Smith".into(),
                timestamp: 1_706_000_120_000,
                body: "Same here, latency is >2s".into(),
            },
            HistoryEntry {
                sender: "Wayne Low".into(),
                timestamp: 1_706_000_180_000,
                body: "Let me investigate".into(),
            },
        ]),
    }
}

// ---------------------------------------------------------------------------
// Stable block
// ---------------------------------------------------------------------------

#[test]
fn stable_block_carries_routing_fields() {
    let payload = inbound_meta(&StableIdentityFormatter::format(&telegram_direct()));

    assert_eq!(payload["schema"], INBOUND_META_SCHEMA);
    assert_eq!(payload["schema"], "openclaw.inbound_meta.v1");
    assert_eq!(payload["chat_id"], "telegram:5494292670");
    assert_eq!(payload["channel"], "telegram");
    assert_eq!(payload["chat_type"], "direct");

    let keys: Vec<&str> = payload.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, STABLE_KEYS);
}

#[test]
fn stable_block_has_exactly_one_fence() {
    let text = StableIdentityFormatter::format(&full_group_context());
    assert_eq!(text.matches("```json\n").count(), 1);
    assert_eq!(text.matches("```").count(), 2);
}

#[test]
fn stable_block_never_carries_per_turn_identifiers() {
    let mut ctx = telegram_direct();
    ctx.message_sid = Some("123".into());
    ctx.message_sid_full = Some("123".into());
    ctx.reply_to_id = Some("99".into());
    ctx.sender_id = Some("289522496".into());

    let text = StableIdentityFormatter::format(&ctx);
    let payload = inbound_meta(&text);
    for key in ["message_id", "message_id_full", "reply_to_id", "sender_id", "sender"] {
        assert!(payload.get(key).is_none(), "{key} leaked into stable block");
    }
    assert!(!text.contains("289522496"));
}

#[test]
fn stable_block_is_byte_identical_across_turns() {
    let baseline = StableIdentityFormatter::format(&full_group_context());

    let mut next = full_group_context();
    next.message_sid = Some("msg-99999".into());
    next.message_sid_full = Some("telegram:msg-99999-full".into());
    next.reply_to_id = None;
    next.sender_id = Some("777".into());
    next.sender_name = Some("Someone Else".into());
    next.sender_e164 = None;
    next.conversation_label = Some("renamed".into());
    next.was_mentioned = Some(false);
    next.reply_to_body = Some("different".into());
    next.forwarded_from = None;
    next.thread_starter_body = None;
    next.inbound_history = None;

    assert_eq!(StableIdentityFormatter::format(&next), baseline);
    assert_eq!(
        StableIdentityFormatter::format(&MessageContext {
            message_sid: Some("1".into()),
            ..telegram_direct()
        }),
        StableIdentityFormatter::format(&MessageContext {
            message_sid: Some("2".into()),
            ..telegram_direct()
        }),
    );
}

#[test]
fn stable_and_turn_keys_never_overlap() {
    for key in TurnContextFormatter::keys() {
        assert!(!STABLE_KEYS.contains(&key), "{key} in both blocks");
    }
}

#[test]
fn stable_block_omits_blank_sender_for_group() {
    let ctx = MessageContext {
        message_sid: Some("458".into()),
        sender_id: Some("   ".into()),
        originating_to: Some("telegram:-1001249586642".into()),
        originating_channel: Some("telegram".into()),
        chat_type: Some("group".into()),
        ..Default::default()
    };
    let payload = inbound_meta(&StableIdentityFormatter::format(&ctx));
    assert!(payload.get("sender_id").is_none());
}

// ---------------------------------------------------------------------------
// Turn block
// ---------------------------------------------------------------------------

#[test]
fn direct_chat_label_alone_renders_nothing() {
    let ctx = MessageContext {
        chat_type: Some("direct".into()),
        conversation_label: Some("openclaw-tui".into()),
        ..Default::default()
    };
    assert_eq!(turn(&ctx), "");
}

#[test]
fn group_chat_keeps_label() {
    let ctx = MessageContext {
        chat_type: Some("group".into()),
        conversation_label: Some("ops-room".into()),
        ..Default::default()
    };
    let text = turn(&ctx);

    assert!(text.contains("Conversation info (untrusted metadata):"));
    assert!(text.contains(r#""conversation_label": "ops-room""#));
    assert!(text.starts_with("Conversation info (untrusted metadata):\n```json\n"));
}

#[test]
fn sender_prefers_phone() {
    let ctx = MessageContext {
        chat_type: Some("direct".into()),
        sender_e164: Some(" +15551234567 ".into()),
        sender_id: Some("289522496".into()),
        ..Default::default()
    };
    assert_eq!(conversation_info(&turn(&ctx))["sender"], "+15551234567");
}

#[test]
fn sender_falls_back_to_sender_id() {
    let ctx = MessageContext {
        chat_type: Some("direct".into()),
        sender_id: Some(" user@example.com ".into()),
        ..Default::default()
    };
    let info = conversation_info(&turn(&ctx));
    assert_eq!(info["sender"], "user@example.com");
    assert_eq!(info["sender_id"], "user@example.com");
}

#[test]
fn message_id_is_trimmed() {
    let ctx = MessageContext {
        chat_type: Some("direct".into()),
        message_sid: Some("  msg-123  ".into()),
        ..Default::default()
    };
    assert_eq!(conversation_info(&turn(&ctx))["message_id"], "msg-123");
}

#[test]
fn message_id_full_only_when_different() {
    let differing = MessageContext {
        chat_type: Some("group".into()),
        message_sid: Some("short-id".into()),
        message_sid_full: Some("full-provider-message-id".into()),
        ..Default::default()
    };
    let info = conversation_info(&turn(&differing));
    assert_eq!(info["message_id"], "short-id");
    assert_eq!(info["message_id_full"], "full-provider-message-id");

    let same = MessageContext {
        chat_type: Some("direct".into()),
        message_sid: Some("same-id".into()),
        message_sid_full: Some(" same-id ".into()),
        ..Default::default()
    };
    let info = conversation_info(&turn(&same));
    assert_eq!(info["message_id"], "same-id");
    assert!(info.get("message_id_full").is_none());
}

#[test]
fn reply_to_id_and_sender_id_are_carried() {
    let ctx = MessageContext {
        chat_type: Some("group".into()),
        message_sid: Some("msg-200".into()),
        reply_to_id: Some("msg-199".into()),
        sender_id: Some("  289522496  ".into()),
        ..Default::default()
    };
    let info = conversation_info(&turn(&ctx));
    assert_eq!(info["reply_to_id"], "msg-199");
    assert_eq!(info["sender_id"], "289522496");
}

#[test]
fn whitespace_only_fields_emit_nothing() {
    let blank = || Some(" \t ".to_string());
    let ctx = MessageContext {
        chat_type: Some("group".into()),
        conversation_label: blank(),
        message_sid: blank(),
        message_sid_full: blank(),
        reply_to_id: blank(),
        sender_id: blank(),
        sender_e164: blank(),
        group_subject: blank(),
        group_channel: blank(),
        group_space: blank(),
        thread_label: blank(),
        reply_to_body: blank(),
        reply_to_sender: blank(),
        forwarded_from: blank(),
        forwarded_from_type: blank(),
        thread_starter_body: blank(),
        ..Default::default()
    };
    assert_eq!(turn(&ctx), "");
}

#[test]
fn blank_forwarding_details_are_dropped_under_named_source() {
    let blank = || Some("   ".to_string());
    let ctx = MessageContext {
        forwarded_from: Some(" Bob Smith ".into()),
        forwarded_from_type: blank(),
        forwarded_from_username: blank(),
        forwarded_from_title: Some("\t".into()),
        forwarded_from_signature: blank(),
        forwarded_from_chat_type: blank(),
        ..Default::default()
    };
    let info = conversation_info(&turn(&ctx));

    let keys: Vec<&str> = info.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["forwarded_from"]);
    assert_eq!(info["forwarded_from"], "Bob Smith");
}

#[test]
fn full_context_renders_every_key_in_order() {
    let text = turn(&full_group_context());
    let info = conversation_info(&text);

    let keys: Vec<&str> = info.as_object().unwrap().keys().map(String::as_str).collect();
    let expected: Vec<&str> = TurnContextFormatter::keys().collect();
    assert_eq!(keys, expected);

    assert_eq!(info["sender"], "+1234567890");
    assert_eq!(info["is_forum"], json!(true));
    assert_eq!(info["reply_to_is_quote"], json!(false));
    assert_eq!(info["forwarded_date"], "2024-01-23T08:53:20.000Z");
    assert_eq!(info["history"].as_array().unwrap().len(), 3);
    assert_eq!(info["history"][2]["sender"], "Wayne Low");
    assert_eq!(info["history"][2]["timestamp"], "2024-01-23T08:56:20.000Z");

    // Display names go to the sender block, never into conversation info.
    assert!(info.get("sender_name").is_none());
    assert!(!text.contains("Wayne Low#1234"));
}

#[test]
fn emitted_strings_have_no_surrounding_whitespace() {
    let mut ctx = full_group_context();
    ctx.group_subject = Some("  OpenClaw Development\n".into());
    ctx.thread_starter_body = Some("\n  Let's discuss  \n".into());
    let info = conversation_info(&turn(&ctx));

    for (key, value) in info.as_object().unwrap() {
        if let Some(s) = value.as_str() {
            assert_eq!(s, s.trim(), "{key} not trimmed");
            assert!(!s.is_empty(), "{key} is blank");
        }
    }
}

#[test]
fn user_message_assembly() {
    let blocks = InboundBlocks::build(&full_group_context(), &InboundOptions::default());
    let message = blocks.prepend_to("Let me know what you find.");

    assert!(message.starts_with(CONVERSATION_INFO_LABEL));
    assert!(message.contains("Sender (untrusted metadata):"));
    assert!(message.contains(r#""label": "Wayne Low (@waynelow)""#));
    assert!(message.ends_with("\n\nLet me know what you find."));
    assert!(!blocks.system.contains("msg-12345"));
}
