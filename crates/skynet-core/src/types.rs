use serde::{Deserialize, Serialize};

use crate::error::{Result, SkynetError};

/// Chat kind reported by adapters for one-to-one conversations.
pub const CHAT_TYPE_DIRECT: &str = "direct";

/// Metadata about one inbound message, populated by a channel adapter.
///
/// Every field is optional; adapters fill what their platform exposes.
/// Key names match the adapters' JSON envelope (`OriginatingTo`, `SenderE164`, …).
/// Unknown keys are ignored so newer adapters never break older formatters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MessageContext {
    // Routing: invariant for the lifetime of a chat.
    pub originating_to: Option<String>,
    pub originating_channel: Option<String>,
    pub provider: Option<String>,
    pub surface: Option<String>,
    pub chat_type: Option<String>,

    // Per-turn identifiers.
    pub message_sid: Option<String>,
    pub message_sid_full: Option<String>,
    pub reply_to_id: Option<String>,

    // Sender.
    pub sender_id: Option<String>,
    pub sender_name: Option<String>,
    pub sender_username: Option<String>,
    pub sender_tag: Option<String>,
    #[serde(rename = "SenderE164")]
    pub sender_e164: Option<String>,

    // Grouping.
    pub conversation_label: Option<String>,
    pub group_subject: Option<String>,
    pub group_channel: Option<String>,
    pub group_space: Option<String>,
    pub thread_label: Option<String>,
    pub is_forum: Option<bool>,
    pub was_mentioned: Option<bool>,

    // Reply lineage.
    pub reply_to_body: Option<String>,
    pub reply_to_sender: Option<String>,
    pub reply_to_is_quote: Option<bool>,

    // Forwarding.
    pub forwarded_from: Option<String>,
    pub forwarded_from_type: Option<String>,
    pub forwarded_from_username: Option<String>,
    pub forwarded_from_title: Option<String>,
    pub forwarded_from_signature: Option<String>,
    pub forwarded_from_chat_type: Option<String>,
    /// Epoch milliseconds of the original message.
    pub forwarded_date: Option<i64>,

    pub thread_starter_body: Option<String>,

    /// Recent messages in the chat, oldest first.
    pub inbound_history: Option<Vec<HistoryEntry>>,
}

/// One prior message in the chat window supplied by the adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub sender: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub body: String,
}

impl MessageContext {
    /// Parse an adapter envelope.
    ///
    /// Shape mismatches (e.g. a string where a flag belongs) are reported as
    /// [`SkynetError::InvalidContext`]; malformed JSON as `Serialization`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            if e.is_data() {
                SkynetError::InvalidContext(e.to_string())
            } else {
                SkynetError::Serialization(e)
            }
        })
    }

    /// True for one-to-one chats. A missing or blank `ChatType` counts as direct.
    pub fn is_direct(&self) -> bool {
        match self.chat_type.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(kind) => kind.eq_ignore_ascii_case(CHAT_TYPE_DIRECT),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
