//! Inbound message metadata rendered as prompt fragments.
//!
//! [`StableIdentityFormatter`] emits the cache-stable system preamble for a chat;
//! [`TurnContextFormatter`] and [`SenderProfileFormatter`] emit the volatile,
//! untrusted per-message blocks. All of them are pure functions of a
//! [`MessageContext`](skynet_core::MessageContext).

pub mod blocks;
pub mod options;
pub mod render;
pub mod sender;
pub mod stable;
pub mod timestamp;
pub mod turn;

pub use blocks::InboundBlocks;
pub use options::InboundOptions;
pub use sender::{SenderProfileFormatter, SENDER_LABEL};
pub use stable::{StableIdentityFormatter, INBOUND_META_SCHEMA, STABLE_KEYS};
pub use turn::{TurnContextFormatter, CONVERSATION_INFO_LABEL};
