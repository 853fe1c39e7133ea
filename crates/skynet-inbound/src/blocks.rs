use skynet_core::MessageContext;

use crate::options::InboundOptions;
use crate::sender::SenderProfileFormatter;
use crate::stable::StableIdentityFormatter;
use crate::turn::TurnContextFormatter;

/// All metadata fragments for one inbound message.
///
/// `system` belongs in a cached system-prompt tier. `conversation` and
/// `sender` are volatile and go into the user turn; either may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundBlocks {
    pub system: String,
    pub conversation: String,
    pub sender: String,
}

impl InboundBlocks {
    pub fn build(ctx: &MessageContext, options: &InboundOptions) -> Self {
        let sender = if options.include_sender_profile {
            SenderProfileFormatter::format(ctx)
        } else {
            String::new()
        };
        Self {
            system: StableIdentityFormatter::format(ctx),
            conversation: TurnContextFormatter::new(*options).format(ctx),
            sender,
        }
    }

    /// Non-empty user-turn fragments joined by a blank line.
    pub fn user_prefix(&self) -> String {
        [self.conversation.as_str(), self.sender.as_str()]
            .into_iter()
            .filter(|block| !block.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The user message as sent to the model: metadata first, then `body`.
    pub fn prepend_to(&self, body: &str) -> String {
        let prefix = self.user_prefix();
        if prefix.is_empty() {
            return body.to_string();
        }
        let mut out = String::with_capacity(prefix.len() + body.len() + 2);
        out.push_str(&prefix);
        out.push_str("\n\n");
        out.push_str(body);
        out
    }
}
