use skynet_core::{InboundConfig, TimestampStyle};

/// Rendering knobs for the per-turn blocks. The stable block takes none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundOptions {
    pub timestamp_style: TimestampStyle,
    /// Keep only the most recent N history entries.
    pub history_limit: Option<usize>,
    pub include_sender_profile: bool,
}

impl Default for InboundOptions {
    fn default() -> Self {
        Self {
            timestamp_style: TimestampStyle::Iso8601,
            history_limit: None,
            include_sender_profile: true,
        }
    }
}

impl From<&InboundConfig> for InboundOptions {
    fn from(config: &InboundConfig) -> Self {
        Self {
            timestamp_style: config.timestamp_style,
            history_limit: config.history_limit,
            include_sender_profile: config.include_sender_profile,
        }
    }
}
