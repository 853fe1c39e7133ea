use chrono::{DateTime, SecondsFormat, Utc};
use skynet_core::TimestampStyle;

/// Render epoch milliseconds in the configured style (always UTC).
///
/// Returns `None` for values chrono cannot represent.
pub fn format_epoch_millis(millis: i64, style: TimestampStyle) -> Option<String> {
    let ts = DateTime::<Utc>::from_timestamp_millis(millis)?;
    Some(match style {
        TimestampStyle::Iso8601 => ts.to_rfc3339_opts(SecondsFormat::Millis, true),
        TimestampStyle::Human => ts.format("%a %Y-%m-%d %H:%M UTC").to_string(),
    })
}
