pub mod config;
pub mod error;
pub mod types;

pub use config::{InboundConfig, SkynetConfig, TimestampStyle};
pub use error::{Result, SkynetError};
pub use types::{HistoryEntry, MessageContext};
