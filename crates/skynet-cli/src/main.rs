use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use tracing::{debug, info, warn};

use skynet_core::config::SkynetConfig;
use skynet_core::MessageContext;
use skynet_inbound::{InboundBlocks, InboundOptions};

#[derive(Parser, Debug)]
#[command(name = "skynet-meta")]
#[command(about = "Render inbound message metadata as prompt fragments", long_about = None)]
struct Cli {
    /// Config file path (default: SKYNET_CONFIG or ~/.skynet/skynet.toml)
    #[arg(long, short, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Message context JSON from a channel adapter; `-` reads stdin
    #[arg(long, value_name = "PATH", default_value = "-")]
    context: PathBuf,

    /// Which fragment to print
    #[arg(long, value_enum, default_value_t = Section::All)]
    section: Section,

    /// Print the user message as sent to the model, metadata prepended to this text
    #[arg(long, value_name = "TEXT", conflicts_with = "section")]
    body: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Section {
    /// Cache-stable system preamble
    System,
    /// Per-turn conversation info
    Conversation,
    /// Per-turn sender profile
    Sender,
    /// Every non-empty fragment, system first
    All,
}

fn main() -> anyhow::Result<()> {
    // stdout carries the prompt text; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skynet_meta=info,skynet_core=info".into()),
        )
        .init();

    let cli = Cli::parse();

    // explicit --config > SKYNET_CONFIG env > ~/.skynet/skynet.toml
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .or_else(|| std::env::var("SKYNET_CONFIG").ok());
    let config = SkynetConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        SkynetConfig::default()
    });
    let options = InboundOptions::from(&config.inbound);

    let ctx = load_context(&cli.context)?;
    let blocks = InboundBlocks::build(&ctx, &options);
    info!(
        system_chars = blocks.system.len(),
        conversation_chars = blocks.conversation.len(),
        sender_chars = blocks.sender.len(),
        "rendered inbound metadata"
    );

    let out = match cli.body {
        Some(body) => blocks.prepend_to(&body),
        None => render_section(&blocks, cli.section),
    };
    if !out.is_empty() {
        println!("{}", out);
    }
    Ok(())
}

fn load_context(path: &Path) -> anyhow::Result<MessageContext> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?
    };
    debug!(bytes = raw.len(), "parsing message context");
    Ok(MessageContext::from_json(&raw)?)
}

fn render_section(blocks: &InboundBlocks, section: Section) -> String {
    match section {
        Section::System => blocks.system.clone(),
        Section::Conversation => blocks.conversation.clone(),
        Section::Sender => blocks.sender.clone(),
        Section::All => [
            blocks.system.as_str(),
            blocks.conversation.as_str(),
            blocks.sender.as_str(),
        ]
        .into_iter()
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n"),
    }
}
