//! `docchat ask` — Answer a single question on the terminal.

use std::io::Write;
use std::path::Path;

use docchat_chat::{ChatRelay, build_prompt};
use docchat_config::AppConfig;
use docchat_core::StreamEvent;
use docchat_documents::ContextBuilder;

pub async fn run(config_path: Option<&Path>, question: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables (or put it in .env):");
        eprintln!("    GOOGLE_API_KEY=...    (Gemini, the default provider)");
        eprintln!("    OPENAI_API_KEY=...    (with DOCCHAT_PROVIDER=openai)");
        eprintln!("    DOCCHAT_API_KEY=...   (generic)");
        eprintln!();
        eprintln!("  Or add api_key to {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let builder = ContextBuilder::new(config.documents.source_dir.clone());
    let report = tokio::task::spawn_blocking(move || builder.build_report()).await?;
    for skipped in &report.skipped {
        eprintln!("⚠️  skipped {}: {}", skipped.name, skipped.reason);
    }

    let provider = docchat_providers::build_from_config(&config)?;
    let relay = ChatRelay::from_config(provider, &config);
    let mut events = relay.open(build_prompt(&report.context, question)).await?;

    let mut stdout = std::io::stdout();
    while let Some(event) = events.recv().await {
        match event? {
            StreamEvent::Chunk(text) => {
                print!("{text}");
                stdout.flush()?;
            }
            StreamEvent::Citations(citations) => {
                println!();
                println!();
                println!("Sources:");
                for citation in citations {
                    println!("  [{}] {}", citation.id, citation.source);
                }
            }
            StreamEvent::Done => break,
        }
    }
    println!();

    Ok(())
}
