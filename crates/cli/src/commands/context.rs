//! `docchat context` — Print the context built from the source directory.

use std::path::Path;

use docchat_config::AppConfig;
use docchat_documents::ContextBuilder;

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    let report = ContextBuilder::new(config.documents.source_dir.clone()).build_report();

    println!("{}", report.context);

    // Summary goes to stderr so stdout stays pipeable
    eprintln!();
    eprintln!(
        "📄 {} document(s), {} PDF page(s) from {} ({} chars)",
        report.documents,
        report.pages,
        config.documents.source_dir.display(),
        report.context.len()
    );
    for skipped in &report.skipped {
        eprintln!("   ⚠️  skipped {}: {}", skipped.name, skipped.reason);
    }

    Ok(())
}
