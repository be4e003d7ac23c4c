//! `docchat doctor` — Diagnose configuration and environment.

use std::path::Path;

use docchat_config::AppConfig;
use docchat_core::Provider;
use docchat_documents::ContextBuilder;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 docchat doctor — System Diagnostics");
    println!("=====================================\n");

    let mut issues = 0;

    let default_path = AppConfig::config_dir().join("config.toml");
    let path = config_path.unwrap_or(default_path.as_path());
    if path.exists() {
        println!("  ✅ Config file found: {}", path.display());
    } else {
        println!(
            "  ℹ️  No config file at {} — using defaults (run `docchat init` to create one)",
            path.display()
        );
    }

    let config = match AppConfig::load(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    println!(
        "  ✅ Provider: {} (model {})",
        config.default_provider, config.default_model
    );

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key — set GOOGLE_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    // Source documents
    let source_dir = &config.documents.source_dir;
    if source_dir.is_dir() {
        let report = ContextBuilder::new(source_dir.clone()).build_report();
        println!(
            "  ✅ Source directory {} ({} document(s))",
            source_dir.display(),
            report.documents
        );
        for skipped in &report.skipped {
            println!("  ⚠️  Unreadable source {}: {}", skipped.name, skipped.reason);
            issues += 1;
        }
    } else {
        println!(
            "  ⚠️  Source directory {} not found — answers will have no context",
            source_dir.display()
        );
        issues += 1;
    }

    // Static client
    if config.gateway.static_dir.join("index.html").is_file() {
        println!("  ✅ Static client found in {}", config.gateway.static_dir.display());
    } else {
        println!(
            "  ⚠️  No index.html in {} — only the API will be served",
            config.gateway.static_dir.display()
        );
        issues += 1;
    }

    // Provider reachability
    if config.has_api_key() {
        match docchat_providers::build_from_config(&config) {
            Ok(provider) => match provider.health_check().await {
                Ok(true) => println!("  ✅ Provider reachable"),
                Ok(false) => {
                    println!("  ⚠️  Provider rejected the health check (check the API key)");
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Provider unreachable: {e}");
                    issues += 1;
                }
            },
            Err(e) => {
                println!("  ❌ Provider could not be built: {e}");
                issues += 1;
            }
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
