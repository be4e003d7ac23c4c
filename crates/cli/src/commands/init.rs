//! `docchat init` — Write a default config file.

use std::path::Path;

use docchat_config::AppConfig;

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let default_path = AppConfig::config_dir().join("config.toml");
    let path = config_path.unwrap_or(default_path.as_path());

    if AppConfig::write_default(path)? {
        println!("✅ Created config.toml at: {}", path.display());
        println!("\n📝 Next steps:");
        println!("   1. Set GOOGLE_API_KEY or add api_key to {}", path.display());
        println!("   2. Put your documents in the configured source_dir");
        println!("   3. Run: docchat serve\n");
    } else {
        println!("⚠️  Config already exists at: {}", path.display());
        println!("   Edit it manually or delete it and re-run init.");
    }

    Ok(())
}
