//! `inkmath onboard` — First-time setup.

use inkmath_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("✏️  inkmath — First-Time Setup");
    println!("==============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        let default_toml = AppConfig::default_toml();
        std::fs::write(&config_path, &default_toml)?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Edit {} and add your API key", config_path.display());
        println!("      (or set GEMINI_API_KEY in the environment)");
        println!("   2. Run: inkmath gateway");
        println!("   3. POST a drawing to http://localhost:8900/\n");
    }

    println!("🎉 Setup complete!\n");

    Ok(())
}
