//! `inkmath doctor` — Diagnose configuration and connectivity.

use inkmath_config::AppConfig;
use inkmath_core::Generator as _;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 inkmath Doctor — Diagnostics");
    println!("===============================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file — run `inkmath onboard` (env overrides still apply)");
    }

    match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid (model: {})", config.generator.model);

            if config.api_key.is_some() {
                println!("  ✅ API key configured");

                match inkmath_providers::build_from_config(&config) {
                    Ok(generator) => match generator.health_check().await {
                        Ok(true) => println!("  ✅ Generator reachable"),
                        Ok(false) => {
                            println!("  ❌ Generator rejected the API key");
                            issues += 1;
                        }
                        Err(e) => {
                            println!("  ❌ Generator unreachable: {e}");
                            issues += 1;
                        }
                    },
                    Err(e) => {
                        println!("  ❌ Generator setup failed: {e}");
                        issues += 1;
                    }
                }
            } else {
                println!("  ⚠️  No API key — set GEMINI_API_KEY or add api_key to config.toml");
                issues += 1;
            }
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
