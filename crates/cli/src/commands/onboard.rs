//! `chatgate onboard`: Write a default configuration file.

use std::path::Path;

use chatgate_config::AppConfig;

pub fn run(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("chatgate: First-Time Setup");
    println!("===========================\n");

    if let Some(dir) = config_path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.exists()
    {
        std::fs::create_dir_all(dir)?;
        println!("✅ Created config directory: {}", dir.display());
    }

    if config_path.exists() {
        println!("  Config already exists: {}", config_path.display());
    } else {
        std::fs::write(config_path, AppConfig::default_toml())?;
        println!("✅ Wrote default config: {}", config_path.display());
    }

    println!();
    println!("Next steps:");
    println!("  1. Set your API key: export OPENAI_API_KEY=sk-...");
    println!("  2. Start the server:  chatgate gateway");

    Ok(())
}
