//! `chatgate config`: Configuration inspection commands.

use std::path::Path;

use chatgate_config::AppConfig;

const REDACTED: &str = "***";

/// Render the effective configuration as TOML with the API key masked.
pub fn render_redacted(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.api_key.is_some() {
        shown.api_key = Some(REDACTED.into());
    }
    toml::to_string_pretty(&shown)
}

pub fn show(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_with_env(config_path)?;
    println!("# {}", config_path.display());
    print!("{}", render_redacted(&config)?);
    Ok(())
}

pub fn validate(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating {}", config_path.display());

    let config = AppConfig::load_with_env(config_path)?;
    println!("   ✅ Config parsed successfully");
    if !config.has_api_key() {
        println!("   ⚠️  No API key set (set OPENAI_API_KEY or CHATGATE_API_KEY)");
    }
    println!();
    println!("   Base URL:  {}", config.base_url);
    println!("   Model:     {}", config.default_model);
    println!("   Gateway:   {}:{}", config.gateway.host, config.gateway.port);
    println!("   Window:    {}", config.memory.window_size);
    println!(
        "   Artifacts: {}",
        if config.artifacts.enabled {
            config.artifacts.dir.display().to_string()
        } else {
            "disabled".to_string()
        }
    );
    Ok(())
}

pub fn path(config_path: &Path) {
    println!("{}", config_path.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_is_masked() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let rendered = render_redacted(&config).unwrap();
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains(REDACTED));
    }

    #[test]
    fn missing_key_stays_absent() {
        let rendered = render_redacted(&AppConfig::default()).unwrap();
        assert!(!rendered.contains(REDACTED));
        assert!(rendered.contains("window_size"));
    }

    #[test]
    fn invalid_file_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[memory]\nwindow_size = 0\n").unwrap();
        assert!(validate(&path).is_err());
    }
}
