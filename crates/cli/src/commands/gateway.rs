//! `chatgate gateway`: Start the HTTP API server.

use std::path::Path;

use chatgate_config::AppConfig;

pub async fn run(
    config_path: &Path,
    port: Option<u16>,
    host: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load_with_env(config_path)?;

    if let Some(p) = port {
        config.gateway.port = p;
    }
    if let Some(h) = host {
        config.gateway.host = h;
    }

    if !config.has_api_key() {
        tracing::warn!("No API key configured; provider calls will fail");
    }

    println!("chatgate gateway");
    println!("  Listening: http://{}:{}", config.gateway.host, config.gateway.port);
    println!("  Model:     {}", config.default_model);
    println!("  Window:    {} messages", config.memory.window_size);
    println!();
    println!("  GET    /health");
    println!("  GET    /api/chat/messages?question=...");
    println!("  GET    /api/chat/messages/stream?question=...");
    println!("  GET    /api/chat/messages/chat-memory?conversationId=...&question=...");
    println!("  GET    /api/chat/messages/new-chat-memory?conversationId=...&question=...");
    println!("  GET    /api/chat/reset-chat?conversationId=...");
    println!("  POST   /api/chat/images/describe");
    println!("  POST   /api/chat/speech-to-text");
    println!();

    chatgate_gateway::start(config).await
}
