//! Server command implementation

use std::path::Path;

use anyhow::Result;

use super::open_db;

/// Comma-separated environment list, trimmed, empties dropped
fn env_list(name: &str) -> Vec<String> {
    std::env::var(name)
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn join_networks<T: std::fmt::Display>(networks: &[T]) -> String {
    networks
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
) -> Result<()> {
    println!("🚀 Starting Savvy API server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    let api_keys = env_list("SAVVY_API_KEYS");
    let allowed_origins = env_list("SAVVY_ALLOWED_ORIGINS");
    let trusted_networks = savvy_server::parse_trusted_networks(
        &std::env::var("SAVVY_TRUSTED_NETWORKS").unwrap_or_default(),
    );
    let trusted_proxies = savvy_server::parse_trusted_networks(
        &std::env::var("SAVVY_TRUSTED_PROXIES").unwrap_or_default(),
    );

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        if trusted_proxies.is_empty() {
            println!(
                "   🔒 Authentication: API key or trusted network ({} ignored: no SAVVY_TRUSTED_PROXIES)",
                savvy_server::AUTH_USER_HEADER
            );
        } else {
            println!(
                "   🔒 Authentication: proxy header ({}) from trusted proxies",
                savvy_server::AUTH_USER_HEADER
            );
        }
        if !api_keys.is_empty() {
            println!(
                "   🔑 API keys: {} configured (SAVVY_API_KEYS)",
                api_keys.len()
            );
        }
        if !trusted_networks.is_empty() {
            println!(
                "   🏠 Trusted networks: {} (SAVVY_TRUSTED_NETWORKS)",
                join_networks(&trusted_networks)
            );
        }
        if !trusted_proxies.is_empty() {
            println!(
                "   🔀 Trusted proxies: {} (SAVVY_TRUSTED_PROXIES)",
                join_networks(&trusted_proxies)
            );
        }
    }
    if !allowed_origins.is_empty() {
        println!("   🌐 CORS origins: {}", allowed_origins.join(", "));
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let config = savvy_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins,
        api_keys,
        trusted_networks,
        trusted_proxies,
    };

    savvy_server::serve_with_config(db, host, port, config).await
}
