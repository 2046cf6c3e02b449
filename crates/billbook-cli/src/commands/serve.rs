//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};

use super::open_store;

/// Allowed origins from `--allow-origin` flags plus `BILLBOOK_ALLOWED_ORIGINS`
pub fn collect_allowed_origins(flags: &[String], env_value: Option<&str>) -> Vec<String> {
    let mut origins: Vec<String> = Vec::new();
    let parsed = flags
        .iter()
        .map(String::as_str)
        .chain(env_value)
        .flat_map(billbook_server::parse_allowed_origins);
    for origin in parsed {
        if !origins.contains(&origin) {
            origins.push(origin);
        }
    }
    origins
}

pub async fn cmd_serve(
    data_path: &Path,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
    allow_origins: &[String],
) -> Result<()> {
    let env_origins = std::env::var("BILLBOOK_ALLOWED_ORIGINS").ok();
    let allowed_origins = collect_allowed_origins(allow_origins, env_origins.as_deref());

    println!("🚀 Starting Billbook web server...");
    println!("   Data file: {}", data_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    if !allowed_origins.is_empty() {
        println!("   🌐 CORS origins: {}", allowed_origins.join(", "));
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let store = open_store(data_path)?;
    store.init().context("Failed to initialize bills file")?;

    let config = billbook_server::ServerConfig { allowed_origins };

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("--static-dir path must be valid UTF-8"))
        .transpose()?;
    billbook_server::serve_with_config(store, host, port, static_dir_str, config).await?;

    Ok(())
}
