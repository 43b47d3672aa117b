use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use serde_json::json;

use blink_server::{BlinkServer, ServerConfig};
use blink_store::FsBlobStore;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Sweep(args) => cmd_sweep(args, &cli.format).await,
        Command::Config(args) => cmd_config(args, &cli.format),
    }
}

/// Resolve the effective configuration: file, then command-line overrides.
pub fn resolve_config(source: &ConfigSource) -> anyhow::Result<ServerConfig> {
    let mut config = match &source.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = source.bind {
        config.bind_addr = bind;
    }
    if let Some(port) = source.port {
        config = config.with_port(port);
    }
    if let Some(root) = &source.root {
        config.storage_root = root.clone();
    }
    if let Some(base) = &source.base_url {
        config.public_base_url = Some(base.clone());
    }
    config.validate()?;
    tracing::debug!(?config, "effective configuration");
    Ok(config)
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = resolve_config(&args.source)?;
    if args.no_sweep {
        config.sweep_on_start = false;
    }
    println!(
        "{} Blink on {} (root: {}, links live {} min)",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        config.storage_root.display(),
        config.vault_config().ttl_minutes().to_string().yellow(),
    );
    BlinkServer::new(config).serve().await?;
    println!("{} Server stopped.", "✓".green());
    Ok(())
}

async fn cmd_sweep(args: SweepArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = resolve_config(&args.source)?;
    let store = FsBlobStore::open(&config.storage_root)
        .await
        .with_context(|| format!("opening storage root {}", config.storage_root.display()))?;
    let min_age = args.older_than.map(Duration::from_secs).unwrap_or_else(|| config.ttl());
    let report = store.sweep_orphans(min_age).await?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "root": config.storage_root.display().to_string(),
                "scanned": report.scanned,
                "removed": report.removed,
                "bytes_freed": report.bytes_freed,
                "failed": report.failed,
                "kept_recent": report.kept_recent,
                "min_age_secs": min_age.as_secs(),
            })
        ),
        OutputFormat::Text => {
            let mark = if report.failed == 0 { "✓".green().bold() } else { "!".red().bold() };
            println!(
                "{} Swept {}: {} removed, {} bytes freed",
                mark,
                config.storage_root.display().to_string().bold(),
                report.removed.to_string().yellow(),
                report.bytes_freed,
            );
            if report.kept_recent > 0 {
                println!(
                    "  {} {} untracked blobs younger than {}s",
                    "kept:".yellow(),
                    report.kept_recent,
                    min_age.as_secs()
                );
            }
            if report.failed > 0 {
                println!("  {} {} blobs could not be removed", "failed:".red(), report.failed);
            }
        }
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = resolve_config(&args.source)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Text => print!("{}", toml::to_string_pretty(&config)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn defaults_without_overrides() {
        let config = resolve_config(&ConfigSource::default()).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn flags_override_file() {
        let dir = std::env::temp_dir().join(format!("blink-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("blink.toml");
        std::fs::write(&path, "bind_addr = \"127.0.0.1:9000\"\nstorage_root = \"/srv/blink\"\n").unwrap();

        let source = ConfigSource {
            config: Some(path.clone()),
            port: Some(4000),
            base_url: Some("https://img.example.com".into()),
            ..ConfigSource::default()
        };
        let config = resolve_config(&source).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:4000".parse::<std::net::SocketAddr>().unwrap());
        assert_eq!(config.storage_root, PathBuf::from("/srv/blink"));
        assert_eq!(config.public_base_url.as_deref(), Some("https://img.example.com"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let source = ConfigSource {
            base_url: Some("img.example.com".into()),
            ..ConfigSource::default()
        };
        assert!(resolve_config(&source).is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let source = ConfigSource {
            config: Some(PathBuf::from("/nonexistent/blink.toml")),
            ..ConfigSource::default()
        };
        assert!(resolve_config(&source).is_err());
    }
}
