use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "blink",
    about = "Blink: share an image through a link or a 5-digit code for ten minutes",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the upload server
    Serve(ServeArgs),
    /// Remove orphaned blobs from a storage root
    Sweep(SweepArgs),
    /// Print the effective server configuration
    Config(ConfigArgs),
}

/// Settings shared by every command that reads a server configuration.
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigSource {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Address to listen on
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Listening port, overriding the port of the bind address
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,
    /// Directory holding uploaded blobs
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// Public base URL used in returned links
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub source: ConfigSource,
    /// Keep untracked blobs found in the storage root at startup
    #[arg(long)]
    pub no_sweep: bool,
}

#[derive(Args)]
pub struct SweepArgs {
    #[command(flatten)]
    pub source: ConfigSource,
    /// Only remove blobs untouched for this many seconds (defaults to the TTL)
    #[arg(long)]
    pub older_than: Option<u64>,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub source: ConfigSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve_defaults() {
        let cli = Cli::try_parse_from(["blink", "serve"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert!(args.source.config.is_none());
            assert!(args.source.bind.is_none());
            assert!(!args.no_sweep);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "blink", "serve", "--bind", "127.0.0.1:8080", "--root", "/tmp/blink",
            "--base-url", "https://img.example.com", "--no-sweep",
        ])
        .unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.source.bind, Some("127.0.0.1:8080".parse::<SocketAddr>().unwrap()));
            assert_eq!(args.source.root, Some(PathBuf::from("/tmp/blink")));
            assert_eq!(args.source.base_url.as_deref(), Some("https://img.example.com"));
            assert!(args.no_sweep);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_bad_bind_fails() {
        assert!(Cli::try_parse_from(["blink", "serve", "--bind", "not-an-addr"]).is_err());
    }

    #[test]
    fn parse_sweep() {
        let cli = Cli::try_parse_from(["blink", "sweep", "--root", "uploads"]).unwrap();
        if let Command::Sweep(args) = cli.command {
            assert_eq!(args.source.root, Some(PathBuf::from("uploads")));
            assert!(args.older_than.is_none());
        } else { panic!("wrong command"); }

        let cli = Cli::try_parse_from(["blink", "sweep", "--older-than", "3600"]).unwrap();
        if let Command::Sweep(args) = cli.command {
            assert_eq!(args.older_than, Some(3600));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_config_file() {
        let cli = Cli::try_parse_from(["blink", "config", "-c", "blink.toml"]).unwrap();
        if let Command::Config(args) = cli.command {
            assert_eq!(args.source.config, Some(PathBuf::from("blink.toml")));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["blink", "--verbose", "serve"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["blink", "--format", "json", "sweep"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
