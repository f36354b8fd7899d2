//! User Directory: CLI server
//!
//! ```sh
//! # Run with default config (~/.config/user-directory/config.toml)
//! user-directory-server
//!
//! # Custom config path and port
//! user-directory-server --config /etc/user-directory/config.toml --api-port 9090
//!
//! # Validate config without starting
//! user-directory-server --check
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use user_directory::config::{default_config_path, AppConfig};
use user_directory::server::{init_tracing, ServerHandle, ServerOptions};

/// REST API for a user directory populated from randomuser.me.
#[derive(Parser, Debug)]
#[command(
    name = "user-directory-server",
    version,
    about = "User directory REST API",
    long_about = "User directory REST API with paginated search and batched \
                  random-user ingestion.\n\n\
                  Default config: ~/.config/user-directory/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "USER_DIRECTORY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Override the database URL.
    #[arg(long)]
    database_url: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

fn apply_overrides(cli: &Cli, config: &mut AppConfig) {
    if let Some(port) = cli.api_port {
        config.server.api_port = port;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(ref url) = cli.database_url {
        config.database.url_override = Some(url.clone());
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    if cli.check {
        return match AppConfig::load(&config_path) {
            Ok(mut config) => {
                apply_overrides(&cli, &mut config);
                println!("Configuration is valid");
                println!("   Config file : {}", config_path.display());
                println!("   API address : {}", config.api_address());
                println!("   Database    : {}", config.database.connection_url());
                println!("   Random user : {}", config.random_user.base_url);
                println!(
                    "   Ingestion   : chunks of {} every {}ms, at most {}",
                    config.ingestion.chunk_size,
                    config.ingestion.pause_ms,
                    config.ingestion.max_target
                );
                println!("   Log level   : {}", config.logging.level);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Invalid configuration in {}: {}", config_path.display(), e);
                ExitCode::FAILURE
            }
        };
    }

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    apply_overrides(&cli, &mut config);
    init_tracing(&config);

    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    let handle = match ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start server: {}", e);
            return ExitCode::FAILURE;
        }
    };

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.wait().await;
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_on_top_of_file_config() {
        let cli = Cli::parse_from([
            "user-directory-server",
            "--api-port",
            "9999",
            "--log-level",
            "debug",
            "--database-url",
            "sqlite::memory:",
        ]);
        let mut config = AppConfig::default();
        apply_overrides(&cli, &mut config);

        assert_eq!(config.server.api_port, 9999);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.database.connection_url(), "sqlite::memory:");
    }

    #[test]
    fn check_and_no_migrate_flags_parse() {
        let cli = Cli::parse_from(["user-directory-server", "--check", "--no-migrate"]);
        assert!(cli.check);
        assert!(cli.no_migrate);
    }
}
