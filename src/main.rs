//! User Directory server
//!
//! Reads configuration from `$USER_DIRECTORY_CONFIG` or
//! `~/.config/user-directory/config.toml`. See the `cli/` crate for
//! command-line overrides.

use tracing::{error, info};

use user_directory::config::{default_config_path, AppConfig};
use user_directory::server::{init_tracing, ServerHandle, ServerOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = default_config_path();

    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let cfg = AppConfig::default();
            init_tracing(&cfg);
            error!("Failed to load config: {}. Using defaults.", e);
            cfg
        }
    };

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: true,
    })
    .await?;

    handle.install_signal_handler();
    handle.wait().await;
    Ok(())
}
