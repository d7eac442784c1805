use tracing::info;

use crate::infrastructure::server_config::ServerConfig;
use crate::interfaces::http::start_server;

pub async fn run() -> std::io::Result<()> {
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let config = ServerConfig::load()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    info!(
        host = %config.host,
        port = config.port,
        export_dir = %config.export_dir.display(),
        "Starting hotel analysis server"
    );

    start_server(&config)?.await
}
