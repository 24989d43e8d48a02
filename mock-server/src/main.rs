use envconfig::Envconfig;
use mock_server::AppState;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Envconfig)]
struct Config {
    #[envconfig(from = "BIND_HOST", default = "127.0.0.1")]
    host: String,

    #[envconfig(from = "BIND_PORT", default = "3000")]
    port: u16,

    #[envconfig(from = "MOCK_ACCESS_TOKEN", default = "test-token")]
    access_token: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::init_from_env()?;
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "mock bitly api listening under /v3");
    mock_server::run(listener, AppState::new(&config.access_token)).await?;
    Ok(())
}
