use clap::Parser;
use tokio::net::TcpListener;
use todo_server::ServerConfig;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let config = ServerConfig::parse();
    tracing_subscriber::fmt().with_env_filter(config.env_filter()).init();

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "todo api listening");
    todo_server::run(listener, config.credentials()).await
}
