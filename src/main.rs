use classpath::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = ServerConfig::from_env();
    log::info!("=== classpath transfer planner ===");
    run_server(config).await
}
