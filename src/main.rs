use anyhow::Result;
use clap::Parser;
use servmon::cli::Cli;
use servmon::config::{self, AppConfig};
use servmon::executor::{CommandExecutor, SystemCommandExecutor};
use servmon::registry::ServiceRegistry;
use servmon::systemd::SystemdManager;
use servmon::web::WebServer;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments first to get debug flag
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => AppConfig::default(),
    };

    let executor: Arc<dyn CommandExecutor> =
        Arc::new(SystemCommandExecutor::new(config.monitor.command_timeout()));
    let registry = Arc::new(ServiceRegistry::load(&config.monitor.services_file, executor.clone()).await);
    let manager = Arc::new(SystemdManager::new(executor, registry));

    let port = cli.port.unwrap_or(config.web.port);

    println!("🖥️ servmon started");
    println!("📂 Service list: {}", config.monitor.services_file.display());
    println!("🌐 Dashboard available at: http://{}:{}", config.web.host, port);
    println!("🛑 Press Ctrl+C to stop");

    WebServer::new(
        port,
        config.web.host.clone(),
        manager,
        config.monitor.default_log_lines,
    )
    .start()
    .await
}
