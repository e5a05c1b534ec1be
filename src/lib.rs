pub mod cli;
pub mod config;
pub mod executor;
pub mod registry;
pub mod systemd;
pub mod web;

// Public API
pub use config::AppConfig;
pub use executor::{CommandExecutor, CommandOutput, ExecutorError, SystemCommandExecutor};
pub use registry::{RegistryError, ServiceRegistry};
pub use systemd::{ControlAction, ServiceStatus, SystemdManager};
pub use web::WebServer;
