pub mod assets;
pub mod server;


pub use server::WebServer;
