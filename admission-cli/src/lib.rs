pub mod answers;
pub mod app;
pub mod config;
pub mod console;
pub mod logging;

pub use app::{build_registry, open_form};
pub use config::AppConfig;
