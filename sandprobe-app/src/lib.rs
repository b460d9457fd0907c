pub mod config;
pub mod logging;
pub mod panel;
pub mod render;
pub mod secrets;

pub use config::AppConfig;
pub use panel::{PanelStatus, StatePanel};
pub use secrets::{process_env, secret_env_report, EnvSecret};
