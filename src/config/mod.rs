//! Configuration for the rota service.

mod settings;

pub use settings::{AuthConfig, BootstrapAdmin, Config, ScheduleConfig, ServerConfig};
