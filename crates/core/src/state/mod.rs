pub mod config;
pub mod io;

pub use config::{BattleConfig, ConfigUpdate};
pub use io::{config_path, ensure_runtime_dir, env_path, get_runtime_path};
