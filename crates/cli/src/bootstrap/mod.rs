pub mod config;
pub mod logging;
pub mod output;

pub use config::{load_config, log_config};
pub use logging::init_logging;
pub use output::{default_output_path, save_json_file};
