//! CLI module graph.

pub mod check;
pub mod command;
pub mod fetch;
pub mod lookup;
pub mod output;
pub mod render;

use crate::infrastructure::config::logging::LoggingConfig;
use crate::infrastructure::config::Config;

/// Initialize tracing for a command, letting `-v` and `--json` override the
/// configured level and format.
pub fn init_logging(config: &Config) {
    logging_for(config, output::verbosity(), output::is_json()).init();
}

fn logging_for(config: &Config, verbosity: u8, json: bool) -> LoggingConfig {
    let mut logging = config.logging.clone();
    match verbosity {
        0 => {}
        1 => logging.level = "debug".into(),
        _ => logging.level = "trace".into(),
    }
    if json {
        logging.format = "json".into();
    }
    logging
}
