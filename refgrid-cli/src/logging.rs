//! Logger setup.

use std::fs;
use std::fs::File;

use simplelog::ColorChoice;
use simplelog::CombinedLogger;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::SharedLogger;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use simplelog::WriteLogger;

use crate::error::CliError;
use crate::paths;

/// Logs everything at debug level to `latest.log`, and info to stderr when
/// `verbose` is set.
pub fn init(verbose: bool) -> Result<(), CliError> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if let Some(path) = paths::log_file() {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
            paths::rotate_logs(dir);
        }
        let file = File::create(&path)?;
        loggers.push(WriteLogger::new(LevelFilter::Debug, Config::default(), file));
    }

    if verbose {
        loggers.push(TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }

    CombinedLogger::init(loggers).map_err(|e| CliError::Logger(e.to_string()))
}
