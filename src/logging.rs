use std::error::Error;
use std::fs::File;
use std::path::Path;

use log::LevelFilter;

/// Installs the global logger. `RUST_LOG` still refines the stderr logger;
/// the file logger only honors `verbose`.
pub fn init(verbose: u8, log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            let config = simplelog::ConfigBuilder::new()
                .set_target_level(LevelFilter::Error)
                .set_thread_level(LevelFilter::Debug)
                .build();
            simplelog::WriteLogger::init(level, config, file)?;
        }
        None => {
            env_logger::Builder::new()
                .filter_level(level)
                .parse_env("RUST_LOG")
                .format_timestamp_millis()
                .try_init()?;
        }
    }
    Ok(())
}
