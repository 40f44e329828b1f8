use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

use crate::Config;

fn level_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Wires the log facade to a colored stdout sink and a plain log file under
/// the data directory
pub fn init(config: &Config, binary_name: &str) -> Result<(), fern::InitError> {
    let data_dir = match &config.data_directory {
        Some(custom) => custom.clone(),
        None => directories::ProjectDirs::from("art", "BlockArt Project", "BlockArt")
            .expect("Failed to locate a home directory for the log file")
            .data_dir()
            .to_path_buf(),
    };
    std::fs::create_dir_all(&data_dir)?;
    let log_file = data_dir.join(binary_name).with_extension("log");

    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Cyan)
        .debug(Color::Green)
        .trace(Color::Magenta);

    let stdout = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.target(),
                colors.color(record.level()),
                message,
            ))
        })
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.target(),
                record.level(),
                message,
            ))
        })
        .chain(fern::log_file(&log_file)?);

    fern::Dispatch::new()
        .level(level_filter(config.log_level))
        .chain(stdout)
        .chain(file)
        .apply()?;

    log::info!("Logging events to {}", log_file.display());
    Ok(())
}
