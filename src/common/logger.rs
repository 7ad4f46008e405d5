use anyhow::{Context, Result};
use backtrace::Backtrace;
use fern::colors::{Color, ColoredLevelConfig};

use crate::common::dirs::log_file_path;

pub fn install_logger(name: &str, verbose: bool) -> Result<()> {
    let level = if verbose || cfg!(debug_assertions) {
        log::LevelFilter::Trace
    } else {
        log::LevelFilter::Info
    };

    let path = log_file_path(name)?;
    let file = fern::log_file(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Blue)
        .debug(Color::Green)
        .trace(Color::White);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}:{}] {}",
                colors.color(record.level()),
                record.file().unwrap_or_else(|| record.target()),
                record.line().unwrap_or(0),
                message
            ))
        })
        .level(level)
        .chain(file)
        .apply()
        .context("failed to initialize the logger")?;

    std::panic::set_hook(Box::new(|info| {
        error!("{}", info);
        prettify_backtrace(Backtrace::new());
    }));

    Ok(())
}

/// Logs the frames of `backtrace`, skipping the ones in the toolchain and
/// in dependencies.
pub fn prettify_backtrace(backtrace: Backtrace) {
    for (i, frame) in backtrace.frames().iter().enumerate() {
        for symbol in frame.symbols() {
            if let Some(path) = symbol.filename() {
                let filename = path.to_str().unwrap_or("(non-utf8 path)");
                if filename.contains("/.rustup/")
                    || filename.contains("/.cargo/")
                    || filename.starts_with("/rustc/")
                {
                    continue;
                }

                error!(
                    "    #{} {}:{}, col {}",
                    i,
                    filename,
                    symbol.lineno().unwrap_or(0),
                    symbol.colno().unwrap_or(0),
                );
            }
        }
    }
}
