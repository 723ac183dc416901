use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

use crate::cli::LogFormat;

pub fn init_logging(verbosity: u8, format: LogFormat, log_file: Option<&Path>) -> std::io::Result<()> {
    // 0 = warnings only, 1 (-v) = info, 2+ (-vv) = debug
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);
    let (writer, ansi) = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(stderr.and(Mutex::new(file))), false)
        }
        None => (BoxMakeWriter::new(stderr), true),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true);

    match format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Full => builder.init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
    Ok(())
}
