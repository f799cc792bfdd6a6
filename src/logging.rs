use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

pub const LOG_FILE: &str = "mazemdp.log";

/// `DEBUG=1` turns on debug events, anything else keeps INFO.
fn level_from_debug(value: Option<&str>) -> Level {
    match value {
        Some("1") => Level::DEBUG,
        _ => Level::INFO,
    }
}

/// Sends log events to [`LOG_FILE`] in the working directory so they never interleave with the
/// maze on stdout. Keep the returned guard alive until exit or buffered events are lost.
pub fn init() -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(".", LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let level = level_from_debug(std::env::var("DEBUG").ok().as_deref());
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_max_level(level)
        .init();
    guard
}
