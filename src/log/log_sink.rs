use crate::log::log_level::LogLevel;

/// Destination for every log line the stream engine emits.
///
/// Components hold an `Arc<dyn LogSink>` and log through the `sink_*!`
/// macros, which compile out below the enabled `log-*` feature.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, msg: &str, target: &'static str);
}
