use crate::log::{log_level::LogLevel, log_sink::LogSink};

/// Forwards engine log lines to the `tracing` ecosystem.
///
/// The originating module path is attached as the `origin` field since
/// `tracing` targets must be known at compile time.
#[derive(Debug, Clone, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, level: LogLevel, msg: &str, target: &'static str) {
        match level {
            LogLevel::Trace => tracing::trace!(origin = target, "{msg}"),
            LogLevel::Debug => tracing::debug!(origin = target, "{msg}"),
            LogLevel::Info => tracing::info!(origin = target, "{msg}"),
            LogLevel::Warn => tracing::warn!(origin = target, "{msg}"),
            LogLevel::Error => tracing::error!(origin = target, "{msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use std::sync::Arc;

    #[test]
    fn usable_as_shared_sink() {
        let sink: Arc<dyn LogSink> = Arc::new(TracingLogSink);
        sink.log(LogLevel::Warn, "jitter buffer resync", module_path!());
        crate::sink_warn!(sink, "resync after gap of {} packets", 40);
    }

    #[test]
    fn levels_are_ordered_by_severity() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert_eq!(LogLevel::Info.to_string(), "INFO");
    }
}
