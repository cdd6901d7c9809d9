use std::fmt;

/// Defines the severity levels for log messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Per-packet detail: sequence decisions, slot moves, DTMF packet emission.
    Trace,
    /// Dropped packets, state transitions of the jitter buffer and DTMF machines.
    Debug,
    /// Stream lifecycle: create, start, pause, resume, destroy.
    Info,
    /// Quality events: resyncs, queue overflow, transport failures.
    Warn,
    /// Failures that stop part of the stream from working.
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(s)
    }
}
