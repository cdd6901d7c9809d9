use std::time::Duration;

use super::timer_error::TimerError;

pub type TimerCallback = Box<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// Periodic callback scheduler.
pub trait Timer: Send + Sync {
    fn schedule_periodic(
        &self,
        interval: Duration,
        cb: TimerCallback,
    ) -> Result<TimerHandle, TimerError>;

    /// Stops the entry. Once this returns the callback is not running and
    /// will not run again. Unknown handles are ignored.
    fn cancel(&self, handle: TimerHandle);
}
