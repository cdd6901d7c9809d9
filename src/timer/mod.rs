pub mod media_clock;
pub mod thread_timer;
pub mod timer;
pub mod timer_error;

pub use media_clock::{ManualClock, MediaClock, SystemClock};
pub use thread_timer::ThreadTimer;
pub use timer::{Timer, TimerCallback, TimerHandle};
pub use timer_error::TimerError;
