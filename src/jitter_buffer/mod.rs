pub mod jb_config;
pub mod jb_error;
pub mod jb_frame;
mod jb_history;
pub mod jb_slot;
pub mod jitter_buffer;

pub use jb_config::JitterBufferConfig;
pub use jb_error::JitterBufferError;
pub use jb_frame::{JbFrame, JbPhase, PutOutcome};
pub use jitter_buffer::{JbState, JbStats, JitterBuffer};
