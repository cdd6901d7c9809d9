use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("no codec for {name} (pt {payload_type}, {clock_rate} Hz)")]
    Unsupported {
        name: String,
        payload_type: u8,
        clock_rate: u32,
    },
    #[error("frame has {got} samples, codec expects {expected}")]
    FrameSize { expected: usize, got: usize },
}
