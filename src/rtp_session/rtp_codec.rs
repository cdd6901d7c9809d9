/// Negotiated audio format of the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpCodec {
    pub payload_type: u8,
    pub clock_rate: u32, // e.g. 8_000 for G.711, 48_000 for Opus
    pub name: String,
    pub channels: u8,
    /// Packetization time in milliseconds.
    pub ptime_ms: u32,
}

impl RtpCodec {
    pub fn new(pt: u8, clock: u32) -> Self {
        Self {
            payload_type: pt,
            clock_rate: clock,
            name: String::new(),
            channels: 1,
            ptime_ms: 20,
        }
    }

    pub fn with_name<S: Into<String>>(pt: u8, clock: u32, name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::new(pt, clock)
        }
    }

    /// PCMU, 8 kHz mono, 20 ms frames.
    pub fn pcmu() -> Self {
        Self::with_name(0, 8_000, "PCMU")
    }

    pub fn with_ptime(mut self, ptime_ms: u32) -> Self {
        self.ptime_ms = ptime_ms;
        self
    }

    /// Samples per channel in one frame, which is also the RTP timestamp step.
    pub fn frame_samples(&self) -> u32 {
        self.clock_rate * self.ptime_ms / 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcmu_frames_are_160_samples() {
        assert_eq!(RtpCodec::pcmu().frame_samples(), 160);
        assert_eq!(RtpCodec::pcmu().with_ptime(30).frame_samples(), 240);
    }
}
