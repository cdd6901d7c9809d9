use super::stream_state::Direction;
use crate::rtp_session::RtpCodec;

/// Negotiated parameters of one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    pub codec: RtpCodec,
    /// telephone-event payload type we send with, if negotiated.
    pub tx_event_pt: Option<u8>,
    /// telephone-event payload type the remote sends with, if negotiated.
    pub rx_event_pt: Option<u8>,
    /// Overrides `[Rtp] local_ssrc`.
    pub local_ssrc: Option<u32>,
    /// Overrides `[Rtcp] cname`.
    pub cname: Option<String>,
    pub direction: Direction,
}

impl StreamInfo {
    pub fn new(codec: RtpCodec) -> Self {
        Self {
            codec,
            tx_event_pt: None,
            rx_event_pt: None,
            local_ssrc: None,
            cname: None,
            direction: Direction::Both,
        }
    }

    /// Same telephone-event payload type in both directions.
    pub fn with_telephone_event(mut self, pt: u8) -> Self {
        self.tx_event_pt = Some(pt);
        self.rx_event_pt = Some(pt);
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.codec.payload_type > 127 {
            return Err(format!("payload type {} out of range", self.codec.payload_type));
        }
        if self.codec.clock_rate == 0 || self.codec.frame_samples() == 0 {
            return Err("codec clock rate and ptime must be non-zero".into());
        }
        for pt in [self.tx_event_pt, self.rx_event_pt].into_iter().flatten() {
            if pt > 127 {
                return Err(format!("telephone-event payload type {pt} out of range"));
            }
            if pt == self.codec.payload_type {
                return Err(format!("telephone-event payload type {pt} collides with the codec"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_pt_must_differ_from_codec() {
        assert!(StreamInfo::new(RtpCodec::pcmu()).with_telephone_event(101).validate().is_ok());
        assert!(StreamInfo::new(RtpCodec::pcmu()).with_telephone_event(0).validate().is_err());
        let mut bad = StreamInfo::new(RtpCodec::pcmu());
        bad.codec.ptime_ms = 0;
        assert!(bad.validate().is_err());
    }
}
