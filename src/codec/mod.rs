pub mod codec;
pub mod codec_error;
pub mod g711;

pub use codec::Codec;
pub use codec_error::CodecError;
pub use g711::PcmuCodec;

use crate::rtp_session::RtpCodec;

/// Signature of a codec constructor; streams open one encoder and one decoder.
pub type OpenCodecFn = fn(&RtpCodec) -> Result<Box<dyn Codec>, CodecError>;

/// Opens the built-in codec matching `desc`.
pub fn open_codec(desc: &RtpCodec) -> Result<Box<dyn Codec>, CodecError> {
    if desc.name.eq_ignore_ascii_case("PCMU") && desc.clock_rate == PcmuCodec::CLOCK_RATE {
        return Ok(Box::new(PcmuCodec::new(desc.frame_samples() as usize)));
    }
    Err(CodecError::Unsupported {
        name: desc.name.clone(),
        payload_type: desc.payload_type,
        clock_rate: desc.clock_rate,
    })
}
