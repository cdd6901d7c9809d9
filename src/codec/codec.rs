use super::codec_error::CodecError;

/// Audio encoder/decoder for one direction of a stream.
///
/// Frames are `frame_sample_count()` mono 16-bit samples.
pub trait Codec: Send {
    fn encode(&mut self, pcm: &[i16], out: &mut Vec<u8>) -> Result<(), CodecError>;

    /// `None` asks the codec to conceal a lost frame.
    fn decode(&mut self, payload: Option<&[u8]>, out: &mut Vec<i16>) -> Result<(), CodecError>;

    fn frame_sample_count(&self) -> usize;

    fn clock_rate(&self) -> u32;
}
