//! G.711 µ-law (PCMU) with a frame-repeat concealment.

use super::{codec::Codec, codec_error::CodecError};

const BIAS: i32 = 0x84;
const CLIP: i32 = 32635;

/// Concealed frames before output decays to silence.
const MAX_CONCEALED: u32 = 5;

/// Converts a 16-bit linear PCM sample to 8-bit µ-law.
pub fn linear_to_ulaw(sample: i16) -> u8 {
    let sign = ((sample >> 8) & 0x80) as u8;
    let s = i32::from(sample).abs().min(CLIP) + BIAS;

    let mut mask = 0x4000;
    let mut exp: u8 = 7;
    while (s & mask) == 0 && exp > 0 {
        mask >>= 1;
        exp -= 1;
    }
    let mantissa = ((s >> (exp + 3)) & 0x0F) as u8;
    !(sign | (exp << 4) | mantissa)
}

/// Converts an 8-bit µ-law sample to 16-bit linear PCM.
pub fn ulaw_to_linear(byte: u8) -> i16 {
    let byte = !byte;
    let exponent = (byte >> 4) & 0x07;
    let mantissa = i32::from(byte & 0x0F);
    let magnitude = (((mantissa << 3) + BIAS) << exponent) - BIAS;
    if byte & 0x80 != 0 {
        -magnitude as i16
    } else {
        magnitude as i16
    }
}

pub struct PcmuCodec {
    frame_samples: usize,
    last_frame: Vec<i16>,
    concealed: u32,
}

impl PcmuCodec {
    pub const CLOCK_RATE: u32 = 8000;

    pub fn new(frame_samples: usize) -> Self {
        Self {
            frame_samples,
            last_frame: vec![0; frame_samples],
            concealed: 0,
        }
    }
}

impl Codec for PcmuCodec {
    fn encode(&mut self, pcm: &[i16], out: &mut Vec<u8>) -> Result<(), CodecError> {
        if pcm.len() != self.frame_samples {
            return Err(CodecError::FrameSize {
                expected: self.frame_samples,
                got: pcm.len(),
            });
        }
        out.clear();
        out.extend(pcm.iter().map(|&s| linear_to_ulaw(s)));
        Ok(())
    }

    fn decode(&mut self, payload: Option<&[u8]>, out: &mut Vec<i16>) -> Result<(), CodecError> {
        out.clear();
        match payload {
            Some(bytes) => {
                out.extend(bytes.iter().map(|&b| ulaw_to_linear(b)));
                out.resize(self.frame_samples, 0);
                self.last_frame.clone_from(out);
                self.concealed = 0;
            }
            None => {
                self.concealed = self.concealed.saturating_add(1);
                if self.concealed > MAX_CONCEALED {
                    out.resize(self.frame_samples, 0);
                } else {
                    // halve the repeated frame on each consecutive loss
                    let shift = self.concealed;
                    out.extend(self.last_frame.iter().map(|&s| s >> shift));
                }
            }
        }
        Ok(())
    }

    fn frame_sample_count(&self) -> usize {
        self.frame_samples
    }

    fn clock_rate(&self) -> u32 {
        Self::CLOCK_RATE
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn companding_stays_close() {
        for s in [0i16, 100, -100, 1000, -5000, 16000, -32768, 32767] {
            let back = ulaw_to_linear(linear_to_ulaw(s));
            let err = (i32::from(s) - i32::from(back)).abs();
            assert!(err <= (i32::from(s).abs() / 16).max(8), "{s} -> {back}");
        }
    }

    #[test]
    fn silence_encodes_to_0xff() {
        assert_eq!(linear_to_ulaw(0), 0xFF);
        assert_eq!(ulaw_to_linear(0xFF), 0);
    }

    #[test]
    fn rejects_wrong_frame_size() {
        let mut c = PcmuCodec::new(160);
        let mut out = Vec::new();
        assert_eq!(
            c.encode(&[0; 80], &mut out),
            Err(CodecError::FrameSize {
                expected: 160,
                got: 80
            })
        );
    }

    #[test]
    fn concealment_fades_out() {
        let mut c = PcmuCodec::new(4);
        let mut enc = Vec::new();
        c.encode(&[8000, 8000, -8000, -8000], &mut enc).unwrap();
        let mut pcm = Vec::new();
        c.decode(Some(&enc), &mut pcm).unwrap();
        let level = pcm[0];

        c.decode(None, &mut pcm).unwrap();
        assert_eq!(pcm[0], level >> 1);
        for _ in 0..MAX_CONCEALED {
            c.decode(None, &mut pcm).unwrap();
        }
        assert_eq!(pcm, vec![0; 4]);
    }
}
