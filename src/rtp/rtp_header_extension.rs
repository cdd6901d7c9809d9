/// RFC3550 generic header extension (profile-specific). Carried through
/// untouched; nothing in the stream interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpHeaderExtension {
    /// 16-bit profile-specific identifier.
    pub profile: u16,
    /// Raw extension payload (not including the 4-byte header), a multiple of 4 bytes.
    pub data: Vec<u8>,
}

impl RtpHeaderExtension {
    pub fn new(profile: u16, data: Vec<u8>) -> Self {
        Self { profile, data }
    }

    pub fn encoded_len(&self) -> usize {
        4 + self.data.len().div_ceil(4) * 4
    }
}
