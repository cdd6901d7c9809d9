pub const RTP_VERSION: u8 = 2;
/// Fixed header size, without CSRCs or extension.
pub const RTP_HEADER_LEN: usize = 12;
pub const MAX_CSRC_COUNT: usize = 15;
