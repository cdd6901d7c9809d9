pub const RTCP_VERSION: u8 = 2;
/// Report count / source count fields are 5 bits wide.
pub const MAX_RC: usize = 31;
pub const REPORT_BLOCK_LEN: usize = 24;
pub const SENDER_INFO_LEN: usize = 20;
