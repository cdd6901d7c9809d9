//! Modulo-2^16 sequence arithmetic. Sequence numbers are never compared as
//! plain integers.

/// Signed distance from `base` to `seq`, positive when `seq` is newer.
#[inline]
pub fn seq_delta(seq: u16, base: u16) -> i16 {
    seq.wrapping_sub(base) as i16
}
