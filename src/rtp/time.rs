use std::time::Duration;

// NTP epoch offset from Unix (1900→1970)
const NTP_UNIX_EPOCH_DIFF: u64 = 2_208_988_800; // seconds

/// 64-bit NTP timestamp split into seconds (msw) and fraction (lsw).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NtpTime {
    pub msw: u32,
    pub lsw: u32,
}

impl NtpTime {
    pub fn new(msw: u32, lsw: u32) -> Self {
        Self { msw, lsw }
    }

    pub fn from_unix(since_epoch: Duration) -> Self {
        let secs = since_epoch.as_secs() + NTP_UNIX_EPOCH_DIFF;
        let frac = (u64::from(since_epoch.subsec_nanos()) << 32) / 1_000_000_000u64;
        Self {
            msw: secs as u32,
            lsw: frac as u32,
        }
    }

    /// The 32-bit "compact" form used for LSR/DLSR (RFC3550 A.3):
    /// middle 32 bits of the 64-bit timestamp, in units of 1/65536 s.
    #[inline]
    pub fn compact(&self) -> u32 {
        (self.msw << 16) | (self.lsw >> 16)
    }
}

/// Convert compact NTP units to a duration.
pub fn compact_to_duration(units: u32) -> Duration {
    Duration::from_nanos((u64::from(units) * 1_000_000_000) >> 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_takes_middle_bits() {
        let t = NtpTime::new(0x1234_5678, 0x9ABC_DEF0);
        assert_eq!(t.compact(), 0x5678_9ABC);
    }

    #[test]
    fn half_second_fraction() {
        let t = NtpTime::from_unix(Duration::from_millis(1500));
        assert_eq!(t.msw as u64, NTP_UNIX_EPOCH_DIFF + 1);
        assert_eq!(t.lsw, 0x8000_0000);
    }

    #[test]
    fn compact_units_are_1_65536_seconds() {
        assert_eq!(compact_to_duration(2 << 16), Duration::from_secs(2));
        assert_eq!(compact_to_duration(1 << 15), Duration::from_millis(500));
    }
}
