/// Linearizes 16-bit sequence numbers into a 32-bit extended sequence
/// (cycle count in the high half).
#[derive(Debug, Default, Clone)]
pub struct SeqExt {
    cycles: u32, // multiples of 2^16
    last: u16,   // highest sequence number seen
}

impl SeqExt {
    pub fn starting_at(seq: u16) -> Self {
        Self {
            cycles: 0,
            last: seq,
        }
    }

    /// Feed a sequence number newer than the last one (modulo 2^16).
    pub fn update(&mut self, seq: u16) -> u32 {
        // Going "backwards" numerically while moving forward in sequence space is a wrap
        if seq < self.last {
            self.cycles = self.cycles.wrapping_add(1 << 16);
        }
        self.last = seq;
        self.current()
    }

    pub fn current(&self) -> u32 {
        self.cycles | u32::from(self.last) // same as cycles + seq because cycles % 2^16 == 0
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_adds_a_cycle() {
        let mut ext = SeqExt::starting_at(65534);
        assert_eq!(ext.update(65535), 65535);
        assert_eq!(ext.update(0), 65536);
        assert_eq!(ext.update(1), 65537);
        assert_eq!(ext.cycles(), 1 << 16);
    }
}
