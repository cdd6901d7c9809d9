use super::dtmf_error::DtmfError;

/// Event code for hook flash.
pub const EVENT_FLASH: u8 = 16;

const DIGITS: &[u8; 17] = b"0123456789*#ABCDR";

/// Maps a dial character to its RFC4733 event code.
pub fn digit_to_event(c: char, allow_flash: bool) -> Result<u8, DtmfError> {
    let upper = c.to_ascii_uppercase();
    match DIGITS.iter().position(|&d| char::from(d) == upper) {
        Some(code) if code as u8 == EVENT_FLASH && !allow_flash => Err(DtmfError::InvalidDigit(c)),
        Some(code) => Ok(code as u8),
        None => Err(DtmfError::InvalidDigit(c)),
    }
}

/// Maps an event code back to its character; codes above flash are not digits.
pub fn event_to_digit(event: u8) -> Option<char> {
    DIGITS.get(usize::from(event)).map(|&d| char::from(d))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn digit_table_matches_rfc4733() {
        assert_eq!(digit_to_event('0', false), Ok(0));
        assert_eq!(digit_to_event('9', false), Ok(9));
        assert_eq!(digit_to_event('*', false), Ok(10));
        assert_eq!(digit_to_event('#', false), Ok(11));
        assert_eq!(digit_to_event('a', false), Ok(12));
        assert_eq!(digit_to_event('D', false), Ok(15));
        assert_eq!(digit_to_event('R', true), Ok(EVENT_FLASH));
    }

    #[test]
    fn rejects_unknown_and_disabled_flash() {
        assert_eq!(digit_to_event('x', true), Err(DtmfError::InvalidDigit('x')));
        assert_eq!(digit_to_event('r', false), Err(DtmfError::InvalidDigit('r')));
    }

    #[test]
    fn event_codes_map_back() {
        assert_eq!(event_to_digit(11), Some('#'));
        assert_eq!(event_to_digit(16), Some('R'));
        assert_eq!(event_to_digit(17), None);
    }
}
