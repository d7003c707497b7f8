//! small helpers for scanning raw log bytes

/// a non-empty run of ascii digits that fits into `u64`, nothing else
pub(crate) fn parse_u64(digits: &[u8]) -> Option<u64> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    digits.iter().try_fold(0u64, |value, &digit| {
        value.checked_mul(10)?.checked_add(u64::from(digit - b'0'))
    })
}

/// the decimal integer at the start of `bytes` and how many bytes it spans
pub(crate) fn leading_u64(bytes: &[u8]) -> Option<(u64, usize)> {
    let len = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    parse_u64(&bytes[..len]).map(|value| (value, len))
}

pub(crate) fn trim_matches<'a>(mut bytes: &'a [u8], strip: &[u8]) -> &'a [u8] {
    while let [first, rest @ ..] = bytes {
        if !strip.contains(first) {
            break;
        }
        bytes = rest;
    }
    while let [rest @ .., last] = bytes {
        if !strip.contains(last) {
            break;
        }
        bytes = rest;
    }
    bytes
}

pub(crate) fn find_byte(bytes: &[u8], needle: u8) -> Option<usize> {
    bytes.iter().position(|&b| b == needle)
}
