const LO_BITS: u64 = 0x0101_0101_0101_0101;
const HI_BITS: u64 = 0x8080_8080_8080_8080;

#[inline(always)]
fn load_u64(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(bytes);
    u64::from_le_bytes(word)
}

/// Sets the high bit of the lowest zero byte of `word`.
///
/// Bytes above the first zero may be flagged spuriously, so only the
/// lowest set bit is meaningful.
#[inline(always)]
fn zero_byte_mask(word: u64) -> u64 {
    word.wrapping_sub(LO_BITS) & !word & HI_BITS
}

/// Looks for NEEDLE in haystack eight bytes at a time.
///
/// Never reads past the end of the slice.
#[cfg_attr(feature = "profiled", inline(never))]
#[cfg_attr(not(feature = "profiled"), inline(always))]
pub fn find_byte<const NEEDLE: u8>(haystack: &[u8]) -> Option<usize> {
    let pattern = LO_BITS * NEEDLE as u64;
    let mut words = haystack.chunks_exact(8);
    let mut offset = 0;

    for word in &mut words {
        let mask = zero_byte_mask(load_u64(word) ^ pattern);
        if mask != 0 {
            return Some(offset + (mask.trailing_zeros() / 8) as usize);
        }
        offset += 8;
    }

    words
        .remainder()
        .iter()
        .position(|&b| b == NEEDLE)
        .map(|i| offset + i)
}

#[cfg(test)]
mod test {
    use crate::memops::find_byte;

    fn naive<const NEEDLE: u8>(haystack: &[u8]) -> Option<usize> {
        haystack.iter().position(|&b| b == NEEDLE)
    }

    #[test]
    fn test_find_byte() {
        assert_eq!(find_byte::<b'A'>(b"aaaAaaa"), Some(3));
        assert_eq!(find_byte::<b'A'>(b"aaaAaaaAaaa"), Some(3));
        assert_eq!(find_byte::<b'A'>(b"aaaaaaaaaaaaaaaaaaaA"), Some(19));
        assert_eq!(find_byte::<b'A'>(b"aaaa"), None);
        assert_eq!(find_byte::<b'A'>(b""), None);
    }

    #[test]
    fn test_find_byte_every_position() {
        for len in 0..40 {
            for at in 0..len {
                let mut haystack = vec![b'x'; len];
                haystack[at] = b'\n';
                assert_eq!(find_byte::<b'\n'>(&haystack), Some(at), "len={len} at={at}");
            }
        }
    }

    #[test]
    fn test_find_byte_high_bytes() {
        // Multi-byte UTF-8 and bytes just below the needle must not match.
        let haystack = "Zürich\u{1F600}:;".as_bytes();
        assert_eq!(find_byte::<b';'>(haystack), naive::<b';'>(haystack));
        let haystack = [0x80u8, 0xff, 0x3a, 0x3c, 0x3b, 0x00, 0x3b, 0x01, 0x3b];
        assert_eq!(find_byte::<b';'>(&haystack), Some(4));
    }
}
