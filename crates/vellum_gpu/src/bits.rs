//! Bit-field helpers shared by the descriptor decoders.

#[inline]
pub(crate) fn mask(width: u32) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1u32 << width) - 1
    }
}

/// Reads `width` bits of `word` starting at bit `lo`.
#[inline]
pub(crate) fn extract(word: u32, lo: u32, width: u32) -> u32 {
    (word >> lo) & mask(width)
}

/// Writes the low `width` bits of `value` into `word` at bit `lo`.
#[inline]
pub(crate) fn insert(word: &mut u32, lo: u32, width: u32, value: u32) {
    let m = mask(width) << lo;
    *word = (*word & !m) | ((value << lo) & m);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_extract() {
        let mut word = 0xFFFF_FFFF;
        insert(&mut word, 4, 8, 0x5A);
        assert_eq!(extract(word, 4, 8), 0x5A);
        assert_eq!(extract(word, 0, 4), 0xF);
        assert_eq!(extract(word, 12, 20), 0xF_FFFF);
    }

    #[test]
    fn test_insert_truncates_value() {
        let mut word = 0;
        insert(&mut word, 0, 3, 0xFF);
        assert_eq!(word, 0x7);
    }
}
