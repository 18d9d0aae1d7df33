/// Split a 16-bit instruction word into the operand fields every handler
/// receives: the low 12-bit address, the x and y register indices, and the
/// low immediate byte.
pub fn split_fields(word: u16) -> (u16, u8, u8, u8) {
    (
        word & 0x0FFF,
        ((word & 0x0F00) >> 8) as u8,
        ((word & 0x00F0) >> 4) as u8,
        (word & 0x00FF) as u8,
    )
}

pub fn bounds_check(x: usize, y: usize, width: usize, height: usize) -> bool {
    x < width && y < height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_fields() {
        assert_eq!(split_fields(0xD123), (0x123, 0x1, 0x2, 0x23));
        assert_eq!(split_fields(0x00E0), (0x0E0, 0x0, 0xE, 0xE0));
        assert_eq!(split_fields(0xFFFF), (0xFFF, 0xF, 0xF, 0xFF));
    }

    #[test]
    fn test_bounds_check() {
        assert!(bounds_check(0, 0, 64, 32));
        assert!(bounds_check(63, 31, 64, 32));
        assert!(!bounds_check(64, 0, 64, 32));
        assert!(!bounds_check(0, 32, 64, 32));
    }
}
