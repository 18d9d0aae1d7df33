use crate::consts;

/// Flat 4 KiB byte store. The 80-byte font set sits at 0x000, five bytes per
/// glyph; programs load at [`consts::PROG_OFFSET`]. Addresses are masked to
/// the 12-bit space, so out-of-range pointers wrap instead of panicking.
pub struct Memory {
    buffer: [u8; consts::RAM_BYTES],
}

impl Default for Memory {
    fn default() -> Self {
        let mut memory = Memory {
            buffer: [0; consts::RAM_BYTES],
        };
        memory.buffer[0..consts::FONT_SET_SIZE].copy_from_slice(&consts::FONT_SET);
        memory
    }
}

impl Memory {
    pub fn read_byte(&self, address: u16) -> u8 {
        self.buffer[(address & consts::ADDR_MAX) as usize]
    }

    pub fn write_byte(&mut self, address: u16, value: u8) {
        self.buffer[(address & consts::ADDR_MAX) as usize] = value;
    }

    /// Address of the 5-byte font sprite for a hex digit. Only the low
    /// nibble of the glyph index is significant.
    pub fn sprite_glyph_address(&self, glyph: u8) -> u16 {
        (glyph & 0x0F) as u16 * consts::FONT_GLYPH_BYTES as u16
    }

    /// Write a program image verbatim starting at the load origin. The
    /// caller guarantees the image fits the program area (see `rom`).
    pub fn load_image(&mut self, image: &[u8]) {
        self.buffer[consts::PROG_OFFSET..consts::PROG_OFFSET + image.len()].copy_from_slice(image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_preloaded() {
        let memory = Memory::default();
        // First glyph: 0
        assert_eq!(
            [
                memory.read_byte(0),
                memory.read_byte(1),
                memory.read_byte(2),
                memory.read_byte(3),
                memory.read_byte(4)
            ],
            [0xF0, 0x90, 0x90, 0x90, 0xF0]
        );
        // Last glyph: F
        let base = memory.sprite_glyph_address(0xF);
        assert_eq!(
            [
                memory.read_byte(base),
                memory.read_byte(base + 1),
                memory.read_byte(base + 2),
                memory.read_byte(base + 3),
                memory.read_byte(base + 4)
            ],
            [0xF0, 0x80, 0xF0, 0x80, 0x80]
        );
    }

    #[test]
    fn test_sprite_glyph_address_masks_high_nibble() {
        let memory = Memory::default();
        assert_eq!(memory.sprite_glyph_address(0x07), 35);
        assert_eq!(memory.sprite_glyph_address(0xA7), 35);
    }

    #[test]
    fn test_read_write_round_trip() {
        let mut memory = Memory::default();
        memory.write_byte(0x300, 0xAB);
        assert_eq!(memory.read_byte(0x300), 0xAB);
    }

    #[test]
    fn test_addresses_wrap_to_twelve_bits() {
        let mut memory = Memory::default();
        memory.write_byte(0xFFFF, 0x42);
        assert_eq!(memory.read_byte(0x0FFF), 0x42);
    }

    #[test]
    fn test_load_image_at_origin() {
        let mut memory = Memory::default();
        memory.load_image(&[0x00, 0xE0, 0x12, 0x00]);
        assert_eq!(memory.read_byte(0x200), 0x00);
        assert_eq!(memory.read_byte(0x201), 0xE0);
        assert_eq!(memory.read_byte(0x202), 0x12);
        assert_eq!(memory.read_byte(0x203), 0x00);
        // Font region below the origin untouched
        assert_eq!(memory.read_byte(0), 0xF0);
    }
}
