use crate::consts;

/// The 16-key hex keypad as seen by the interpreter: one boolean per key,
/// mutated by the front end between cycles. Key indices are masked to the
/// low nibble.
#[derive(Default)]
pub struct Keyboard {
    keys: [bool; consts::KEY_COUNT],
}

impl Keyboard {
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys[(key & 0x0F) as usize]
    }

    pub fn press(&mut self, key: u8) {
        self.keys[(key & 0x0F) as usize] = true;
    }

    pub fn release(&mut self, key: u8) {
        self.keys[(key & 0x0F) as usize] = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release() {
        let mut keyboard = Keyboard::default();
        assert!(!keyboard.is_pressed(0xA));
        keyboard.press(0xA);
        assert!(keyboard.is_pressed(0xA));
        assert!(!keyboard.is_pressed(0x0));
        keyboard.release(0xA);
        assert!(!keyboard.is_pressed(0xA));
    }

    #[test]
    fn test_key_index_masked() {
        let mut keyboard = Keyboard::default();
        keyboard.press(0x13);
        assert!(keyboard.is_pressed(0x3));
    }
}
