use crate::chip::chip8::{constants::CHIP8_KEY_COUNT, error::Chip8Error};

/// The hexadecimal keypad with keys 0x0 to 0xF.
#[derive(Clone, Default)]
pub(crate) struct Keypad {
    keys: [bool; CHIP8_KEY_COUNT],
}

impl Keypad {
    fn slot(&mut self, key: u8) -> Result<&mut bool, Chip8Error> {
        self.keys
            .get_mut(key as usize)
            .ok_or(Chip8Error::InvalidKey(key))
    }

    pub(crate) fn press(&mut self, key: u8) -> Result<(), Chip8Error> {
        *self.slot(key)? = true;
        Ok(())
    }

    pub(crate) fn release(&mut self, key: u8) -> Result<(), Chip8Error> {
        *self.slot(key)? = false;
        Ok(())
    }

    pub(crate) fn is_pressed(&self, key: u8) -> Result<bool, Chip8Error> {
        self.keys
            .get(key as usize)
            .copied()
            .ok_or(Chip8Error::InvalidKey(key))
    }

    pub(crate) fn release_all(&mut self) {
        self.keys = [false; CHIP8_KEY_COUNT];
    }

    /// The lowest key that is currently pressed, if any.
    pub(crate) fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|pressed| *pressed).map(|key| key as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_key_pressed_initially() {
        let keypad = Keypad::default();
        for key in 0x0..=0xF {
            assert_eq!(keypad.is_pressed(key), Ok(false));
        }
        assert_eq!(keypad.first_pressed(), None);
    }

    #[test]
    fn test_press_and_release() {
        let mut keypad = Keypad::default();
        keypad.press(0xA).unwrap();
        keypad.press(0x3).unwrap();
        assert_eq!(keypad.is_pressed(0xA), Ok(true));
        assert_eq!(keypad.first_pressed(), Some(0x3));

        keypad.release(0x3).unwrap();
        assert_eq!(keypad.first_pressed(), Some(0xA));

        keypad.release_all();
        assert_eq!(keypad.first_pressed(), None);
    }

    #[test]
    fn test_invalid_key() {
        let mut keypad = Keypad::default();
        assert_eq!(keypad.press(0x10), Err(Chip8Error::InvalidKey(0x10)));
        assert_eq!(keypad.release(0xFF), Err(Chip8Error::InvalidKey(0xFF)));
        assert_eq!(keypad.is_pressed(0x10), Err(Chip8Error::InvalidKey(0x10)));
    }
}
