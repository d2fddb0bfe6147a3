use crate::chip::chip8::{
    constants::{CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_WIDTH},
    error::Chip8Error,
};

/// The 64x32 monochrome framebuffer, stored in row major order.
#[derive(Clone)]
pub(crate) struct Graphics {
    pixels: [bool; CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT],
}

impl Graphics {
    pub(crate) fn new() -> Self {
        Graphics {
            pixels: [false; CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT],
        }
    }

    fn position(x: usize, y: usize) -> Result<usize, Chip8Error> {
        if x >= CHIP8_DISPLAY_WIDTH || y >= CHIP8_DISPLAY_HEIGHT {
            return Err(Chip8Error::PixelOutOfBounds { x, y });
        }
        Ok(x + y * CHIP8_DISPLAY_WIDTH)
    }

    pub(crate) fn get_pixel(&self, x: usize, y: usize) -> Result<bool, Chip8Error> {
        Ok(self.pixels[Self::position(x, y)?])
    }

    #[cfg(test)]
    pub(crate) fn set_pixel(&mut self, x: usize, y: usize, on: bool) -> Result<(), Chip8Error> {
        self.pixels[Self::position(x, y)?] = on;
        Ok(())
    }

    /// XORs the pixel at (x, y) with a set sprite bit. Returns whether a lit
    /// pixel was turned off.
    pub(crate) fn toggle_pixel(&mut self, x: usize, y: usize) -> Result<bool, Chip8Error> {
        let position = Self::position(x, y)?;
        let collided = self.pixels[position];
        self.pixels[position] ^= true;
        Ok(collided)
    }

    pub(crate) fn clear(&mut self) {
        self.pixels = [false; CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT];
    }

    pub(crate) fn pixels(&self) -> &[bool; CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT] {
        &self.pixels
    }
}
