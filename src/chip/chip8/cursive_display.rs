use crate::chip::{
    chip8::{
        constants::{CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_WIDTH},
        Chip8,
    },
    Chip, ChipWithCursiveDisplay,
};

use cursive::{
    theme::{BaseColor, Color, ColorStyle},
    view::View,
    CbSink, Cursive, Printer, Vec2,
};
use tracing::warn;

/// Represents the display of the Chip 8, plus a status line below the pixels
/// that shows whether the buzzer sounds.
pub struct Display {
    pixels: [bool; CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT],
    buzzing: bool,
}

impl Display {
    /// Creates a new display from the 64 * 32 pixels of a framebuffer.
    pub fn new(pixels: &[bool; CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT], buzzing: bool) -> Self {
        Display {
            pixels: *pixels,
            buzzing,
        }
    }

    /// The text shown in the status line.
    fn status(&self) -> &'static str {
        if self.buzzing {
            "BEEP"
        } else {
            ""
        }
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new(&[false; CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT], false)
    }
}

/// Implements cursive::view::View for Display to enable drawing it
/// as a View out of the box.
impl View for Display {
    fn draw(&self, printer: &Printer) {
        printer.with_color(
            ColorStyle::new(Color::Dark(BaseColor::Black), Color::Light(BaseColor::White)),
            |printer| {
                for x in 0..CHIP8_DISPLAY_WIDTH {
                    for y in 0..CHIP8_DISPLAY_HEIGHT {
                        if self.pixels[x + CHIP8_DISPLAY_WIDTH * y] {
                            printer.print((x, y), " ");
                        }
                    }
                }
            },
        );
        printer.print((0, CHIP8_DISPLAY_HEIGHT), self.status());
    }

    fn required_size(&mut self, _: Vec2) -> Vec2 {
        Vec2::new(CHIP8_DISPLAY_WIDTH, CHIP8_DISPLAY_HEIGHT + 1)
    }
}

impl ChipWithCursiveDisplay for Chip8 {
    fn update_ui(&mut self, gfx_sink: &CbSink) -> bool {
        if !self.draw {
            return true;
        }
        let display = Display::new(self.graphics.pixels(), self.should_buzz());
        let sent = gfx_sink.send(Box::new(move |s: &mut Cursive| {
            s.pop_layer();
            s.add_layer(display);
        }));
        if sent.is_err() {
            warn!("display update dropped, the UI is gone");
            return false;
        }
        self.draw = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_copies_pixels() {
        let mut pixels = [false; 64 * 32];
        pixels[5 + 64 * 7] = true;
        let display = Display::new(&pixels, false);
        assert!(display.pixels[5 + 64 * 7]);
        assert_eq!(display.pixels.iter().filter(|pixel| **pixel).count(), 1);
        assert_eq!(display.status(), "");
        assert_eq!(Display::new(&pixels, true).status(), "BEEP");
    }

    #[test]
    fn test_update_ui_only_sends_when_drawing() {
        let (sink, receiver) = crossbeam_channel::unbounded();
        let mut chip8 = Chip8::with_seed(0);

        assert!(chip8.update_ui(&sink));
        assert!(receiver.try_recv().is_err());

        chip8.load_program_bytes(&[0x00, 0xE0]).unwrap();
        chip8.cycle().unwrap();
        assert!(chip8.should_draw());
        assert!(chip8.update_ui(&sink));
        assert!(receiver.try_recv().is_ok());
        assert!(!chip8.should_draw());
    }
}
