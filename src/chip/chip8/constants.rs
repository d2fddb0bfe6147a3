/// Size of the main memory in bytes.
pub(crate) const CHIP8_MEMORY_SIZE: usize = 4096;

/// The highest valid memory address.
pub(crate) const CHIP8_MAX_MEMORY_ADDRESS: u16 = (CHIP8_MEMORY_SIZE - 1) as u16;

/// Address at which programs are loaded and execution starts.
pub(crate) const CHIP8_PROGRAM_OFFSET: u16 = 0x200;

pub(crate) const CHIP8_MAX_PROGRAM_SIZE: usize = CHIP8_MEMORY_SIZE - CHIP8_PROGRAM_OFFSET as usize;

pub(crate) const CHIP8_REGISTER_COUNT: usize = 16;

/// Maximum depth of nested subroutine calls.
pub(crate) const CHIP8_STACK_SIZE: usize = 16;

pub(crate) const CHIP8_KEY_COUNT: usize = 16;

pub(crate) const CHIP8_DISPLAY_WIDTH: usize = 64;

pub(crate) const CHIP8_DISPLAY_HEIGHT: usize = 32;

/// Number of cycles after which the delay and sound timers are decremented.
/// At the default clock of 1000 cycles per second this is roughly 60 Hz.
pub(crate) const CHIP8_TIMER_RESOLUTION: u16 = 16;

pub(crate) const CHIP8_CHARSET_OFFSET: u16 = 0x50; // 80

/// Every glyph of the charset is five bytes tall.
pub(crate) const CHIP8_GLYPH_LEN: u16 = 5;

pub(crate) const CHIP8_CHARSET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
