use thiserror::Error;

use crate::chip::chip8::constants::{CHIP8_MAX_MEMORY_ADDRESS, CHIP8_STACK_SIZE};

/// Errors that stop the CHIP-8 from executing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Chip8Error {
    #[error("Invalid memory address {0:#x}, must be between 0x0 and {max:#x}", max = CHIP8_MAX_MEMORY_ADDRESS)]
    InvalidMemoryAddress(usize),

    #[error("Invalid register V{0:X}, registers range from V0 to VF")]
    InvalidRegister(usize),

    #[error("Invalid key {0:#x}, keys range from 0x0 to 0xf")]
    InvalidKey(u8),

    #[error("Pixel coordinate ({x}, {y}) is out of bounds")]
    PixelOutOfBounds { x: usize, y: usize },

    #[error("Unsupported opcode {0:04X}")]
    UnsupportedOpcode(u16),

    #[error("Stack overflow at {pc:#05x}: more than {depth} nested calls", depth = CHIP8_STACK_SIZE)]
    StackOverflow { pc: u16 },

    #[error("Stack underflow at {pc:#05x}: return without call")]
    StackUnderflow { pc: u16 },
}
