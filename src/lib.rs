//! An implementation of a CHIP-8 emulator. The implementation follows the instruction set
//! described [here](https://en.wikipedia.org/wiki/CHIP-8#Opcode_table) and covers the
//! classic instruction set, except for calls into native machine code. For graphical output it relies on the cursive text user interface
//! library, while the core itself is frontend agnostic: a frontend only reads the output
//! pins (the framebuffer) and sets the input pins (the keypad).
pub mod chip;
pub mod config;
pub mod logging;
