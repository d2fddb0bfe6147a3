pub mod chip8;

use std::path::{Path, PathBuf};

use cursive::CbSink;
use thiserror::Error;

/// A chip that can be driven by a frontend. The frontend loads a program, repeatedly
/// invokes `cycle`, reads the output pins to render them and sets the input pins
/// according to the user's input.
pub trait Chip {
    /// The type used to address a single input pin.
    type PinAddress;

    /// The error raised when the chip cannot continue executing.
    type Error: std::error::Error;

    /// Loads the program stored at `path` into memory and returns its size in bytes.
    fn load_program(&mut self, path: &Path) -> Result<usize, LoadProgramError>;

    /// Runs one fetch-decode-execute cycle.
    fn cycle(&mut self) -> Result<(), Self::Error>;

    /// Returns the state of the output pins, i.e., the pixels of the display.
    fn read_output_pins(&self) -> &[bool];

    /// Sets the input pin `pin` to `value`.
    fn set_input_pin(&mut self, pin: Self::PinAddress, value: bool) -> Result<(), Self::Error>;

    /// Releases all input pins.
    fn reset_input_pins(&mut self);

    /// Whether the buzzer should currently sound.
    fn should_buzz(&self) -> bool;
}

/// A chip whose output can be rendered by cursive.
pub trait ChipWithCursiveDisplay {
    /// Pushes a fresh display to the UI if the output pins changed since the last
    /// call. Returns false if the UI is no longer listening.
    fn update_ui(&mut self, gfx_sink: &CbSink) -> bool;
}

/// Errors that occur while loading a program into a chip.
#[derive(Debug, Error)]
pub enum LoadProgramError {
    #[error("Could not open file '{}': {source}", path.display())]
    CouldNotOpenFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not read file '{}': {source}", path.display())]
    CouldNotReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Program too large: {size} bytes, at most {max} bytes fit into memory")]
    ProgramTooLarge { size: usize, max: usize },
}
