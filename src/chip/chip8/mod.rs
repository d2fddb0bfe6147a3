/// CHIP-8 constants.
mod constants;
/// Cursive display output.
pub mod cursive_display;
/// Errors raised while executing.
mod error;
/// The framebuffer.
mod graphics;
/// The hexadecimal keypad.
mod keypad;
/// Bounds checked main memory.
mod memory;
/// Decoding of opcodes and their execution.
mod opcodes;
/// Convenience functions for modification of the CHIP-8 state.
mod util;


use std::fs::File;
use std::io::Read;
use std::path::Path;

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info, trace};

pub use crate::chip::chip8::constants::{
    CHIP8_DISPLAY_HEIGHT as DISPLAY_HEIGHT, CHIP8_DISPLAY_WIDTH as DISPLAY_WIDTH,
    CHIP8_TIMER_RESOLUTION as DEFAULT_TIMER_RESOLUTION,
};
pub use crate::chip::chip8::error::Chip8Error;

use crate::chip::{
    chip8::{
        constants::{
            CHIP8_MAX_PROGRAM_SIZE, CHIP8_PROGRAM_OFFSET, CHIP8_REGISTER_COUNT, CHIP8_STACK_SIZE,
        },
        graphics::Graphics,
        keypad::Keypad,
        memory::Memory,
        opcodes::Opcode,
    },
    Chip, LoadProgramError,
};

/// Represents the state of the CHIP-8.
pub struct Chip8 {
    /// 4096 bytes of main memory
    memory: Memory,

    /// 16 registers where each can store one byte
    registers: [u8; CHIP8_REGISTER_COUNT],

    /// An index register
    index: u16,

    /// A program counter
    program_counter: u16,

    /// The output pins. Those are directly wired up to the pixels of the display.
    graphics: Graphics,

    /// The delay timer. Note that this timer is decremented every
    /// `timer_resolution` cycles.
    delay_timer: u8,

    /// The sound timer. The buzzer sounds as long as it is non-zero.
    sound_timer: u8,

    /// The input pins, usually wired up to the keys.
    keypad: Keypad,

    /// A stack. It is only used to store return addresses for the return opcode.
    stack: [u16; CHIP8_STACK_SIZE],

    /// A pointer, pointing to the next free slot in the stack.
    stack_pointer: u8,

    /// Number of cycles between two timer decrements.
    timer_resolution: u16,

    /// A helper variable to properly implement the timer resolution.
    cycles_since_timer_dec: u16,

    /// A flag that indicates whether the output pins or the buzzer changed
    /// since it was last set to false.
    draw: bool,

    /// Source for the random opcode.
    rng: StdRng,
}

impl Chip for Chip8 {
    /// The CHIP-8's pins can actually be addressed by using just half a byte.
    /// However, we use a whole byte here and check whether it is in the right
    /// range, because it is more convenient to handle.
    type PinAddress = u8;

    type Error = Chip8Error;

    fn load_program(&mut self, path: &Path) -> Result<usize, LoadProgramError> {
        let mut file = File::open(path).map_err(|source| LoadProgramError::CouldNotOpenFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)
            .map_err(|source| LoadProgramError::CouldNotReadFile {
                path: path.to_path_buf(),
                source,
            })?;

        let size = self.load_program_bytes(&buffer)?;
        info!(path = %path.display(), size, "program loaded");
        Ok(size)
    }

    fn cycle(&mut self) -> Result<(), Chip8Error> {
        let opcode = self.next_instruction()?;
        trace!(pc = self.program_counter, %opcode, "executing");
        opcode.execute(self)?;

        self.cycles_since_timer_dec += 1;
        if self.cycles_since_timer_dec >= self.timer_resolution {
            if self.delay_timer > 0 {
                self.delay_timer -= 1;
            }

            if self.sound_timer > 0 {
                self.sound_timer -= 1;
                if self.sound_timer == 0 {
                    debug!("buzzer off");
                    self.draw = true;
                }
            }

            self.cycles_since_timer_dec = 0;
        }
        Ok(())
    }

    fn read_output_pins(&self) -> &[bool] {
        self.graphics.pixels()
    }

    fn set_input_pin(&mut self, pin: u8, value: bool) -> Result<(), Chip8Error> {
        if value {
            self.keypad.press(pin)
        } else {
            self.keypad.release(pin)
        }
    }

    fn reset_input_pins(&mut self) {
        self.keypad.release_all();
    }

    fn should_buzz(&self) -> bool {
        self.sound_timer > 0
    }
}

impl Chip8 {
    /// Constructs a new CHIP-8 and appropriately initializes all fields so that
    /// it is ready for the first execution cycle. Essentially this means that
    /// the program counter is set to 0x200 and the default CHIP-8 charset is
    /// loaded at memory address `CHIP8_CHARSET_OFFSET`. Note that no program is
    /// loaded upon initialization.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Like `new`, but the random opcode draws from a generator seeded with `seed`,
    /// which makes runs reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Chip8 {
            memory: Memory::new(),
            registers: [0; CHIP8_REGISTER_COUNT],
            index: 0,
            program_counter: CHIP8_PROGRAM_OFFSET,
            graphics: Graphics::new(),
            delay_timer: 0,
            sound_timer: 0,
            keypad: Keypad::default(),
            stack: [0; CHIP8_STACK_SIZE],
            stack_pointer: 0,
            timer_resolution: DEFAULT_TIMER_RESOLUTION,
            cycles_since_timer_dec: 0,
            draw: false,
            rng,
        }
    }

    /// Sets the number of cycles between two timer decrements. A resolution of
    /// zero is treated as one.
    pub fn with_timer_resolution(mut self, cycles: u16) -> Self {
        self.timer_resolution = cycles.max(1);
        self
    }

    /// Fetches the next instruction based on the current state of self.program_counter.
    fn next_instruction(&self) -> Result<Opcode, Chip8Error> {
        Ok(Opcode::new(&self.memory.read_word(self.program_counter)?))
    }

    /// Loads a program from a slice at 0x200 and returns its size.
    pub fn load_program_bytes(&mut self, program: &[u8]) -> Result<usize, LoadProgramError> {
        let too_large = LoadProgramError::ProgramTooLarge {
            size: program.len(),
            max: CHIP8_MAX_PROGRAM_SIZE,
        };
        if program.len() > CHIP8_MAX_PROGRAM_SIZE {
            return Err(too_large);
        }
        self.memory
            .load(CHIP8_PROGRAM_OFFSET, program)
            .map_err(|_| too_large)?;
        Ok(program.len())
    }

    pub fn register(&self, id: usize) -> Result<u8, Chip8Error> {
        self.registers
            .get(id)
            .copied()
            .ok_or(Chip8Error::InvalidRegister(id))
    }

    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn index_register(&self) -> u16 {
        self.index
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// Whether the output pins changed since the draw flag was last cleared.
    pub fn should_draw(&self) -> bool {
        self.draw
    }

    pub fn pixel(&self, x: usize, y: usize) -> Result<bool, Chip8Error> {
        self.graphics.get_pixel(x, y)
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Chip8::new()
    }
}
