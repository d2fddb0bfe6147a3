use core::convert::TryFrom;
use rand::Rng;
use std::marker::PhantomData;
use tracing::debug;

use crate::chip::chip8::{
    constants::{CHIP8_CHARSET_OFFSET, CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_WIDTH, CHIP8_GLYPH_LEN},
    error::Chip8Error,
    opcodes::{
        ExecutableOpcode, InstructionParsingError, InstructionWithAddress, InstructionWithOperands,
        InstructionWithRegAndValue, Opcode,
    },
    util, Chip8,
};

define_instruction_with_reg_and_value!(Ldr, LdrInstruction, 0x6);
impl ExecutableOpcode for LdrInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        state.registers[self.reg as usize] = self.value;
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_reg_and_value!(Add, AddInstruction, 0x7);
impl ExecutableOpcode for AddInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        state.registers[self.reg as usize] =
            state.registers[self.reg as usize].wrapping_add(self.value);
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_operands!(Reg, RegInstruction, 0x8);
impl ExecutableOpcode for RegInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        fn modify_registers(
            state: &mut Chip8,
            r1: u8,
            r2: u8,
            f: fn(u8, u8) -> (u8, Option<bool>),
        ) {
            let (val, carry) = f(state.registers[r1 as usize], state.registers[r2 as usize]);
            state.registers[r1 as usize] = val;
            match carry {
                Some(true) => state.registers[0xF] = 1,
                Some(false) => state.registers[0xF] = 0,
                _ => {}
            }
        }

        match self.op3 {
            0x0 => modify_registers(state, self.op1, self.op2, |_, v2| (v2, None)),
            0x1 => modify_registers(state, self.op1, self.op2, |v1, v2| (v1 | v2, None)),
            0x2 => modify_registers(state, self.op1, self.op2, |v1, v2| (v1 & v2, None)),
            0x3 => modify_registers(state, self.op1, self.op2, |v1, v2| (v1 ^ v2, None)),
            0x4 => modify_registers(state, self.op1, self.op2, |v1, v2| {
                let (result, overflow) = v1.overflowing_add(v2);
                (result, Some(overflow))
            }),
            0x5 => modify_registers(state, self.op1, self.op2, |v1, v2| {
                let (result, overflow) = v1.overflowing_sub(v2);
                (result, Some(!overflow))
            }),
            0x6 => modify_registers(state, self.op1, self.op2, |v1, _| {
                (v1 >> 1, Some(v1 & 1 != 0))
            }),
            0x7 => modify_registers(state, self.op1, self.op2, |v1, v2| {
                let (result, overflow) = v2.overflowing_sub(v1);
                (result, Some(!overflow))
            }),
            0xE => modify_registers(state, self.op1, self.op2, |v1, _| {
                (v1 << 1, Some(v1 & 0x80 != 0))
            }),
            _ => return Err(Chip8Error::UnsupportedOpcode(self.raw)),
        };
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_address!(Ld, LdInstruction, 0xA);
impl ExecutableOpcode for LdInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        state.index = self.address;
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_reg_and_value!(Rnd, RndInstruction, 0xC);
impl ExecutableOpcode for RndInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        let sample: u8 = state.rng.gen();
        state.registers[self.reg as usize] = sample & self.value;
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_operands!(Drw, DrwInstruction, 0xD);
impl ExecutableOpcode for DrwInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        let x = state.registers[self.op1 as usize] as usize;
        let y = state.registers[self.op2 as usize] as usize;
        // All rows are read before the first pixel changes.
        let sprite = state.memory.read(state.index, self.op3 as usize)?;

        state.registers[0xF] = 0;
        for (y_pos, &pixel_byte) in sprite.iter().enumerate() {
            for x_pos in 0..8usize {
                let pixel_mask: u8 = 0x80 >> x_pos;
                if pixel_byte & pixel_mask == 0 {
                    continue;
                }

                // Sprites wrap around the edges of the screen.
                let collided = state.graphics.toggle_pixel(
                    (x + x_pos) % CHIP8_DISPLAY_WIDTH,
                    (y + y_pos) % CHIP8_DISPLAY_HEIGHT,
                )?;
                if collided {
                    state.registers[0xF] = 1;
                }
                state.draw = true;
            }
        }
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_reg_and_value!(Ldu, LduInstruction, 0xF);
impl ExecutableOpcode for LduInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        let vx = state.registers[self.reg as usize];
        match self.value {
            0x07 => {
                state.registers[self.reg as usize] = state.delay_timer;
            }
            0x0A => match state.keypad.first_pressed() {
                Some(key) => state.registers[self.reg as usize] = key,
                // if no input pin is set, we directly return without
                // incrementing the program counter
                None => return Ok(()),
            },
            0x15 => {
                state.delay_timer = vx;
            }
            0x18 => {
                // The buzzer is an output too, so toggling it requests a redraw.
                if (vx > 0) != (state.sound_timer > 0) {
                    debug!(ticks = vx, "buzzer {}", if vx > 0 { "on" } else { "off" });
                    state.draw = true;
                }
                state.sound_timer = vx;
            }
            0x1E => {
                state.index = state.index.wrapping_add(vx as u16);
            }
            0x29 => {
                state.index = CHIP8_CHARSET_OFFSET + (vx & 0xF) as u16 * CHIP8_GLYPH_LEN;
            }
            0x33 => {
                state
                    .memory
                    .load(state.index, &[vx / 100, (vx / 10) % 10, vx % 10])?;
            }
            0x55 => {
                let last = self.reg as usize;
                state
                    .memory
                    .load(state.index, &state.registers[..=last])?;
            }
            0x65 => {
                let last = self.reg as usize;
                let values = state.memory.read(state.index, last + 1)?;
                state.registers[..=last].copy_from_slice(values);
            }
            _ => return Err(Chip8Error::UnsupportedOpcode(self.raw)),
        }
        util::increment_program_counter(state);
        Ok(())
    }
}
