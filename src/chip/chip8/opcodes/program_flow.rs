use core::convert::TryFrom;
use std::marker::PhantomData;

use crate::chip::chip8::{
    constants::CHIP8_STACK_SIZE,
    error::Chip8Error,
    opcodes::{
        ExecutableOpcode, InstructionParsingError, InstructionWithAddress, InstructionWithOperands,
        InstructionWithRegAndValue, Opcode,
    },
    util, Chip8,
};

define_instruction_with_address!(Jmp, JmpInstruction, 0x1);
impl ExecutableOpcode for JmpInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        state.program_counter = self.address;
        Ok(())
    }
}

define_instruction_with_address!(Call, CallInstruction, 0x2);
impl ExecutableOpcode for CallInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        if state.stack_pointer as usize >= CHIP8_STACK_SIZE {
            return Err(Chip8Error::StackOverflow {
                pc: state.program_counter,
            });
        }
        util::increment_program_counter(state);
        state.stack[state.stack_pointer as usize] = state.program_counter;
        state.stack_pointer += 1;
        state.program_counter = self.address;
        Ok(())
    }
}

define_instruction_with_reg_and_value!(Se, SeInstruction, 0x3);
impl ExecutableOpcode for SeInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        util::conditional_skip(self, state, |instruction, state| {
            state.registers[instruction.reg as usize] == instruction.value
        });
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_reg_and_value!(Sne, SneInstruction, 0x4);
impl ExecutableOpcode for SneInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        util::conditional_skip(self, state, |instruction, state| {
            state.registers[instruction.reg as usize] != instruction.value
        });
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_operands!(Sre, SreInstruction, 0x5);
impl ExecutableOpcode for SreInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        if self.op3 != 0 {
            return Err(Chip8Error::UnsupportedOpcode(self.raw));
        }
        util::conditional_skip(self, state, |instruction, state| {
            state.registers[instruction.op1 as usize] == state.registers[instruction.op2 as usize]
        });
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_operands!(Srne, SrneInstruction, 0x9);
impl ExecutableOpcode for SrneInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        if self.op3 != 0 {
            return Err(Chip8Error::UnsupportedOpcode(self.raw));
        }
        util::conditional_skip(self, state, |instruction, state| {
            state.registers[instruction.op1 as usize] != state.registers[instruction.op2 as usize]
        });
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_address!(Jmpr, JmprInstruction, 0xB);
impl ExecutableOpcode for JmprInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        state.program_counter = self.address + state.registers[0] as u16;
        Ok(())
    }
}

define_instruction_with_reg_and_value!(Sk, SkInstruction, 0xE);
impl ExecutableOpcode for SkInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        // Only the low nibble of Vx addresses a key.
        let key = state.registers[self.reg as usize] & 0xF;
        let skip = match self.value {
            0x9E => state.keypad.is_pressed(key)?,
            0xA1 => !state.keypad.is_pressed(key)?,
            _ => return Err(Chip8Error::UnsupportedOpcode(self.raw)),
        };
        if skip {
            util::increment_program_counter(state);
        }
        util::increment_program_counter(state);
        Ok(())
    }
}
