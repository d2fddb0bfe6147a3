use core::convert::TryFrom;
use std::marker::PhantomData;

use crate::chip::chip8::{
    error::Chip8Error,
    opcodes::{ExecutableOpcode, InstructionParsingError, InstructionWithAddress, Opcode},
    util, Chip8,
};

define_instruction_with_address!(Sys, SysInstruction, 0x0);
impl ExecutableOpcode for SysInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        match self.address {
            0x0E0 => {
                state.graphics.clear();
                state.draw = true;
                util::increment_program_counter(state);
            }
            0x0EE => {
                if state.stack_pointer == 0 {
                    return Err(Chip8Error::StackUnderflow {
                        pc: state.program_counter,
                    });
                }
                state.stack_pointer -= 1;
                state.program_counter = state.stack[state.stack_pointer as usize];
            }
            // 0NNN calls native machine code of the host, which cannot run here.
            _ => return Err(Chip8Error::UnsupportedOpcode(self.raw)),
        };
        Ok(())
    }
}
