#[macro_use]
mod macros;
mod arithmetic_and_logic;
mod program_flow;
mod system;

use core::convert::TryFrom;
use std::marker::PhantomData;

use crate::chip::chip8::{
    error::Chip8Error,
    opcodes::{
        arithmetic_and_logic::{
            AddInstruction, DrwInstruction, LdInstruction, LdrInstruction, LduInstruction,
            RegInstruction, RndInstruction,
        },
        program_flow::{
            CallInstruction, JmpInstruction, JmprInstruction, SeInstruction, SkInstruction,
            SneInstruction, SreInstruction, SrneInstruction,
        },
        system::SysInstruction,
    },
    Chip8,
};

/// Represents a Chip 8 opcode. A Chip 8 opcode is two bytes long and stored big endian.
#[derive(Debug)]
pub(super) struct Opcode {
    /// The instruction class is the most significant nibble of the opcode.
    /// Note that we use a u8 to represent the instruction class here for
    /// convenience, but ensure that a valid opcode can only be constructed
    /// if the four most significant bits of the u8 are 0.
    instruction_class: u8,
    /// The payload constitutes the remaining nibbles of the opcode.
    payload: OpcodePayload,
}

/// Represents the payload of a Chip 8 opcode. That is the opcode without
/// the most significant nibble.
#[derive(Debug)]
pub(super) struct OpcodePayload {
    /// The nibbles representing the payload, each in range 0x0 - 0xF.
    bytes: [u8; 3],
}

impl OpcodePayload {
    /// Interprets the opcode payload as an address in the range 0x000 to
    /// 0xFFF (inclusive).
    fn address(&self) -> u16 {
        (self.bytes[0] as u16) << 8 | (self.bytes[1] as u16) << 4 | self.bytes[2] as u16
    }

    /// Interprets the most significant nibble as a register address in range
    /// 0x0 - 0xF and the remaining nibbles as a value in range 0x00 - 0xFF.
    fn reg_and_value(&self) -> (u8, u8) {
        (self.bytes[0], (self.bytes[1] << 4) | self.bytes[2])
    }

    /// Interprets the opcode payload as three operands, each of size
    /// one nibble.
    fn operands(&self) -> (u8, u8, u8) {
        (self.bytes[0], self.bytes[1], self.bytes[2])
    }
}

impl Opcode {
    /// Constructs a new `Opcode` given its byte representation.
    pub(super) fn new(opcode: &[u8; 2]) -> Opcode {
        Opcode {
            instruction_class: opcode[0] >> 4,
            payload: OpcodePayload {
                bytes: [opcode[0] & 0xF, opcode[1] >> 4, opcode[1] & 0xF],
            },
        }
    }

    /// The opcode as the 16 bit word it was decoded from.
    pub(super) fn raw(&self) -> u16 {
        (self.instruction_class as u16) << 12 | self.payload.address()
    }

    /// Decodes `self` and executes it relative to `state`.
    pub(super) fn execute(self, state: &mut Chip8) -> Result<(), Chip8Error> {
        let executable_opcode = self.decode()?;
        executable_opcode.execute(state)
    }

    fn decode(self) -> Result<Box<dyn ExecutableOpcode>, Chip8Error> {
        fn into_helper<T>(opcode: Opcode) -> Result<Box<dyn ExecutableOpcode>, Chip8Error>
        where
            T: ExecutableOpcode + TryFrom<Opcode, Error = InstructionParsingError> + 'static,
        {
            Ok(Box::new(T::try_from(opcode)?))
        }

        match self.instruction_class {
            0x0 => into_helper::<SysInstruction>(self),
            0x1 => into_helper::<JmpInstruction>(self),
            0x2 => into_helper::<CallInstruction>(self),
            0x3 => into_helper::<SeInstruction>(self),
            0x4 => into_helper::<SneInstruction>(self),
            0x5 => into_helper::<SreInstruction>(self),
            0x6 => into_helper::<LdrInstruction>(self),
            0x7 => into_helper::<AddInstruction>(self),
            0x8 => into_helper::<RegInstruction>(self),
            0x9 => into_helper::<SrneInstruction>(self),
            0xA => into_helper::<LdInstruction>(self),
            0xB => into_helper::<JmprInstruction>(self),
            0xC => into_helper::<RndInstruction>(self),
            0xD => into_helper::<DrwInstruction>(self),
            0xE => into_helper::<SkInstruction>(self),
            0xF => into_helper::<LduInstruction>(self),
            _ => Err(Chip8Error::UnsupportedOpcode(self.raw())),
        }
    }
}

/// Captures errors when converting opcodes to their respective instruction object.
#[derive(Debug)]
pub(super) enum InstructionParsingError {
    /// The opcode (first field) belongs to a different instruction class (second field)
    /// than the one the target instruction expects (third field).
    InvalidInstructionClass(u16, u8, u8),
}

impl From<InstructionParsingError> for Chip8Error {
    fn from(error: InstructionParsingError) -> Self {
        match error {
            InstructionParsingError::InvalidInstructionClass(raw, _, _) => {
                Chip8Error::UnsupportedOpcode(raw)
            }
        }
    }
}

/// Represents an opcode that can be executed.
trait ExecutableOpcode {
    /// Executes `self` relative to the given state. Note that this
    /// method will in-place modify the given state.
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error>;
}

/// Represents an opcode that expects the payload to be an address.
struct InstructionWithAddress<T> {
    instruction: PhantomData<T>,
    raw: u16,
    address: u16,
}

/// Represents an opcode that expects the payload to be three operands.
struct InstructionWithOperands<T> {
    instruction: PhantomData<T>,
    raw: u16,
    op1: u8,
    op2: u8,
    op3: u8,
}

/// Represents an opcode that expects the payload to be a register pointer and a value.
struct InstructionWithRegAndValue<T> {
    instruction: PhantomData<T>,
    raw: u16,
    reg: u8,
    value: u8,
}

impl std::fmt::Display for InstructionParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            InstructionParsingError::InvalidInstructionClass(raw, got, expected) => write!(
                f,
                "Opcode {:04X} has instruction class {:X}, expected {:X}.",
                raw, got, expected
            ),
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:04X}", self.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_views() {
        let opcode = Opcode::new(&[0xD1, 0x2F]);
        assert_eq!(opcode.instruction_class, 0xD);
        assert_eq!(opcode.payload.address(), 0x12F);
        assert_eq!(opcode.payload.reg_and_value(), (0x1, 0x2F));
        assert_eq!(opcode.payload.operands(), (0x1, 0x2, 0xF));
        assert_eq!(opcode.raw(), 0xD12F);
        assert_eq!(opcode.to_string(), "D12F");
    }

    #[test]
    fn test_mismatched_instruction_class() {
        let error = JmpInstruction::try_from(Opcode::new(&[0x2A, 0xBC])).err();
        assert!(matches!(
            error,
            Some(InstructionParsingError::InvalidInstructionClass(0x2ABC, 0x2, 0x1))
        ));
        assert_eq!(
            Chip8Error::from(error.unwrap()),
            Chip8Error::UnsupportedOpcode(0x2ABC)
        );
    }
}
