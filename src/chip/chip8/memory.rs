use crate::chip::chip8::{
    constants::{CHIP8_CHARSET, CHIP8_CHARSET_OFFSET, CHIP8_MEMORY_SIZE},
    error::Chip8Error,
};

/// The main memory of the CHIP-8. All accesses are bounds checked.
#[derive(Clone)]
pub(crate) struct Memory {
    cells: [u8; CHIP8_MEMORY_SIZE],
}

impl Memory {
    /// Constructs zeroed memory with the charset loaded at `CHIP8_CHARSET_OFFSET`.
    pub(crate) fn new() -> Self {
        let mut memory = Memory {
            cells: [0; CHIP8_MEMORY_SIZE],
        };
        let offset = CHIP8_CHARSET_OFFSET as usize;
        memory.cells[offset..offset + CHIP8_CHARSET.len()].copy_from_slice(&CHIP8_CHARSET);
        memory
    }

    pub(crate) fn get(&self, address: u16) -> Result<u8, Chip8Error> {
        self.cells
            .get(address as usize)
            .copied()
            .ok_or(Chip8Error::InvalidMemoryAddress(address as usize))
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, address: u16, value: u8) -> Result<(), Chip8Error> {
        let cell = self
            .cells
            .get_mut(address as usize)
            .ok_or(Chip8Error::InvalidMemoryAddress(address as usize))?;
        *cell = value;
        Ok(())
    }

    /// The first address of `start..start + len` that lies outside memory.
    fn first_invalid(start: usize) -> Chip8Error {
        Chip8Error::InvalidMemoryAddress(start.max(CHIP8_MEMORY_SIZE))
    }

    /// Copies `bytes` into memory starting at `offset`. Nothing is written if
    /// the bytes do not fit.
    pub(crate) fn load(&mut self, offset: u16, bytes: &[u8]) -> Result<(), Chip8Error> {
        let start = offset as usize;
        let cells = self
            .cells
            .get_mut(start..start + bytes.len())
            .ok_or_else(|| Self::first_invalid(start))?;
        cells.copy_from_slice(bytes);
        Ok(())
    }

    /// Returns the `len` bytes starting at `offset`, or an error if any of
    /// them lies outside memory.
    pub(crate) fn read(&self, offset: u16, len: usize) -> Result<&[u8], Chip8Error> {
        let start = offset as usize;
        self.cells
            .get(start..start + len)
            .ok_or_else(|| Self::first_invalid(start))
    }

    /// Reads the big endian word stored at `address` and `address + 1`.
    pub(crate) fn read_word(&self, address: u16) -> Result<[u8; 2], Chip8Error> {
        let high = self.get(address)?;
        let low = self.get(address.wrapping_add(1))?;
        Ok([high, low])
    }
}
