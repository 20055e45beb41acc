mod arithmetic;
mod registers;
mod write_back;

pub mod mods;
pub use registers::{Accumulator, AxRegister, Product, Registers, StackRegister};
pub use write_back::WriteBackLog;

use crate::constants::IMEM_SIZE;
use alloc::boxed::Box;
use alloc::vec;
use log::error;

/// Word-addressed instruction memory spanning the full 16-bit address space
pub struct InstructionMemory {
    words: Box<[u16]>,
}

impl InstructionMemory {
    pub fn new() -> Self {
        Self {
            words: vec![0; IMEM_SIZE].into_boxed_slice(),
        }
    }

    pub fn read(&self, addr: u16) -> u16 {
        self.words[addr as usize]
    }

    pub fn write(&mut self, addr: u16, value: u16) {
        self.words[addr as usize] = value;
    }

    /// Copies an image into memory starting at base
    pub fn load(&mut self, base: u16, image: &[u16]) -> Result<(), &'static str> {
        let start = base as usize;
        let end = start + image.len();
        if end > IMEM_SIZE {
            error!(
                "Image of {} words does not fit at {:04x}",
                image.len(),
                base
            );
            return Err("Image exceeds instruction memory");
        }
        self.words[start..end].copy_from_slice(image);
        Ok(())
    }

    /// Loads a big-endian byte image (two bytes per instruction word)
    pub fn load_bytes(&mut self, base: u16, bytes: &[u8]) -> Result<(), &'static str> {
        if bytes.len() % 2 != 0 {
            error!("Image has an odd number of bytes ({})", bytes.len());
            return Err("Image is not a whole number of words");
        }

        let words: alloc::vec::Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        self.load(base, &words)
    }
}

impl Default for InstructionMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod imem_tests {
    use super::*;

    #[test]
    fn test_load_and_read() {
        let mut imem = InstructionMemory::new();
        imem.load(0x8000, &[0x1234, 0x5678]).unwrap();
        assert_eq!(imem.read(0x8000), 0x1234);
        assert_eq!(imem.read(0x8001), 0x5678);
        assert_eq!(imem.read(0x8002), 0x0000);
    }

    #[test]
    fn test_load_past_end_fails() {
        let mut imem = InstructionMemory::new();
        assert!(imem.load(0xFFFF, &[1, 2]).is_err());
        assert!(imem.load(0xFFFF, &[1]).is_ok());
    }

    #[test]
    fn test_load_bytes_big_endian() {
        let mut imem = InstructionMemory::new();
        imem.load_bytes(0x0010, &[0x02, 0x9F, 0x00, 0x10]).unwrap();
        assert_eq!(imem.read(0x0010), 0x029F);
        assert_eq!(imem.read(0x0011), 0x0010);
        assert!(imem.load_bytes(0, &[0x00, 0x01, 0x02]).is_err());
    }
}
