//! Memory bus interface.

/// Memory bus interface.
///
/// The CPU reaches RAM, ROM and memory-mapped devices through this trait.
/// Every one of the 65536 addresses must be answered; there is no error
/// path. Reads take `&mut self` because device registers (PPU status,
/// controller shift registers) change state when read.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);
}

/// Flat 64 KiB RAM bus.
///
/// Every address is plain read/write memory. Useful for tests and for
/// running bare 6502 binaries that expect no memory-mapped I/O.
pub struct SimpleBus {
    ram: Box<[u8; 0x10000]>,
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; 0x10000]),
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at $FFFF.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.ram[addr as usize] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Read a byte without going through the bus.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram[address as usize]
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.ram[address as usize]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.ram[address as usize] = value;
    }
}
