//! Core traits and types shared by the CPU core and the machines built on it.
//!
//! The CPU only ever sees a [`Bus`]: 65536 byte cells that it can read and
//! write. Whatever sits behind an address (RAM, cartridge ROM, a video chip
//! register) is the business of the bus implementation.

mod bus;
mod cpu;
mod memory_map;
mod observable;

pub use bus::{Bus, SimpleBus};
pub use cpu::Cpu;
pub use memory_map::{BusMappingFault, MAX_DEVICES, MemoryMap, MemoryMapBuilder, Ram, Rom};
pub use observable::{Observable, Value};
