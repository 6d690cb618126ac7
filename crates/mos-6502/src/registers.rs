//! 6502 CPU registers.

use crate::Status;
use crate::flags::{I, U};

/// Base address of the stack page.
pub const STACK_PAGE: u16 = 0x0100;

/// 6502 CPU register set.
///
/// The 6502 has minimal registers:
/// - A: 8-bit accumulator
/// - X, Y: 8-bit index registers
/// - S: 8-bit stack pointer (stack is at $0100-$01FF)
/// - PC: 16-bit program counter
/// - P: 8-bit processor status
///
/// All of them are unsigned. Signedness only exists in how an instruction
/// reads bit 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registers {
    /// Accumulator.
    pub a: u8,
    /// X index register.
    pub x: u8,
    /// Y index register.
    pub y: u8,
    /// Stack pointer (points to next free location, stack at $0100-$01FF).
    pub s: u8,
    /// Program counter.
    pub pc: u16,
    /// Processor status flags.
    pub p: Status,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Create registers in reset state.
    ///
    /// A, X and Y power up undefined; we use 0 so runs are repeatable.
    /// S is $FD and only I (plus the unused bit) is set in P. PC is left at
    /// 0 until the reset sequence loads it from $FFFC.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: 0xFD,
            pc: 0,
            p: Status(U | I),
        }
    }

    /// Push a value onto the stack, return the address written.
    pub fn push(&mut self) -> u16 {
        let addr = STACK_PAGE | u16::from(self.s);
        self.s = self.s.wrapping_sub(1);
        addr
    }

    /// Pop a value from the stack, return the address to read.
    pub fn pop(&mut self) -> u16 {
        self.s = self.s.wrapping_add(1);
        STACK_PAGE | u16::from(self.s)
    }

    /// Status byte as software reads it.
    #[must_use]
    pub const fn status_byte(&self) -> u8 {
        self.p.to_byte()
    }

    /// Replace every flag from a status byte.
    pub fn set_status_byte(&mut self, value: u8) {
        self.p = Status::from_byte(value);
    }
}
